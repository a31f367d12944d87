use clap::Parser;
use log::{error, info, warn};
use spotcontrol::constants::{DEFAULT_CONFIG_FILE, DEFAULT_PORT};
use spotcontrol::desktop::select_start_page;
use spotcontrol::helpers::process_helper::{open_in_desktop, RestartPolicy, ServerProcess};
use spotcontrol::logging;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "spotcontrol_launcher")]
#[command(about = "Start the SpotControl server and open its page in the browser", long_about = None)]
struct Args {
    /// Server executable, defaults to spotcontrol next to this program
    #[arg(long, value_name = "FILE")]
    server_bin: Option<PathBuf>,

    /// Configuration file passed to the server
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Do not open the browser
    #[arg(long)]
    no_open: bool,

    /// Seconds to wait for the server to answer
    #[arg(long, default_value_t = 15)]
    startup_timeout: u64,

    /// Restart the server after a crash, at most this many times
    #[arg(long, value_name = "N")]
    restart_on_failure: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn default_server_bin() -> PathBuf {
    let name = format!("spotcontrol{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .unwrap_or_else(|| PathBuf::from(name))
}

async fn show_start_page(base_url: &str, no_open: bool) {
    let client = reqwest::Client::new();
    let page = select_start_page(&client, base_url).await;
    let url = page.url(base_url);

    if no_open {
        info!("Server ready at {}", url);
        return;
    }
    if let Err(e) = open_in_desktop(&url) {
        error!("Could not open {}: {}", url, e);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::initialize_logging(None, args.debug) {
        eprintln!("Error: Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let base_url = format!("http://{}:{}", args.host, args.port);
    let policy = match args.restart_on_failure {
        Some(max_restarts) => RestartPolicy::OnFailure { max_restarts },
        None => RestartPolicy::Never,
    };

    let mut server = ServerProcess::new(
        args.server_bin.unwrap_or_else(default_server_bin),
        format!("{}/version", base_url),
    )
    .with_args([
        "--config".to_string(),
        args.config.display().to_string(),
        "--port".to_string(),
        args.port.to_string(),
    ])
    .with_restart_policy(policy);

    if server.health_check().await {
        info!("Server already running at {}", base_url);
        show_start_page(&base_url, args.no_open).await;
        return ExitCode::SUCCESS;
    }

    // Ctrl-C during startup must still stop the server
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Cannot install Ctrl-C handler: {}", e);
    }

    if let Err(e) = server.start() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let startup_timeout = Duration::from_secs(args.startup_timeout);
    if let Err(e) = server.wait_until_healthy_while(startup_timeout, &running).await {
        error!("{}", e);
        if let Err(e) = server.stop() {
            warn!("Error stopping server: {}", e);
        }
        return ExitCode::FAILURE;
    }

    show_start_page(&base_url, args.no_open).await;

    info!("Press Ctrl-C to stop the server");
    let mut exit_code = ExitCode::SUCCESS;
    while running.load(Ordering::SeqCst) {
        match server.supervise() {
            Ok(true) => {
                if let Err(e) = server.wait_until_healthy_while(startup_timeout, &running).await {
                    warn!("{}", e);
                }
            }
            Ok(false) if !server.is_running() => {
                error!("Server is no longer running");
                exit_code = ExitCode::FAILURE;
                break;
            }
            Ok(false) => {}
            Err(e) => {
                error!("Error supervising server: {}", e);
                exit_code = ExitCode::FAILURE;
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    if let Err(e) = server.stop() {
        warn!("Error stopping server: {}", e);
    }
    exit_code
}
