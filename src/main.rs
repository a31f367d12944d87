use clap::Parser;
use log::{error, info};
use spotcontrol::api::server;
use spotcontrol::config::AppConfig;
use spotcontrol::constants::DEFAULT_CONFIG_FILE;
use spotcontrol::logging;
use spotcontrol::ControlContext;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "spotcontrol")]
#[command(version, about = "Control a desktop Spotify client over HTTP", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Port to listen on, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Same as --debug
    #[arg(short, long)]
    verbose: bool,
}

#[rocket::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // A missing .env is normal
    let dotenv_result = dotenvy::dotenv();

    let mut config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::initialize_logging(config.logging.as_ref(), args.debug || args.verbose) {
        eprintln!("Error: Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    info!("SpotControl {} starting", env!("CARGO_PKG_VERSION"));
    if let Ok(path) = dotenv_result {
        info!("Loaded environment from {}", path.display());
    }

    if let Err(e) = config.apply_env_overrides() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }
    if let Some(port) = args.port {
        config.webserver.port = port;
    }

    let context = match ControlContext::from_config(&config) {
        Ok(context) => Arc::new(context),
        Err(e) => {
            error!("Cannot start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Open http://{}:{}/login to connect Spotify", config.webserver.host, config.webserver.port);

    if let Err(e) = server::start_rocket_server(context, &config.webserver).await {
        error!("Webserver error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("SpotControl stopped");
    ExitCode::SUCCESS
}
