use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Serialize};
use env_logger::{Builder, Target, WriteStyle};

/// Logging subsystems of spotcontrol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoggingSubsystem {
    /// Main application logging
    #[serde(rename = "main")]
    Main,
    /// HTTP routes
    #[serde(rename = "api")]
    Api,
    /// OAuth and Web API calls
    #[serde(rename = "spotify")]
    Spotify,
    /// Token validation and refresh
    #[serde(rename = "auth")]
    Auth,
    /// Credential file
    #[serde(rename = "credentials")]
    Credentials,
    /// External control executable
    #[serde(rename = "control")]
    Control,
    /// Server process management in the launcher
    #[serde(rename = "process")]
    Process,
    /// Configuration loading
    #[serde(rename = "config")]
    Config,
    /// HTTP client and server libraries
    #[serde(rename = "deps")]
    Dependencies,
}

impl LoggingSubsystem {
    /// Module prefixes covered by this subsystem, comma separated
    pub fn module_prefix(&self) -> &'static str {
        match self {
            LoggingSubsystem::Main => "spotcontrol",
            LoggingSubsystem::Api => "spotcontrol::api",
            LoggingSubsystem::Spotify => "spotcontrol::helpers::spotify,spotcontrol::helpers::http_client",
            LoggingSubsystem::Auth => "spotcontrol::helpers::access_guard,spotcontrol::helpers::session",
            LoggingSubsystem::Credentials => "spotcontrol::helpers::credential_store",
            LoggingSubsystem::Control => "spotcontrol::helpers::control_relay",
            LoggingSubsystem::Process => "spotcontrol::helpers::process_helper,spotcontrol::desktop",
            LoggingSubsystem::Config => "spotcontrol::config",
            LoggingSubsystem::Dependencies => "rocket,reqwest,hyper",
        }
    }

    fn parse(name: &str) -> Option<LoggingSubsystem> {
        match name.to_lowercase().as_str() {
            "main" => Some(LoggingSubsystem::Main),
            "api" => Some(LoggingSubsystem::Api),
            "spotify" => Some(LoggingSubsystem::Spotify),
            "auth" => Some(LoggingSubsystem::Auth),
            "credentials" => Some(LoggingSubsystem::Credentials),
            "control" => Some(LoggingSubsystem::Control),
            "process" => Some(LoggingSubsystem::Process),
            "config" => Some(LoggingSubsystem::Config),
            "deps" | "dependencies" => Some(LoggingSubsystem::Dependencies),
            _ => None,
        }
    }
}

/// Logging configuration, the "logging" section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Target for log output (stdout, stderr, file)
    #[serde(default = "default_target")]
    pub target: String,

    /// Log file path (when target is "file")
    pub file_path: Option<String>,

    #[serde(default = "default_true")]
    pub timestamps: bool,

    #[serde(default = "default_true")]
    pub colors: bool,

    /// Subsystem-specific log levels
    #[serde(default)]
    pub subsystems: HashMap<String, String>,

    #[serde(default)]
    pub include_module_path: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_target() -> String {
    "stdout".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            target: default_target(),
            file_path: None,
            timestamps: true,
            colors: true,
            subsystems: HashMap::new(),
            include_module_path: false,
        }
    }
}

impl LoggingConfig {
    fn parse_log_level(level: &str) -> LevelFilter {
        match level.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => {
                eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", level);
                LevelFilter::Info
            }
        }
    }

    /// (module, level) pairs for the configured subsystems
    fn module_filters(&self) -> Vec<(String, LevelFilter)> {
        let mut filters = Vec::new();
        for (name, level) in &self.subsystems {
            let level = Self::parse_log_level(level);
            match LoggingSubsystem::parse(name) {
                Some(subsystem) => {
                    for prefix in subsystem.module_prefix().split(',') {
                        filters.push((prefix.trim().to_string(), level));
                    }
                }
                // Allow custom module specifications
                None => filters.push((name.clone(), level)),
            }
        }
        filters.sort();
        filters
    }

    /// Filter in env_logger syntax, for display
    pub fn build_filter_string(&self) -> String {
        let mut parts = vec![self.level.to_lowercase()];
        for (module, level) in self.module_filters() {
            parts.push(format!("{}={}", module, level.as_str().to_lowercase()));
        }
        parts.join(",")
    }

    /// Initialize the global logger with this configuration
    pub fn initialize_logger(&self) -> Result<(), String> {
        let mut builder = Builder::new();

        builder.filter(None, Self::parse_log_level(&self.level));
        for (module, level) in self.module_filters() {
            builder.filter(Some(&module), level);
        }

        // RUST_LOG wins over the file
        builder.parse_env("RUST_LOG");

        builder.write_style(if self.colors { WriteStyle::Auto } else { WriteStyle::Never });

        match self.target.to_lowercase().as_str() {
            "stdout" => {
                builder.target(Target::Stdout);
            }
            "stderr" => {
                builder.target(Target::Stderr);
            }
            "file" => {
                let path = self
                    .file_path
                    .as_ref()
                    .ok_or_else(|| "File target specified but no file_path provided".to_string())?;
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| format!("Failed to open log file {}: {}", path, e))?;
                builder.target(Target::Pipe(Box::new(file)));
                builder.write_style(WriteStyle::Never);
            }
            _ => {
                return Err(format!("Unknown logging target: {}", self.target));
            }
        }

        let timestamps = self.timestamps;
        let include_module_path = self.include_module_path;
        builder.format(move |buf, record| {
            if timestamps {
                write!(buf, "[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
            }
            write!(buf, "[{}] ", record.level())?;
            if include_module_path {
                if let Some(module) = record.module_path() {
                    write!(buf, "[{}] ", module)?;
                }
            }
            writeln!(buf, "{}", record.args())
        });

        builder
            .try_init()
            .map_err(|e| format!("Failed to initialize logger: {}", e))?;

        debug!("Logging initialized with filter: {}", self.build_filter_string());
        Ok(())
    }
}

/// Initialize logging from the optional config section and the -d/-v flags
pub fn initialize_logging(config: Option<&LoggingConfig>, debug_mode: bool) -> Result<(), String> {
    let mut config = config.cloned().unwrap_or_default();
    if debug_mode {
        config.level = "debug".to_string();
    }
    config.initialize_logger()?;
    if debug_mode {
        info!("Debug logging enabled via command line");
    }
    Ok(())
}
