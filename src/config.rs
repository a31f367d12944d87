// Configuration for SpotControl
//
// The configuration is a JSON file with one section per service under
// "services" ("spotify", "webserver", "control"). Sections at the top level
// are still accepted. Environment variables override the file so that the
// Spotify client credentials can live in a .env file.

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{
    CONTROL_PAGE, DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_CONTROL_EXECUTABLE, DEFAULT_CREDENTIALS_FILE,
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_STATIC_DIR,
};
use crate::helpers::spotify::SpotifyConfig;
use crate::logging::LoggingConfig;

pub const ENV_CLIENT_ID: &str = "CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "REDIRECT_URI";
pub const ENV_PORT: &str = "SPOTCONTROL_PORT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Helper function to get service configuration with backward compatibility
///
/// Looks in the "services" section first, then at the top level.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use spotcontrol::config::get_service_config;
///
/// let config = json!({
///   "services": {
///     "spotify": { "client_id": "abc" }
///   }
/// });
/// assert_eq!(get_service_config(&config, "spotify").unwrap()["client_id"], "abc");
///
/// let old_config = json!({
///   "spotify": { "client_id": "def" }
/// });
/// assert_eq!(get_service_config(&old_config, "spotify").unwrap()["client_id"], "def");
/// ```
pub fn get_service_config<'a>(config: &'a Value, service_name: &str) -> Option<&'a Value> {
    if let Some(service_config) = config.get("services").and_then(|s| s.get(service_name)) {
        debug!("Found {} configuration in services section", service_name);
        return Some(service_config);
    }

    if let Some(service_config) = config.get(service_name) {
        debug!("Found {} configuration at top level (legacy structure)", service_name);
        return Some(service_config);
    }

    debug!("No {} configuration found, using defaults", service_name);
    None
}

/// Where and how the control server listens
#[derive(Debug, Clone)]
pub struct WebserverConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the UI pages; not mounted if it does not exist
    pub static_dir: Option<PathBuf>,
    /// Page the OAuth callback redirects to
    pub control_page: String,
}

impl Default for WebserverConfig {
    fn default() -> Self {
        WebserverConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: Some(PathBuf::from(DEFAULT_STATIC_DIR)),
            control_page: CONTROL_PAGE.to_string(),
        }
    }
}

/// The external playback control executable
#[derive(Debug, Clone)]
pub struct ControlConfig {
    pub executable: PathBuf,
    pub timeout_secs: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            executable: PathBuf::from(DEFAULT_CONTROL_EXECUTABLE),
            timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub webserver: WebserverConfig,
    pub control: ControlConfig,
    pub credentials_file: PathBuf,
    pub logging: Option<LoggingConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            spotify: SpotifyConfig::default(),
            webserver: WebserverConfig::default(),
            control: ControlConfig::default(),
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            logging: None,
        }
    }
}

impl AppConfig {
    /// Read the configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::from_json(&Value::Null);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let json: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded configuration from {}", path.display());
        Self::from_json(&json)
    }

    pub fn from_json(config_json: &Value) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let spotify_json = get_service_config(config_json, "spotify");
        let spotify = spotify_json.map(SpotifyConfig::from_json).unwrap_or_default();

        let credentials_file = spotify_json
            .and_then(|s| s.get("credentials_file"))
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or(defaults.credentials_file);

        let webserver = match get_service_config(config_json, "webserver") {
            Some(ws) => {
                let port = match ws.get("port").and_then(|p| p.as_u64()) {
                    Some(p) => u16::try_from(p).map_err(|_| ConfigError::Invalid {
                        key: "webserver.port",
                        message: format!("{} is not a valid port", p),
                    })?,
                    None => defaults.webserver.port,
                };

                let static_dir = match ws.get("static_dir") {
                    Some(Value::String(s)) if s.is_empty() => None,
                    Some(Value::String(s)) => Some(PathBuf::from(s)),
                    Some(Value::Null) | Some(Value::Bool(false)) => None,
                    _ => defaults.webserver.static_dir,
                };

                WebserverConfig {
                    host: ws
                        .get("host")
                        .and_then(|h| h.as_str())
                        .map(str::to_string)
                        .unwrap_or(defaults.webserver.host),
                    port,
                    static_dir,
                    control_page: ws
                        .get("control_page")
                        .and_then(|p| p.as_str())
                        .map(str::to_string)
                        .unwrap_or(defaults.webserver.control_page),
                }
            }
            None => defaults.webserver,
        };

        let control = match get_service_config(config_json, "control") {
            Some(c) => ControlConfig {
                executable: c
                    .get("executable")
                    .and_then(|e| e.as_str())
                    .map(PathBuf::from)
                    .unwrap_or(defaults.control.executable),
                timeout_secs: c
                    .get("timeout_secs")
                    .and_then(|t| t.as_u64())
                    .unwrap_or(defaults.control.timeout_secs),
            },
            None => defaults.control,
        };

        let logging = match config_json.get("logging") {
            Some(l) => Some(serde_json::from_value::<LoggingConfig>(l.clone()).map_err(|e| ConfigError::Invalid {
                key: "logging",
                message: e.to_string(),
            })?),
            None => None,
        };

        Ok(AppConfig {
            spotify,
            webserver,
            control,
            credentials_file,
            logging,
        })
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(client_id) = lookup(ENV_CLIENT_ID) {
            self.spotify.client_id = client_id;
        }
        if let Some(client_secret) = lookup(ENV_CLIENT_SECRET) {
            self.spotify.client_secret = client_secret;
        }
        if let Some(redirect_uri) = lookup(ENV_REDIRECT_URI) {
            self.spotify.redirect_uri = redirect_uri;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.webserver.port = port.parse().map_err(|_| ConfigError::Invalid {
                key: "SPOTCONTROL_PORT",
                message: format!("{} is not a valid port", port),
            })?;
        }
        Ok(())
    }

    /// Check that everything needed to talk to Spotify is present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spotify.client_id.is_empty() {
            return Err(ConfigError::Missing("client_id"));
        }
        if self.spotify.client_secret.is_empty() {
            return Err(ConfigError::Missing("client_secret"));
        }
        if self.spotify.redirect_uri.is_empty() {
            return Err(ConfigError::Missing("redirect_uri"));
        }

        for (key, value) in [
            ("spotify.redirect_uri", &self.spotify.redirect_uri),
            ("spotify.accounts_url", &self.spotify.accounts_url),
            ("spotify.api_url", &self.spotify.api_url),
        ] {
            url::Url::parse(value).map_err(|e| ConfigError::Invalid {
                key,
                message: e.to_string(),
            })?;
        }

        if self.control.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "control.timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
