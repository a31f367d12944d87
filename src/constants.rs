// Default values shared by the server and the launcher

/// Port the control server listens on unless configured otherwise
pub const DEFAULT_PORT: u16 = 8888;

pub const DEFAULT_HOST: &str = "127.0.0.1";

pub const DEFAULT_CONFIG_FILE: &str = "spotcontrol.json";

/// Credential file, relative to the working directory of the server
pub const DEFAULT_CREDENTIALS_FILE: &str = "spotify-token.json";

/// Directory holding index.html and controls.html
pub const DEFAULT_STATIC_DIR: &str = "public";

pub const LOGIN_PAGE: &str = "/index.html";
pub const CONTROL_PAGE: &str = "/controls.html";

#[cfg(windows)]
pub const DEFAULT_CONTROL_EXECUTABLE: &str = "spotify_control.exe";
#[cfg(not(windows))]
pub const DEFAULT_CONTROL_EXECUTABLE: &str = "spotify_control";

pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
