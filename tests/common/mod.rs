// Common helpers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use rocket::local::asynchronous::Client;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::MockServer;

use spotcontrol::api::server::build_rocket;
use spotcontrol::config::AppConfig;
use spotcontrol::helpers::{CommandRunner, RelayError};
use spotcontrol::{ControlCommand, ControlContext, CredentialRecord};

/// Relay that records commands instead of running an executable.
///
/// Answers `"<command>-ok"`, or fails every command when built with `failing()`.
#[derive(Default)]
pub struct StubRelay {
    calls: Mutex<Vec<ControlCommand>>,
    failing: bool,
}

impl StubRelay {
    pub fn failing() -> Self {
        StubRelay {
            calls: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn calls(&self) -> Vec<ControlCommand> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for StubRelay {
    async fn send(&self, command: ControlCommand) -> Result<String, RelayError> {
        self.calls.lock().unwrap().push(command);
        if self.failing {
            return Err(RelayError::CommandExecutionFailed {
                command: command.to_string(),
                stderr: "spotify is not running".to_string(),
            });
        }
        Ok(format!("{}-ok", command))
    }
}

pub struct TestApp {
    pub client: Client,
    pub context: Arc<ControlContext>,
    pub relay: Arc<StubRelay>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn credentials_file(&self) -> PathBuf {
        self.dir.path().join("spotify-token.json")
    }

    pub fn stored_credentials(&self) -> Option<CredentialRecord> {
        let content = std::fs::read_to_string(self.credentials_file()).ok()?;
        serde_json::from_str(&content).ok()
    }
}

pub fn test_config(provider: &MockServer, dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.spotify.client_id = "client123".to_string();
    config.spotify.client_secret = "secret456".to_string();
    config.spotify.redirect_uri = "http://127.0.0.1:8888/callback".to_string();
    config.spotify.accounts_url = provider.uri();
    config.spotify.api_url = provider.uri();
    config.credentials_file = dir.path().join("spotify-token.json");
    config.webserver.static_dir = None;
    config
}

/// Rocket client against a server whose Spotify endpoints point at `provider`
pub async fn test_app(provider: &MockServer, initial: Option<CredentialRecord>) -> TestApp {
    test_app_with_relay(provider, initial, StubRelay::default()).await
}

pub async fn test_app_with_relay(
    provider: &MockServer,
    initial: Option<CredentialRecord>,
    relay: StubRelay,
) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(provider, &dir);
    let relay = Arc::new(relay);

    let context = Arc::new(
        ControlContext::new(&config, relay.clone(), initial).expect("context"),
    );
    let client = Client::tracked(build_rocket(context.clone(), &config.webserver))
        .await
        .expect("valid rocket instance");

    TestApp { client, context, relay, dir }
}

pub fn tokens(access: &str, refresh: Option<&str>) -> CredentialRecord {
    CredentialRecord::new(access, refresh.map(str::to_string), Some(3600))
}
