use std::sync::Arc;
use std::time::Duration;
use log::{info, warn};
use thiserror::Error;

use crate::config::{AppConfig, ConfigError};
use crate::data::CredentialRecord;
use crate::helpers::credential_store::{CredentialStore, CredentialStoreError};
use crate::helpers::http_client::HttpClientError;
use crate::helpers::spotify::{OAuthClient, SpotifyApi};
use crate::helpers::{AccessGuard, CommandRunner, ExecutableRelay, Session};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot load stored credentials: {0}")]
    Credentials(#[from] CredentialStoreError),

    #[error("Cannot create HTTP client: {0}")]
    Http(#[from] HttpClientError),
}

/// Everything a request handler needs, shared as Rocket managed state.
///
/// The session is the only mutable part. It is filled from the credential
/// file at startup and afterwards changed only by the OAuth client.
pub struct ControlContext {
    pub session: Arc<Session>,
    pub oauth: Arc<OAuthClient>,
    pub api: Arc<SpotifyApi>,
    pub guard: AccessGuard,
    pub relay: Arc<dyn CommandRunner>,
    /// Where the OAuth callback sends the browser after a successful login
    pub control_page: String,
}

impl ControlContext {
    /// Assemble a context from an already loaded credential record
    pub fn new(
        config: &AppConfig,
        relay: Arc<dyn CommandRunner>,
        initial: Option<CredentialRecord>,
    ) -> Result<Self, StartupError> {
        let store = CredentialStore::new(&config.credentials_file);
        let oauth = Arc::new(OAuthClient::new(config.spotify.clone(), store)?);
        let api = Arc::new(SpotifyApi::new(config.spotify.clone())?);

        Ok(ControlContext {
            session: Arc::new(Session::new(initial)),
            guard: AccessGuard::new(oauth.clone(), api.clone()),
            oauth,
            api,
            relay,
            control_page: config.webserver.control_page.clone(),
        })
    }

    /// Build the production context: validate the configuration, read the
    /// credential file and use the control executable as relay.
    ///
    /// A credential file that exists but cannot be parsed is an error.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        config.validate()?;

        let store = CredentialStore::new(&config.credentials_file);
        let initial = store.load()?;
        match &initial {
            Some(record) => info!(
                "Loaded stored credentials from {} (refresh token: {})",
                store.path().display(),
                if record.has_refresh_token() { "yes" } else { "no" }
            ),
            None => info!("No stored credentials at {}, login required", store.path().display()),
        }

        if !config.control.executable.exists() {
            warn!(
                "Control executable {} not found, playback commands will fail",
                config.control.executable.display()
            );
        }

        let relay = ExecutableRelay::new(
            &config.control.executable,
            Duration::from_secs(config.control.timeout_secs),
        );

        Self::new(config, Arc::new(relay), initial)
    }
}
