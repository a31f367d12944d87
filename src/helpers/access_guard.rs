// Access guard
//
// Checks the access token before every authenticated operation:
//
//   NoToken ──> Unauthorized
//   Unverified ──probe 2xx──> Valid
//   Unverified ──probe 401──> Expired ──refresh ok──> Valid
//                                      └─refresh fails─> Invalid (RefreshFailed)
//   Unverified ──probe other error──> UpstreamUnavailable
//
// There is no expiry cache; each call costs one probe request.

use std::sync::Arc;
use log::{debug, error, info};
use thiserror::Error;

use crate::helpers::http_client::HttpClientError;
use crate::helpers::session::Session;
use crate::helpers::spotify::{OAuthClient, OAuthError, SpotifyApi};

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Not authorized")]
    Unauthorized,

    #[error("Error refreshing access token: {0}")]
    RefreshFailed(#[source] OAuthError),

    #[error("Error validating access token: {0}")]
    UpstreamUnavailable(#[source] HttpClientError),
}

pub struct AccessGuard {
    oauth: Arc<OAuthClient>,
    api: Arc<SpotifyApi>,
}

impl AccessGuard {
    pub fn new(oauth: Arc<OAuthClient>, api: Arc<SpotifyApi>) -> Self {
        AccessGuard { oauth, api }
    }

    /// Make sure the session holds an access token the Web API accepts.
    ///
    /// A rejected token triggers exactly one refresh. Without any access token
    /// no request is made at all.
    pub async fn ensure_valid(&self, session: &Session) -> Result<(), GuardError> {
        let access_token = match session.access_token().await {
            Some(token) => token,
            None => {
                debug!("No access token in session");
                return Err(GuardError::Unauthorized);
            }
        };

        match self.api.probe(&access_token).await {
            Ok(()) => {
                debug!("Access token is valid");
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                info!("Access token rejected by Spotify, attempting refresh");
                self.oauth.refresh(session).await.map(|_| ()).map_err(|e| {
                    error!("Error ensuring valid access token: {}", e);
                    GuardError::RefreshFailed(e)
                })
            }
            Err(e) => {
                error!("Error validating access token: {}", e);
                Err(GuardError::UpstreamUnavailable(e))
            }
        }
    }
}
