use serde::{Deserialize, Serialize};

/// Tokens obtained from the Spotify accounts service.
///
/// This is the only persisted entity. The field names match the credential
/// file written by earlier versions (`accessToken`, `refreshToken`, `expiresIn`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// Bearer token sent to the Web API
    pub access_token: String,

    /// Token used to obtain a new access token; missing if the provider never sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Lifetime reported by the provider in seconds. Advisory only, never checked against a clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl CredentialRecord {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>, expires_in: Option<u64>) -> Self {
        CredentialRecord {
            access_token: access_token.into(),
            refresh_token,
            expires_in,
        }
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().map(|t| !t.is_empty()).unwrap_or(false)
    }
}
