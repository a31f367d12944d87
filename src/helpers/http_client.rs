use std::time::Duration;
use log::{debug, error};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Error types that can occur when talking to the Spotify services
#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("HTTP request error: {0}")]
    RequestError(String),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl HttpClientError {
    /// True if the server answered 401 Unauthorized
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HttpClientError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED.as_u16())
    }
}

impl From<reqwest::Error> for HttpClientError {
    fn from(e: reqwest::Error) -> Self {
        HttpClientError::RequestError(e.to_string())
    }
}

/// Create a new HTTP client with the given overall request timeout
pub fn new_http_client(timeout_secs: u64) -> Result<Client, HttpClientError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(HttpClientError::from)
}

/// Turn a response into JSON.
///
/// Non-2xx responses become [`HttpClientError::Status`] carrying the body.
/// An empty body (e.g. 204 No Content) is returned as `Value::Null`.
pub async fn read_json(response: Response) -> Result<Value, HttpClientError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    if !status.is_success() {
        debug!("{} returned {}: {}", url, status, text);
        return Err(HttpClientError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str::<Value>(&text).map_err(|e| {
        error!("Failed to parse JSON response from {}: {}", url, e);
        HttpClientError::ParseError(e.to_string())
    })
}
