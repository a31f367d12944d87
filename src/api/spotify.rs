// Login flow and Spotify state routes

use std::sync::Arc;
use log::{debug, error, info, warn};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::{get, State};
use serde_json::{json, Value};

use crate::context::ControlContext;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatus {
    has_token: bool,
}

/// Send the browser to the Spotify consent page
#[get("/login")]
pub fn login(context: &State<Arc<ControlContext>>) -> Result<Redirect, Custom<String>> {
    match context.oauth.authorization_url() {
        Ok(url) => {
            debug!("Redirecting to Spotify authorization");
            Ok(Redirect::found(url))
        }
        Err(e) => {
            error!("Cannot build authorization URL: {}", e);
            Err(Custom(Status::InternalServerError, e.to_string()))
        }
    }
}

/// OAuth redirect target. Failures are reported as plain text with status 200.
#[get("/callback?<code>&<error>")]
pub async fn callback(
    code: Option<String>,
    error: Option<String>,
    context: &State<Arc<ControlContext>>,
) -> Result<Redirect, String> {
    if let Some(reason) = error {
        warn!("Spotify authorization was not granted: {}", reason);
    }

    let code = match code.filter(|c| !c.is_empty()) {
        Some(code) => code,
        None => return Err("Error: No code found".to_string()),
    };

    match context.oauth.exchange_code(&context.session, &code).await {
        Ok(_) => {
            info!("Login completed, redirecting to {}", context.control_page);
            Ok(Redirect::found(context.control_page.clone()))
        }
        Err(e) => {
            error!("Error during token exchange: {}", e);
            Err("Error during token exchange".to_string())
        }
    }
}

/// Whether the server holds a token Spotify accepts, refreshing it if needed
#[get("/check-token")]
pub async fn check_token(context: &State<Arc<ControlContext>>) -> Json<TokenStatus> {
    let has_token = match context.guard.ensure_valid(&context.session).await {
        Ok(()) => true,
        Err(e) => {
            debug!("Token check failed: {}", e);
            false
        }
    };
    Json(TokenStatus { has_token })
}

/// Current playback state as returned by the Web API.
///
/// Only checks that a token is present; an expired token shows up as a
/// fetch error.
#[get("/playback")]
pub async fn get_playback(context: &State<Arc<ControlContext>>) -> Result<Json<Value>, Custom<String>> {
    let access_token = context
        .session
        .access_token()
        .await
        .ok_or_else(|| Custom(Status::Unauthorized, "Not authorized".to_string()))?;

    match context.api.playback_state(&access_token).await {
        Ok(Some(playback)) => Ok(Json(playback)),
        Ok(None) => Ok(Json(json!({
            "is_playing": false,
            "message": "No active playback"
        }))),
        Err(e) => {
            error!("Error fetching playback info: {}", e);
            Err(Custom(Status::InternalServerError, "Error fetching playback info".to_string()))
        }
    }
}
