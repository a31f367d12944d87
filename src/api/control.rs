// Playback control routes, relayed to the control executable

use std::sync::Arc;
use log::{info, warn};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::{post, State};

use crate::api::{guard_failure, relay_failure};
use crate::context::ControlContext;
use crate::data::ControlCommand;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayPauseResponse {
    result: String,
    playback_info: String,
}

async fn relay(context: &ControlContext, command: ControlCommand) -> Result<String, Custom<String>> {
    context.guard.ensure_valid(&context.session).await.map_err(guard_failure)?;
    info!("Sending {} to control executable", command);
    context.relay.send(command).await.map_err(relay_failure)
}

/// Toggle playback and report the player state afterwards
#[post("/playpause")]
pub async fn playpause(context: &State<Arc<ControlContext>>) -> Result<Json<PlayPauseResponse>, Custom<String>> {
    let result = relay(context, ControlCommand::PlayPause).await?;

    let playback_info = context.relay.send(ControlCommand::FetchState).await.map_err(|e| {
        warn!("Play/pause succeeded but fetching state failed: {}", e);
        relay_failure(e)
    })?;

    Ok(Json(PlayPauseResponse { result, playback_info }))
}

#[post("/next")]
pub async fn next(context: &State<Arc<ControlContext>>) -> Result<String, Custom<String>> {
    relay(context, ControlCommand::Next).await
}

#[post("/previous")]
pub async fn previous(context: &State<Arc<ControlContext>>) -> Result<String, Custom<String>> {
    relay(context, ControlCommand::Previous).await
}
