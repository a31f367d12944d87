use crate::api::{control, spotify};
use crate::config::WebserverConfig;
use crate::context::ControlContext;

use log::{info, warn};
use rocket::{routes, get, Build, Rocket};
use rocket::serde::json::Json;
use rocket::config::Config;
use rocket::fs::FileServer;
use std::sync::Arc;

#[derive(serde::Serialize)]
struct VersionResponse {
    version: String,
}

// Also used by the launcher as health check
#[get("/version")]
fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the Rocket instance with all routes and the shared context
pub fn build_rocket(context: Arc<ControlContext>, webserver: &WebserverConfig) -> Rocket<Build> {
    let config = Config::figment()
        .merge(("port", webserver.port))
        .merge(("address", webserver.host.as_str()));

    let routes = routes![
        get_version,
        spotify::login,
        spotify::callback,
        spotify::check_token,
        spotify::get_playback,
        control::playpause,
        control::next,
        control::previous,
    ];

    let mut rocket_builder = rocket::custom(config)
        .mount("/", routes)
        .manage(context);

    match &webserver.static_dir {
        Some(directory) if directory.is_dir() => {
            info!("Serving static files from '{}'", directory.display());
            // Rank 20 keeps the API routes ahead of same-named files
            rocket_builder = rocket_builder.mount("/", FileServer::from(directory).rank(20));
        }
        Some(directory) => {
            warn!("Static directory '{}' does not exist, pages will not be served", directory.display());
        }
        None => info!("Static file serving disabled"),
    }

    rocket_builder
}

// Start the Rocket server
pub async fn start_rocket_server(context: Arc<ControlContext>, webserver: &WebserverConfig) -> Result<(), rocket::Error> {
    info!("Starting webserver on {}:{}", webserver.host, webserver.port);

    let _rocket = build_rocket(context, webserver).launch().await?;

    Ok(())
}
