use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use serde::Serialize;
use tracing::{debug, error};

pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(info_check))
        .route("/stop", get(stop_process))
}

pub async fn info_check() -> Response {
    match crate::utils::conf_helper::get_cached_config() {
        Some(config) => {
            debug!("{} requested", config.name);
            Json(config).into_response()
        }
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn health_check() -> Response {
    Json(HealthStatus {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION"),
    })
    .into_response()
}

async fn stop_process() -> impl IntoResponse {
    error!("Stop endpoint called, shutting down process");

    // short delay so the response and log lines get out
    tokio::spawn(async {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        std::process::exit(0);
    });

    StatusCode::OK
}

#[derive(Serialize)]
pub struct HealthStatus {
    status: String,
    version: &'static str,
}
