use anyhow::{anyhow, Context};
use axum::Router;
use tracing::{info, Level};

mod models;
mod routes;
mod state;
mod utils;

use crate::state::app_state::AppState;
use crate::utils::conf_helper::{get_cached_config, init_config_and_bind, load_lookup_tables};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    // === CONFIG + LISTENER ===
    let listener = init_config_and_bind()
        .await
        .map_err(|e| anyhow!(e))
        .context("startup failed")?;

    let config = get_cached_config().ok_or_else(|| anyhow!("config cache is empty"))?;

    let tables = load_lookup_tables(config).map_err(|e| anyhow!(e))?;
    let state = AppState::new(tables);

    info!(
        "{} {} listening on {}:{}",
        config.name, config.version, config.connection.ip, config.connection.port
    );

    let app = Router::new()
        .merge(routes::info_routes::health_routes())
        .merge(routes::data_routes::data_routes(state));

    axum::serve(listener, app).await.context("server stopped")?;
    Ok(())
}
