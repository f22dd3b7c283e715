use std::sync::OnceLock;
use tokio::fs;
use tokio::net::TcpListener;
use tracing::info;

use crate::models::extension_model::ExtensionConfig;
use snapshot_reader::LookupTables;

static CONFIG_CACHE: OnceLock<ExtensionConfig> = OnceLock::new();

pub async fn init_config_and_bind() -> Result<TcpListener, String> {
    let file_path = "plugin.json";

    let data = fs::read_to_string(file_path)
        .await
        .map_err(|e| format!("File read Error: {e} {file_path}"))?;

    let mut config: ExtensionConfig =
        serde_json::from_str(&data).map_err(|e| format!("JSON Parse Error: {e}"))?;

    let bind_addr = format!("{}:{}", config.connection.ip, config.connection.port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("Bind failed: {e}"))?;

    let actual_port = listener
        .local_addr()
        .map_err(|e| format!("Addr error: {e}"))?
        .port();

    // port 0 in plugin.json means "pick one"
    config.connection.port = actual_port;

    CONFIG_CACHE
        .set(config)
        .map_err(|_| "Config already initialized".to_string())?;

    info!("Config initialized with dynamic port: {}", actual_port);

    Ok(listener)
}

pub fn get_cached_config() -> Option<&'static ExtensionConfig> {
    CONFIG_CACHE.get()
}

/// Lookup tables named in plugin.json, or the built-in set.
pub fn load_lookup_tables(config: &ExtensionConfig) -> Result<LookupTables, String> {
    match &config.lookup_tables {
        Some(path) => {
            let tables = LookupTables::from_file(path)
                .map_err(|e| format!("Lookup table load failed: {e} {path}"))?;
            info!("Lookup tables loaded from {}", path);
            Ok(tables)
        }
        None => {
            info!("Using built-in lookup tables");
            Ok(LookupTables::default())
        }
    }
}
