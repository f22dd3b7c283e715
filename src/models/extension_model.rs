use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtensionConfig {
    pub name: String,
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_file_formats")]
    pub file_formats: Vec<String>,
    pub connection: Connection,
    /// JSON file with label / fingerprint / unit tables; built-in tables when absent.
    #[serde(default)]
    pub lookup_tables: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Connection {
    pub ip: String,
    pub port: u16,
}

fn default_enabled() -> bool {
    true
}

fn default_file_formats() -> Vec<String> {
    vec![".xls".to_string(), ".xlsx".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_plugin_json() {
        let json = r#"{
            "name": "Snapshot Decoder",
            "id": "snapshot_decoder",
            "version": "0.3.0",
            "connection": { "ip": "127.0.0.1", "port": 0 }
        }"#;
        let config: ExtensionConfig = serde_json::from_str(json).unwrap();
        assert!(config.enabled);
        assert_eq!(config.file_formats, vec![".xls", ".xlsx"]);
        assert!(config.lookup_tables.is_none());
    }
}
