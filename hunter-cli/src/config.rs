//! CLI configuration

use anyhow::Context;
use hunter_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the local JSON entries
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default tracing filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_data_dir() -> PathBuf { PathBuf::from("hunter-data") }
fn default_log_filter() -> String { "hunter=info".to_string() }

impl Config {
    /// Load from a TOML file, or defaults when the file does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage.data_dir, PathBuf::from("hunter-data"));
        assert_eq!(config.sync.table, "players");
        assert_eq!(config.sync.debounce_ms, 2000);
        assert!(!config.sync.is_configured());
    }

    #[test]
    fn test_config_with_all_fields() {
        let config = Config::from_toml(
            r#"
[storage]
data_dir = "/var/lib/hunter"

[sync]
url = "https://db.example.co"
api_key = "anon-key"
table = "hunters"
timeout_secs = 10
debounce_ms = 500

[log]
filter = "hunter=debug"
"#,
        )
        .unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/hunter"));
        assert!(config.sync.is_configured());
        assert_eq!(config.sync.table, "hunters");
        assert_eq!(config.sync.timeout_secs, 10);
        assert_eq!(config.sync.debounce_ms, 500);
        assert_eq!(config.log.filter, "hunter=debug");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
