//! Types for the remote `players` table

use chrono::{DateTime, Utc};
use hunter_core::Player;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

/// Default debounce between a local change and the push it triggers
pub const DEFAULT_DEBOUNCE_MS: u64 = 2000;

/// Cloud sync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the backend (e.g. "https://xyz.example.co")
    pub url: Option<String>,
    /// Anonymous API key sent as `apikey` and bearer token
    pub api_key: Option<String>,
    /// Table holding one row per device
    pub table: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Debounce window in milliseconds (default: 2000)
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: "players".to_string(),
            timeout_secs: 30,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl SyncConfig {
    /// Both URL and key are present and non-empty
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.url) && present(&self.api_key)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// One row of the remote table, upserted on `device_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub device_id: String,
    /// Whole player record as a JSON blob
    pub player_data: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl PlayerRow {
    pub fn from_player(device_id: impl Into<String>, player: &Player) -> Result<Self> {
        Ok(Self {
            device_id: device_id.into(),
            player_data: serde_json::to_value(player)?,
            updated_at: Utc::now(),
        })
    }

    pub fn to_player(&self) -> Result<Player> {
        Ok(Player::deserialize(&self.player_data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configured() {
        let mut config = SyncConfig::default();
        assert!(!config.is_configured());

        config.url = Some("https://db.example.co".into());
        assert!(!config.is_configured());

        config.api_key = Some("  ".into());
        assert!(!config.is_configured());

        config.api_key = Some("anon-key".into());
        assert!(config.is_configured());
        assert_eq!(config.debounce(), Duration::from_secs(2));
    }

    #[test]
    fn test_row_wire_format() {
        let player = Player::new("Jin");
        let row = PlayerRow::from_player("device-1", &player).unwrap();
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["device_id"], "device-1");
        assert_eq!(json["player_data"]["name"], "Jin");
        assert!(json["updated_at"].is_string());
        assert_eq!(row.to_player().unwrap(), player);
    }
}
