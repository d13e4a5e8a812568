//! On-disk key/value store standing in for browser local storage
//!
//! Each key lives in its own `<key>.json` file under the store root. Writes go
//! through a temp file and a rename so a crash never leaves half a blob.
//! Entries that fail to parse are treated as corrupted: they are removed and
//! reads fall back to "missing".

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::StoreResult;
use crate::model::Player;

/// Key holding the serialized player
pub const PLAYER_KEY: &str = "player";
/// Key holding this device's sync identifier
pub const DEVICE_ID_KEY: &str = "device_id";

/// JSON file store rooted at a directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open (and create if needed) a store at `root`
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Read and parse a key.
    ///
    /// Missing keys and corrupted entries both yield `Ok(None)`; a corrupted
    /// entry is deleted so the next write starts clean.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let path = self.path_for(key);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // Invalid UTF-8 surfaces as a parse error, not an I/O error
        match serde_json::from_slice(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "Discarding corrupted entry");
                if let Err(e) = fs::remove_file(&path) {
                    warn!(key, error = %e, "Failed to remove corrupted entry");
                }
                Ok(None)
            }
        }
    }

    /// Serialize and write a key atomically
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{}.json.tmp", key));
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        debug!(key, "Stored entry");
        Ok(())
    }

    /// Remove a key. Returns whether it existed.
    pub fn remove(&self, key: &str) -> StoreResult<bool> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // ==================== Player ====================

    pub fn load_player(&self) -> StoreResult<Option<Player>> {
        self.get(PLAYER_KEY)
    }

    /// Load the player, falling back to a fresh default on any failure
    pub fn load_player_or_default(&self) -> Player {
        match self.load_player() {
            Ok(Some(player)) => player,
            Ok(None) => Player::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read player, using default");
                Player::default()
            }
        }
    }

    pub fn save_player(&self, player: &Player) -> StoreResult<()> {
        self.set(PLAYER_KEY, player)
    }

    // ==================== Device identity ====================

    /// This device's sync identifier, generated and persisted on first use
    pub fn device_id(&self) -> StoreResult<String> {
        if let Some(id) = self.get::<String>(DEVICE_ID_KEY)? {
            if !id.is_empty() {
                return Ok(id);
            }
        }
        let id = format!("device-{}", uuid::Uuid::new_v4());
        self.set(DEVICE_ID_KEY, &id)?;
        info!(device_id = %id, "Generated new device id");
        Ok(id)
    }
}
