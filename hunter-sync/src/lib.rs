//! Cloud sync for Hunter Protocol player records
//!
//! Mirrors the local player blob to a remote `players` table keyed by a
//! per-device id. Pushes are debounced so a burst of local changes becomes a
//! single upsert; a manual push bypasses the debounce.
//!
//! Status transitions:
//!
//! ```text
//! idle ──change──▶ (debounce) ──▶ syncing ──ok──▶ synced
//!                                    │
//!                                    └──err──▶ error (changes kept)
//! any ──set_online(false)──▶ offline ──set_online(true)──▶ idle/synced
//! ```

pub mod client;
pub mod error;
pub mod reconciler;
pub mod status;
pub mod types;

// Re-export main types
pub use client::{RemoteStore, RestRemoteStore};
pub use error::{Result, SyncError};
pub use reconciler::SyncReconciler;
pub use status::{SyncState, SyncStatus};
pub use types::{PlayerRow, SyncConfig, DEFAULT_DEBOUNCE_MS};
