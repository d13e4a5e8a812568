//! Sync status as shown by the UI indicator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sync state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Nothing happened yet, or sync is not configured
    #[default]
    Idle,
    /// A push or pull is in flight
    Syncing,
    /// Last push succeeded
    Synced,
    /// Last push or pull failed
    Error,
    /// Device marked offline; changes are held locally
    Offline,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
            SyncStatus::Offline => "offline",
        };
        f.write_str(s)
    }
}

/// Snapshot of the reconciler state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub status: SyncStatus,
    /// Time of the last successful push
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Message of the last failure
    pub error: Option<String>,
    /// Local changes not yet acknowledged by the remote
    pub has_unsynced_changes: bool,
}

impl SyncState {
    pub fn mark_changed(&mut self) {
        self.has_unsynced_changes = true;
    }

    pub fn mark_syncing(&mut self) {
        self.status = SyncStatus::Syncing;
    }

    /// Push acknowledged. `caught_up` is false when newer changes arrived
    /// while the push was in flight.
    pub fn mark_synced(&mut self, at: DateTime<Utc>, caught_up: bool) {
        self.status = SyncStatus::Synced;
        self.last_synced_at = Some(at);
        self.error = None;
        if caught_up {
            self.has_unsynced_changes = false;
        }
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = SyncStatus::Error;
        self.error = Some(message.into());
        self.has_unsynced_changes = true;
    }

    /// Pull acknowledged. Settles from the push history rather than the
    /// status seen before the pull started.
    pub fn mark_pulled(&mut self) {
        if self.status != SyncStatus::Syncing {
            return;
        }
        if self.has_unsynced_changes && self.error.is_some() {
            self.status = SyncStatus::Error;
            return;
        }
        self.error = None;
        self.status = if self.last_synced_at.is_some() {
            SyncStatus::Synced
        } else {
            SyncStatus::Idle
        };
    }

    /// Pull failed. Local changes are unaffected.
    pub fn mark_pull_failed(&mut self, message: impl Into<String>) {
        self.status = SyncStatus::Error;
        self.error = Some(message.into());
    }

    pub fn mark_offline(&mut self) {
        self.status = SyncStatus::Offline;
    }

    /// Back online: resume from idle, or from synced if nothing is pending
    pub fn mark_online(&mut self) {
        if self.status == SyncStatus::Offline {
            self.status = if self.last_synced_at.is_some() && !self.has_unsynced_changes {
                SyncStatus::Synced
            } else {
                SyncStatus::Idle
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_unsynced_flag() {
        let mut state = SyncState::default();
        state.mark_changed();
        state.mark_syncing();
        state.mark_failed("timeout");

        assert_eq!(state.status, SyncStatus::Error);
        assert_eq!(state.error.as_deref(), Some("timeout"));
        assert!(state.has_unsynced_changes);
    }

    #[test]
    fn test_synced_clears_error() {
        let mut state = SyncState::default();
        state.mark_failed("timeout");
        state.mark_synced(Utc::now(), true);

        assert_eq!(state.status, SyncStatus::Synced);
        assert!(state.error.is_none());
        assert!(!state.has_unsynced_changes);
        assert!(state.last_synced_at.is_some());
    }

    #[test]
    fn test_online_after_offline() {
        let mut state = SyncState::default();
        state.mark_synced(Utc::now(), true);
        state.mark_offline();
        state.mark_online();
        assert_eq!(state.status, SyncStatus::Synced);

        state.mark_changed();
        state.mark_offline();
        state.mark_online();
        assert_eq!(state.status, SyncStatus::Idle);
    }

    #[test]
    fn test_pull_failure_keeps_unsynced_flag_untouched() {
        let mut state = SyncState::default();
        state.mark_synced(Utc::now(), true);
        state.mark_syncing();
        state.mark_pull_failed("connection refused");

        assert_eq!(state.status, SyncStatus::Error);
        assert_eq!(state.error.as_deref(), Some("connection refused"));
        assert!(!state.has_unsynced_changes);
    }

    #[test]
    fn test_pulled_settles_from_push_history() {
        let mut state = SyncState::default();
        state.mark_syncing();
        state.mark_pulled();
        assert_eq!(state.status, SyncStatus::Idle);

        state.mark_synced(Utc::now(), true);
        state.mark_syncing();
        state.mark_pulled();
        assert_eq!(state.status, SyncStatus::Synced);

        // A failed push is still pending after a good pull
        state.mark_failed("timeout");
        state.mark_syncing();
        state.mark_pulled();
        assert_eq!(state.status, SyncStatus::Error);

        // Offline set during the pull wins
        state.mark_offline();
        state.mark_pulled();
        assert_eq!(state.status, SyncStatus::Offline);
    }
}
