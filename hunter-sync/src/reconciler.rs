//! Debounced push/pull of the player blob
//!
//! Every local mutation calls [`SyncReconciler::schedule_push`], which
//! replaces the pending snapshot and restarts a single debounce timer. When
//! the timer fires, the latest snapshot is upserted under this device's id.
//! A burst of mutations therefore costs one network call.
//!
//! There is no merge: the last upsert for a device id wins.

use chrono::Utc;
use hunter_core::Player;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{RemoteStore, RestRemoteStore};
use crate::error::{Result, SyncError};
use crate::status::SyncState;
use crate::types::{PlayerRow, SyncConfig, DEFAULT_DEBOUNCE_MS};

struct Inner {
    remote: Option<Arc<dyn RemoteStore>>,
    device_id: String,
    online: AtomicBool,
    state: watch::Sender<SyncState>,
    /// Latest snapshot waiting to be pushed
    pending: Mutex<Option<Player>>,
    /// Serializes pushes: at most one in flight
    push_lock: Mutex<()>,
}

impl Inner {
    fn remote(&self) -> Result<&Arc<dyn RemoteStore>> {
        self.remote.as_ref().ok_or(SyncError::NotConfigured)
    }

    /// Push the pending snapshot, if any.
    async fn flush(&self) -> Result<()> {
        let remote = self.remote()?;
        if !self.online.load(Ordering::SeqCst) {
            self.state.send_modify(|s| s.mark_offline());
            return Err(SyncError::Offline);
        }

        let _guard = self.push_lock.lock().await;
        let Some(player) = self.pending.lock().await.take() else {
            // Another flush already sent it
            return Ok(());
        };

        self.state.send_modify(|s| s.mark_syncing());
        let result = match PlayerRow::from_player(&self.device_id, &player) {
            Ok(row) => remote.upsert(&row).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                let caught_up = self.pending.lock().await.is_none();
                self.state
                    .send_modify(|s| s.mark_synced(Utc::now(), caught_up));
                info!(device_id = %self.device_id, "Player synced");
                Ok(())
            }
            Err(e) => {
                // Keep the snapshot for the next attempt unless a newer one arrived
                let mut pending = self.pending.lock().await;
                if pending.is_none() {
                    *pending = Some(player);
                }
                drop(pending);

                warn!(device_id = %self.device_id, error = %e, "Sync failed");
                let message = e.to_string();
                self.state.send_modify(|s| s.mark_failed(message));
                Err(e)
            }
        }
    }
}

/// Debounced sync client for one device
///
/// # Example
///
/// ```rust,no_run
/// use hunter_core::Player;
/// use hunter_sync::{SyncConfig, SyncReconciler};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SyncConfig {
///     url: Some("https://db.example.co".into()),
///     api_key: Some("anon-key".into()),
///     ..Default::default()
/// };
/// let sync = SyncReconciler::from_config(&config, "device-1234")?;
///
/// let mut player = Player::new("Jin");
/// player.apply_xp(40);
/// sync.schedule_push(&player).await; // pushed after 2s of quiet
///
/// player.apply_xp(10);
/// sync.push_now(&player).await?;      // manual trigger
/// # Ok(())
/// # }
/// ```
pub struct SyncReconciler {
    inner: Arc<Inner>,
    debounce: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl SyncReconciler {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        device_id: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        Self::build(Some(remote), device_id.into(), debounce)
    }

    /// Reconciler with no remote: changes are tracked, pushes fail with
    /// `NotConfigured`.
    pub fn unconfigured(device_id: impl Into<String>) -> Self {
        Self::build(
            None,
            device_id.into(),
            Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        )
    }

    /// Use the REST remote when configured, otherwise run unconfigured
    pub fn from_config(config: &SyncConfig, device_id: impl Into<String>) -> Result<Self> {
        if !config.is_configured() {
            debug!("Cloud sync not configured");
            let mut reconciler = Self::unconfigured(device_id);
            reconciler.debounce = config.debounce();
            return Ok(reconciler);
        }
        let remote = RestRemoteStore::new(config)?;
        Ok(Self::new(Arc::new(remote), device_id, config.debounce()))
    }

    fn build(
        remote: Option<Arc<dyn RemoteStore>>,
        device_id: String,
        debounce: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            inner: Arc::new(Inner {
                remote,
                device_id,
                online: AtomicBool::new(true),
                state,
                pending: Mutex::new(None),
                push_lock: Mutex::new(()),
            }),
            debounce,
            timer: Mutex::new(None),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.inner.device_id
    }

    pub fn is_configured(&self) -> bool {
        self.inner.remote.is_some()
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    /// Current state snapshot
    pub fn state(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Record a local change and (re)start the debounce timer.
    pub async fn schedule_push(&self, player: &Player) {
        *self.inner.pending.lock().await = Some(player.clone());
        self.inner.state.send_modify(|s| s.mark_changed());

        if !self.is_configured() {
            return;
        }
        if !self.is_online() {
            self.inner.state.send_modify(|s| s.mark_offline());
            return;
        }
        self.restart_timer().await;
    }

    /// Push immediately, cancelling any pending debounce.
    pub async fn push_now(&self, player: &Player) -> Result<()> {
        *self.inner.pending.lock().await = Some(player.clone());
        self.inner.state.send_modify(|s| s.mark_changed());
        self.cancel_timer().await;
        self.inner.flush().await
    }

    /// Push whatever is pending right away. No-op when nothing is pending.
    pub async fn flush_pending(&self) -> Result<()> {
        self.cancel_timer().await;
        // Wait out a push already in flight
        drop(self.inner.push_lock.lock().await);
        if self.inner.pending.lock().await.is_none() {
            return Ok(());
        }
        self.inner.flush().await
    }

    /// Fetch this device's player from the remote.
    pub async fn pull(&self) -> Result<Option<Player>> {
        let remote = self.inner.remote()?;
        if !self.is_online() {
            return Err(SyncError::Offline);
        }

        // Pushes and pulls share one slot so their status updates never interleave
        let _guard = self.inner.push_lock.lock().await;
        self.inner.state.send_modify(|s| s.mark_syncing());

        let fetched = remote
            .fetch(&self.inner.device_id)
            .await
            .and_then(|row| row.map(|r| r.to_player()).transpose());

        match fetched {
            Ok(player) => {
                self.inner.state.send_modify(|s| s.mark_pulled());
                debug!(found = player.is_some(), "Pulled player");
                Ok(player)
            }
            Err(e) => {
                warn!(error = %e, "Pull failed");
                let message = e.to_string();
                self.inner.state.send_modify(|s| s.mark_pull_failed(message));
                Err(e)
            }
        }
    }

    /// Mark the device online or offline.
    ///
    /// Going offline cancels the pending timer but keeps the snapshot; coming
    /// back online with unsynced changes schedules a debounced push.
    pub async fn set_online(&self, online: bool) {
        let was_online = self.inner.online.swap(online, Ordering::SeqCst);
        if was_online == online {
            return;
        }

        if !online {
            self.cancel_timer().await;
            self.inner.state.send_modify(|s| s.mark_offline());
            info!("Sync offline");
            return;
        }

        self.inner.state.send_modify(|s| s.mark_online());
        info!("Sync online");
        let has_pending = self.inner.pending.lock().await.is_some();
        if self.is_configured() && has_pending {
            self.restart_timer().await;
        }
    }

    async fn restart_timer(&self) {
        let mut timer = self.timer.lock().await;
        if let Some(handle) = timer.take() {
            handle.abort();
        }

        let inner = Arc::clone(&self.inner);
        let debounce = self.debounce;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Detached so that cancelling the timer never aborts a push in flight
            tokio::spawn(async move {
                if let Err(e) = inner.flush().await {
                    debug!(error = %e, "Debounced push did not complete");
                }
            });
        }));
    }

    async fn cancel_timer(&self) {
        if let Some(handle) = self.timer.lock().await.take() {
            handle.abort();
        }
    }
}

impl Drop for SyncReconciler {
    fn drop(&mut self) {
        if let Ok(mut timer) = self.timer.try_lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
    }
}

impl std::fmt::Debug for SyncReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncReconciler")
            .field("device_id", &self.inner.device_id)
            .field("configured", &self.is_configured())
            .field("status", &self.inner.state.borrow().status)
            .finish()
    }
}
