//! Sync orchestration: download, merge, upload.
//!
//! [`SyncService`] is the sole error boundary for remote traffic. It owns
//! the observable [`SyncState`], sequences session-start reconciliation,
//! debounces automatic uploads after local mutations, and propagates
//! deletions remote-first.

mod remote;
mod supabase;

pub use remote::{CategoryRow, RecurringRow, RemoteStore, TransactionRow};
pub use supabase::{parse_api_error, SupabaseRemote};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::merge::merge_snapshots;
use crate::models::{CategoryId, RuleId, Snapshot, TransactionId};
use crate::state::{SyncState, SyncStatus};

/// Quiet period after the most recent local mutation before an automatic
/// upload fires.
pub const UPLOAD_DEBOUNCE: Duration = Duration::from_secs(2);

/// Orchestrates all remote traffic and owns the observable sync state.
///
/// Cheap to clone; clones share the state channel, the bound identity and
/// the pending debounced upload. Without a bound user the service is inert
/// and the rest of the core runs local-only.
pub struct SyncService<R, C> {
    inner: Arc<Inner<R, C>>,
}

impl<R, C> Clone for SyncService<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<R, C> {
    remote: R,
    clock: C,
    user: Mutex<Option<String>>,
    state_tx: watch::Sender<SyncState>,
    pending_upload: Mutex<Option<JoinHandle<()>>>,
}

impl<R: RemoteStore, C: Clock> SyncService<R, C> {
    pub fn new(remote: R, clock: C) -> Self {
        let (state_tx, _) = watch::channel(SyncState::default());
        Self {
            inner: Arc::new(Inner {
                remote,
                clock,
                user: Mutex::new(None),
                state_tx,
                pending_upload: Mutex::new(None),
            }),
        }
    }

    /// Observe sync state transitions. The receiver immediately holds the
    /// current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state_tx.subscribe()
    }

    /// Last-known sync state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.inner.state_tx.borrow().clone()
    }

    /// Bind the authenticated user identity that scopes remote data.
    pub async fn bind_user(&self, user: impl Into<String>) {
        *self.inner.user.lock().await = Some(user.into());
    }

    /// Clear the bound identity: cancels any pending automatic upload and
    /// resets the observable state for the next session.
    pub async fn clear_user(&self) {
        *self.inner.user.lock().await = None;
        self.cancel_pending_upload().await;
        self.inner.state_tx.send_replace(SyncState::default());
    }

    /// Session-start reconciliation: download, merge with `local`, then
    /// upload the merged result to heal remote-only divergence.
    ///
    /// The merged snapshot is returned for the caller to adopt even when
    /// the upload back fails (the failure lands in the observable state);
    /// a failed sync never rolls back local data. A download failure
    /// returns the error and leaves the caller's collections untouched.
    pub async fn sync_on_start(&self, local: Snapshot) -> Result<Snapshot> {
        let user = self.require_user().await?;
        self.enter_syncing();

        let remote = match self.inner.remote.download(&user).await {
            Ok(remote) => remote,
            Err(error) => {
                self.enter_error(&error);
                return Err(error);
            }
        };
        let merged = merge_snapshots(local, remote);

        match self.inner.remote.upload(&user, &merged).await {
            Ok(()) => self.enter_success(),
            Err(error) => {
                tracing::warn!("Upload after merge failed; keeping merged data: {}", error);
                self.enter_error(&error);
            }
        }

        Ok(merged)
    }

    /// Manual trigger: upload the full current local state immediately.
    ///
    /// Fails fast when no user is bound.
    pub async fn upload_now(&self, snapshot: &Snapshot) -> Result<()> {
        let user = self.require_user().await?;
        self.enter_syncing();

        match self.inner.remote.upload(&user, snapshot).await {
            Ok(()) => {
                self.enter_success();
                Ok(())
            }
            Err(error) => {
                self.enter_error(&error);
                Err(error)
            }
        }
    }

    /// Debounced automatic upload: waits [`UPLOAD_DEBOUNCE`] from the most
    /// recent call; a newer snapshot replaces a pending one, so only the
    /// last mutation in a burst triggers traffic. No-op while no user is
    /// bound. Debounced and manual uploads are not mutually excluded; the
    /// remote's upsert-by-identity semantics resolve the race.
    pub async fn schedule_upload(&self, snapshot: Snapshot) {
        if self.inner.user.lock().await.is_none() {
            return;
        }

        let service = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(UPLOAD_DEBOUNCE).await;
            if let Err(error) = service.upload_now(&snapshot).await {
                tracing::warn!("Automatic upload failed: {}", error);
            }
        });

        let mut pending = self.inner.pending_upload.lock().await;
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Remote-first transaction deletion; see [`Self::delete_rule`].
    pub async fn delete_transaction(&self, id: &TransactionId) {
        let Ok(user) = self.require_user().await else {
            return;
        };
        if let Err(error) = self.inner.remote.delete_transaction(&user, id).await {
            tracing::warn!("Remote delete of transaction {} failed: {}", id, error);
        }
    }

    /// Remote-first category deletion; see [`Self::delete_rule`].
    pub async fn delete_category(&self, id: &CategoryId) {
        let Ok(user) = self.require_user().await else {
            return;
        };
        if let Err(error) = self.inner.remote.delete_category(&user, id).await {
            tracing::warn!("Remote delete of category {} failed: {}", id, error);
        }
    }

    /// Remote-first rule deletion.
    ///
    /// The remote row is removed before the caller drops the local copy. A
    /// remote failure is logged and local deletion proceeds anyway: local
    /// state is what the user sees, and any divergence heals on the next
    /// full upload. Signed-out sessions skip the remote call entirely.
    pub async fn delete_rule(&self, id: &RuleId) {
        let Ok(user) = self.require_user().await else {
            return;
        };
        if let Err(error) = self.inner.remote.delete_rule(&user, id).await {
            tracing::warn!("Remote delete of rule {} failed: {}", id, error);
        }
    }

    async fn require_user(&self) -> Result<String> {
        self.inner
            .user
            .lock()
            .await
            .clone()
            .ok_or(Error::NotConfigured("no authenticated user is bound"))
    }

    async fn cancel_pending_upload(&self) {
        if let Some(handle) = self.inner.pending_upload.lock().await.take() {
            handle.abort();
        }
    }

    fn enter_syncing(&self) {
        self.inner.state_tx.send_modify(|state| {
            state.status = SyncStatus::Syncing;
            state.error = None;
        });
    }

    fn enter_success(&self) {
        let now = self.inner.clock.now();
        self.inner.state_tx.send_modify(|state| {
            state.status = SyncStatus::Success;
            state.last_sync = Some(now);
            state.error = None;
        });
    }

    fn enter_error(&self, error: &Error) {
        let message = error.to_string();
        self.inner.state_tx.send_modify(|state| {
            state.status = SyncStatus::Error;
            state.error = Some(message);
        });
    }
}
