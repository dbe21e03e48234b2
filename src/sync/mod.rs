//! Synchronization service module.
//!
//! This module provides the [`SyncService`] struct, the data layer the rest
//! of the application goes through for lists and tasks. Every operation
//! tries the remote backend first and falls back to the local store:
//!
//! - Reads refresh the local cache from the backend and return the cached
//!   rows. If the backend cannot be reached, the cached rows are returned
//!   together with the reason the remote read failed.
//! - Writes go to the backend and are then mirrored locally. If the backend
//!   is unreachable (network failure, rate limiting, server error) the write
//!   is applied locally and tagged [`SyncState::Pending`] (or
//!   [`SyncState::Deleted`] for deletes) until [`SyncService::reconcile`]
//!   pushes it. Rejections such as `401 Unauthorized` are returned as is.
//!
//! Every successful mutation bumps the matching reload topic.

pub mod lists;
pub mod reconcile;
pub mod storage;
pub mod tasks;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::backend::{Backend, BackendError};
use crate::constants::{ERROR_NOT_SIGNED_IN, ERROR_NO_BACKEND};
use crate::entities::SyncState;
use crate::session::{AuthSession, ReloadCoordinator, Topic};
use crate::storage::LocalStorage;

pub use reconcile::ReconcileReport;

/// Where the data of an operation came from or went to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// The backend served or accepted the operation
    Remote,
    /// Only the local store was used
    Local {
        /// Human-readable reason the backend was not used
        reason: String,
    },
}

/// Result of a facade operation together with its [`Origin`].
#[derive(Debug, Clone, PartialEq)]
pub struct Synced<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Synced<T> {
    pub fn remote(value: T) -> Self {
        Self {
            value,
            origin: Origin::Remote,
        }
    }

    pub fn local(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            origin: Origin::Local { reason: reason.into() },
        }
    }

    pub fn is_remote(&self) -> bool {
        self.origin == Origin::Remote
    }

    /// Why the backend was bypassed, if it was.
    pub fn fallback_reason(&self) -> Option<&str> {
        match &self.origin {
            Origin::Remote => None,
            Origin::Local { reason } => Some(reason),
        }
    }

    /// Sync state a local write should carry.
    fn write_state(&self) -> SyncState {
        if self.is_remote() {
            SyncState::Synced
        } else {
            SyncState::Pending
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Backend handle and token for one remote call.
struct Remote {
    backend: Arc<dyn Backend>,
    token: String,
}

/// Service that composes the remote backend and the local store.
///
/// Clones share the same storage, session and reload coordinator.
#[derive(Clone)]
pub struct SyncService {
    backend: Option<Arc<dyn Backend>>,
    storage: Arc<Mutex<LocalStorage>>,
    auth: AuthSession,
    reload: Arc<ReloadCoordinator>,
    sync_in_progress: Arc<Mutex<bool>>,
}

impl SyncService {
    /// Creates a new `SyncService`.
    ///
    /// # Arguments
    /// * `backend` - Remote backend, or `None` to work purely locally
    /// * `storage` - Shared local storage
    /// * `auth` - Session providing the bearer token
    /// * `reload` - Coordinator bumped after each successful mutation
    pub fn new(
        backend: Option<Arc<dyn Backend>>,
        storage: Arc<Mutex<LocalStorage>>,
        auth: AuthSession,
        reload: Arc<ReloadCoordinator>,
    ) -> Self {
        Self {
            backend,
            storage,
            auth,
            reload,
            sync_in_progress: Arc::new(Mutex::new(false)),
        }
    }

    /// Shared storage handle.
    pub fn storage(&self) -> Arc<Mutex<LocalStorage>> {
        self.storage.clone()
    }

    /// Checks if a reconcile pass is currently running.
    pub async fn is_syncing(&self) -> bool {
        *self.sync_in_progress.lock().await
    }

    /// Backend and token, or the reason the backend cannot be used.
    fn remote(&self) -> std::result::Result<Remote, String> {
        let backend = self.backend.clone().ok_or_else(|| ERROR_NO_BACKEND.to_string())?;
        let token = self.auth.token().ok_or_else(|| ERROR_NOT_SIGNED_IN.to_string())?;
        Ok(Remote { backend, token })
    }

    fn notify(&self, topics: &[Topic]) {
        for topic in topics {
            self.reload.bump(*topic);
        }
    }
}

/// Decide what a failed remote write turns into.
///
/// Transient failures yield the fallback reason; anything else is returned
/// to the caller unchanged.
fn fallback_or_fail(error: BackendError, operation: &str) -> Result<String> {
    if error.is_transient() {
        log::warn!("⚠️  {} failed remotely, applying locally: {}", operation, error);
        Ok(error.to_string())
    } else {
        log::error!("❌ {} rejected by backend: {}", operation, error);
        Err(error.into())
    }
}
