//! Application state container.
//!
//! [`AppState`] owns every shared piece of the data layer and hands it to the
//! services explicitly. Front ends hold one `AppState` and go through
//! [`AppState::dispatch`] or the services it exposes.

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::account::AccountService;
use crate::actions::Action;
use crate::backend::rest::RestBackend;
use crate::backend::Backend;
use crate::config::Config;
use crate::constants::*;
use crate::preferences::PreferenceStore;
use crate::session::{AuthSession, MessageCenter, ReloadCoordinator};
use crate::storage::LocalStorage;
use crate::sync::{Origin, SyncService};

pub struct AppState {
    pub config: Config,
    pub storage: Arc<Mutex<LocalStorage>>,
    pub backend: Option<Arc<dyn Backend>>,
    pub preferences: PreferenceStore,
    pub auth: AuthSession,
    pub messages: MessageCenter,
    pub reload: Arc<ReloadCoordinator>,
    pub sync: SyncService,
    pub account: AccountService,
}

impl AppState {
    /// Build the application state from configuration.
    ///
    /// Opens the database and preference file, restores a saved session,
    /// records the first run and, when configured, pushes changes left over
    /// from an earlier offline session.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or storage cannot be
    /// opened. A failed startup reconcile is logged, not returned.
    pub async fn bootstrap(config: Config) -> Result<Self> {
        config.validate()?;

        let storage = LocalStorage::new(&config.storage).await?;
        let preferences = if config.storage.in_memory {
            PreferenceStore::in_memory()
        } else {
            PreferenceStore::open(config.storage.resolve_preferences_path()?)?
        };
        let backend: Option<Arc<dyn Backend>> = if config.server.enabled {
            Some(Arc::new(RestBackend::new(&config.server)?))
        } else {
            info!("📴 Remote backend disabled, working locally");
            None
        };

        let state = Self::with_parts(config, storage, backend, preferences);

        if state.account.restore_session()? {
            info!("🔑 Restored saved session");
        }
        if !state.preferences.is_initialized()? {
            info!("🆕 First run, preferences initialized");
            state.preferences.mark_initialized()?;
        }

        if state.config.sync.reconcile_on_startup && state.backend.is_some() && state.auth.is_signed_in() {
            if let Err(e) = state.sync.reconcile().await {
                warn!("⚠️  Startup reconcile failed: {}", e);
            }
        }

        Ok(state)
    }

    /// Assemble the state from already opened parts.
    pub fn with_parts(
        config: Config,
        storage: LocalStorage,
        backend: Option<Arc<dyn Backend>>,
        preferences: PreferenceStore,
    ) -> Self {
        let storage = Arc::new(Mutex::new(storage));
        let auth = AuthSession::default();
        let reload = Arc::new(ReloadCoordinator::new());
        let sync = SyncService::new(backend.clone(), storage.clone(), auth.clone(), reload.clone());
        let account = AccountService::new(backend.clone(), auth.clone(), preferences.clone());

        Self {
            config,
            storage,
            backend,
            preferences,
            auth,
            messages: MessageCenter::new(),
            reload,
            sync,
            account,
        }
    }

    /// Perform an action and report its outcome through the message center.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    /// The message shown to the user
    ///
    /// # Errors
    /// Returns the operation's error after showing the failure message
    pub async fn dispatch(&self, action: Action) -> Result<String> {
        let name = action.name();
        info!("▶️  {}", name);

        let outcome = self.perform(action).await;
        let message = match &outcome {
            Ok((_, Origin::Local { reason })) if self.backend.is_some() => {
                info!("{} saved locally: {}", name, reason);
                SUCCESS_SAVED_OFFLINE.to_string()
            }
            Ok((success, _)) => success.to_string(),
            Err((failure, e)) => format!("{}: {}", failure, e),
        };

        self.messages
            .show_for(message.clone(), Duration::from_secs(MESSAGE_DISPLAY_SECS));

        match outcome {
            Ok(_) => Ok(message),
            Err((_, e)) => Err(e),
        }
    }

    async fn perform(&self, action: Action) -> std::result::Result<(&'static str, Origin), (&'static str, anyhow::Error)> {
        match action {
            Action::CreateList(draft) => self
                .sync
                .create_list(&draft)
                .await
                .map(|done| (SUCCESS_LIST_CREATED, done.origin))
                .map_err(|e| (ERROR_LIST_CREATE_FAILED, e)),
            Action::UpdateList { id, draft } => self
                .sync
                .update_list(id, &draft)
                .await
                .map(|done| (SUCCESS_LIST_UPDATED, done.origin))
                .map_err(|e| (ERROR_LIST_UPDATE_FAILED, e)),
            Action::DeleteList(id) => self
                .sync
                .delete_list(id)
                .await
                .map(|done| (SUCCESS_LIST_DELETED, done.origin))
                .map_err(|e| (ERROR_LIST_DELETE_FAILED, e)),
            Action::CreateTask { list_id, draft } => self
                .sync
                .create_task(list_id, &draft)
                .await
                .map(|done| (SUCCESS_TASK_CREATED, done.origin))
                .map_err(|e| (ERROR_TASK_CREATE_FAILED, e)),
            Action::UpdateTask { id, patch } => self
                .sync
                .update_task(id, &patch)
                .await
                .map(|done| (SUCCESS_TASK_UPDATED, done.origin))
                .map_err(|e| (ERROR_TASK_UPDATE_FAILED, e)),
            Action::DeleteTask(id) => self
                .sync
                .delete_task(id)
                .await
                .map(|done| (SUCCESS_TASK_DELETED, done.origin))
                .map_err(|e| (ERROR_TASK_DELETE_FAILED, e)),
            Action::StarTask(task) => self
                .sync
                .star_task(&task)
                .await
                .map(|done| {
                    let success = if done.value.starred {
                        SUCCESS_TASK_STARRED
                    } else {
                        SUCCESS_TASK_UNSTARRED
                    };
                    (success, done.origin)
                })
                .map_err(|e| (ERROR_TASK_UPDATE_FAILED, e)),
            Action::CheckTask(task) => self
                .sync
                .check_task(&task)
                .await
                .map(|done| {
                    let success = if done.value.completed {
                        SUCCESS_TASK_COMPLETED
                    } else {
                        SUCCESS_TASK_REOPENED
                    };
                    (success, done.origin)
                })
                .map_err(|e| (ERROR_TASK_UPDATE_FAILED, e)),
            Action::Reconcile => match self.sync.reconcile().await {
                Ok(report) if report.is_clean() => Ok((SUCCESS_SYNC_COMPLETE, Origin::Remote)),
                Ok(report) => Err((
                    ERROR_SYNC_FAILED,
                    anyhow::anyhow!("{} failed, {} conflicts", report.failed, report.conflicts),
                )),
                Err(e) => Err((ERROR_SYNC_FAILED, e)),
            },
        }
    }
}
