use anyhow::Result;

use crate::backend::ListArgs;
use crate::entities::SyncState;
use crate::models::{decode_all, List, ListDraft};
use crate::repositories::{ListRepository, TaskRepository};
use crate::session::Topic;
use crate::sync::{fallback_or_fail, SyncService, Synced};

impl SyncService {
    /// Retrieves all lists.
    ///
    /// The backend listing refreshes the cache first. If the backend cannot
    /// be used the cached lists are returned with the reason attached.
    ///
    /// # Errors
    /// Returns an error only if local storage access fails
    pub async fn get_lists(&self) -> Result<Synced<Vec<List>>> {
        let fallback = match self.remote() {
            Ok(remote) => match remote.backend.fetch_lists(&remote.token).await {
                Ok(lists) => {
                    let storage = self.storage.lock().await;
                    self.store_lists_batch(&storage, &lists).await?;
                    let models = ListRepository::get_all(&storage.conn).await?;
                    return Ok(Synced::remote(decode_all(models)?));
                }
                Err(e) => {
                    log::warn!("⚠️  Failed to fetch lists, using local cache: {}", e);
                    e.to_string()
                }
            },
            Err(reason) => reason,
        };

        let storage = self.storage.lock().await;
        let models = ListRepository::get_all(&storage.conn).await?;
        Ok(Synced::local(decode_all(models)?, fallback))
    }

    /// Get one list from the local store.
    pub async fn get_list(&self, id: i64) -> Result<List> {
        let storage = self.storage.lock().await;
        ListRepository::require_visible(&storage.conn, id).await?.try_into()
    }

    /// Creates a new list.
    ///
    /// # Arguments
    /// * `draft` - Name and description of the new list
    ///
    /// # Errors
    /// Returns an error if the draft is invalid, the backend rejects the
    /// list, or local storage update fails
    pub async fn create_list(&self, draft: &ListDraft) -> Result<Synced<List>> {
        draft.validate()?;

        let outcome = match self.remote() {
            Ok(remote) => match remote.backend.create_list(&remote.token, &ListArgs::from(draft)).await {
                Ok(created) => {
                    let storage = self.storage.lock().await;
                    let model = Self::store_remote_list(&storage.conn, &created).await?;
                    Synced::remote(model)
                }
                Err(e) => {
                    let reason = fallback_or_fail(e, "Create list")?;
                    let storage = self.storage.lock().await;
                    let model = ListRepository::create(&storage.conn, draft, None, SyncState::Pending).await?;
                    Synced::local(model, reason)
                }
            },
            Err(reason) => {
                let storage = self.storage.lock().await;
                let model = ListRepository::create(&storage.conn, draft, None, SyncState::Pending).await?;
                Synced::local(model, reason)
            }
        };

        log::info!("📋 Created list '{}'", draft.name);
        self.notify(&[Topic::Lists]);
        Ok(Synced {
            value: outcome.value.try_into()?,
            origin: outcome.origin,
        })
    }

    /// Replaces name and description of a list.
    ///
    /// # Errors
    /// Returns an error if the draft is invalid, the list does not exist,
    /// or the backend rejects the change
    pub async fn update_list(&self, id: i64, draft: &ListDraft) -> Result<Synced<List>> {
        draft.validate()?;

        let existing = {
            let storage = self.storage.lock().await;
            ListRepository::require_visible(&storage.conn, id).await?
        };

        let outcome = match (self.remote(), existing.remote_id) {
            (Ok(remote), Some(remote_id)) => {
                match remote.backend.update_list(&remote.token, remote_id, &ListArgs::from(draft)).await {
                    Ok(updated) => Synced::remote(updated.to_draft()),
                    Err(e) => Synced::local(draft.clone(), fallback_or_fail(e, "Update list")?),
                }
            }
            (Ok(_), None) => Synced::local(draft.clone(), "List not yet synced"),
            (Err(reason), _) => Synced::local(draft.clone(), reason),
        };

        let state = outcome.write_state();
        let model = {
            let storage = self.storage.lock().await;
            ListRepository::update(&storage.conn, id, &outcome.value, state).await?
        };

        log::info!("📝 Updated list {}", id);
        self.notify(&[Topic::Lists]);
        Ok(Synced {
            value: model.try_into()?,
            origin: outcome.origin,
        })
    }

    /// Deletes a list together with its tasks.
    ///
    /// When the backend cannot be reached, a list known to the backend is
    /// hidden locally and its delete is pushed by the next reconcile pass.
    /// Its tasks are removed locally right away.
    ///
    /// # Errors
    /// Returns an error if the list does not exist or the backend rejects
    /// the delete
    pub async fn delete_list(&self, id: i64) -> Result<Synced<()>> {
        let existing = {
            let storage = self.storage.lock().await;
            ListRepository::require_visible(&storage.conn, id).await?
        };

        let (outcome, tombstone) = match (self.remote(), existing.remote_id) {
            (Ok(remote), Some(remote_id)) => match remote.backend.delete_list(&remote.token, remote_id).await {
                Ok(()) => (Synced::remote(()), false),
                Err(e) if e.is_not_found() => (Synced::remote(()), false),
                Err(e) => (Synced::local((), fallback_or_fail(e, "Delete list")?), true),
            },
            (Err(reason), Some(_)) => (Synced::local((), reason), true),
            (Ok(_), None) => (Synced::local((), "List not yet synced"), false),
            (Err(reason), None) => (Synced::local((), reason), false),
        };

        {
            let storage = self.storage.lock().await;
            if !tombstone {
                ListRepository::delete(&storage.conn, id).await?;
            } else {
                let removed = TaskRepository::delete_for_list(&storage.conn, id).await?;
                ListRepository::set_sync_state(&storage.conn, id, SyncState::Deleted).await?;
                log::debug!("Removed {} tasks of list {} locally", removed, id);
            }
        }

        log::info!("🗑️  Deleted list {}", id);
        self.notify(&[Topic::Lists, Topic::Tasks]);
        Ok(outcome)
    }
}
