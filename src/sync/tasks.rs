use anyhow::Result;
use sea_orm::ConnectionTrait;

use crate::backend::{CreateTaskArgs, UpdateTaskArgs};
use crate::entities::{task, SyncState};
use crate::models::{decode_all, Task, TaskDraft, TaskPatch};
use crate::repositories::{ListRepository, TaskRepository};
use crate::session::Topic;
use crate::sync::{fallback_or_fail, SyncService, Synced};
use crate::utils::datetime;

impl SyncService {
    /// Retrieves the tasks of a list, open tasks first.
    ///
    /// The backend listing for the list refreshes the cache first. If the
    /// backend cannot be used, or the list itself has never reached the
    /// backend, the cached tasks are returned with the reason attached.
    ///
    /// # Errors
    /// Returns an error if the list does not exist or local storage access fails
    pub async fn get_tasks(&self, list_id: i64) -> Result<Synced<Vec<Task>>> {
        let list = {
            let storage = self.storage.lock().await;
            ListRepository::require_visible(&storage.conn, list_id).await?
        };

        let fallback = match (self.remote(), list.remote_id) {
            (Ok(remote), Some(list_remote_id)) => match remote.backend.fetch_tasks(&remote.token, list_remote_id).await {
                Ok(tasks) => {
                    let storage = self.storage.lock().await;
                    self.store_tasks_batch(&storage, list_id, &tasks).await?;
                    let models = TaskRepository::get_for_list(&storage.conn, list_id).await?;
                    return Ok(Synced::remote(decode_all(models)?));
                }
                Err(e) => {
                    log::warn!("⚠️  Failed to fetch tasks of list {}, using local cache: {}", list_id, e);
                    e.to_string()
                }
            },
            (Ok(_), None) => "List not yet synced".to_string(),
            (Err(reason), _) => reason,
        };

        let storage = self.storage.lock().await;
        let models = TaskRepository::get_for_list(&storage.conn, list_id).await?;
        Ok(Synced::local(decode_all(models)?, fallback))
    }

    /// Retrieves a single task, refreshed from the backend when possible.
    pub async fn get_task(&self, id: i64) -> Result<Synced<Task>> {
        let existing = {
            let storage = self.storage.lock().await;
            TaskRepository::require_visible(&storage.conn, id).await?
        };

        let fallback = match (self.remote(), existing.remote_id) {
            (Ok(remote), Some(remote_id)) => match remote.backend.fetch_task(&remote.token, remote_id).await {
                Ok(fetched) => {
                    let storage = self.storage.lock().await;
                    let model = Self::store_remote_task(&storage.conn, existing.list_id, &fetched).await?;
                    return Ok(Synced::remote(model.try_into()?));
                }
                Err(e) => {
                    log::warn!("⚠️  Failed to fetch task {}, using local cache: {}", id, e);
                    e.to_string()
                }
            },
            (Ok(_), None) => "Task not yet synced".to_string(),
            (Err(reason), _) => reason,
        };

        Ok(Synced::local(existing.try_into()?, fallback))
    }

    /// Starred tasks that are still open, from the local store.
    pub async fn get_starred_tasks(&self) -> Result<Vec<Task>> {
        let storage = self.storage.lock().await;
        decode_all(TaskRepository::get_starred(&storage.conn).await?)
    }

    /// Completed tasks across all lists, from the local store.
    pub async fn get_completed_tasks(&self) -> Result<Vec<Task>> {
        let storage = self.storage.lock().await;
        decode_all(TaskRepository::get_completed(&storage.conn).await?)
    }

    /// Tasks due today across all lists.
    ///
    /// The backend search for today's date refreshes the cached tasks of
    /// lists that are already cached; the result is always read locally.
    pub async fn get_tasks_due_today(&self) -> Result<Synced<Vec<Task>>> {
        let today = chrono::Local::now().date_naive();

        let fallback = match self.remote() {
            Ok(remote) => match remote.backend.search_tasks(&remote.token, &datetime::format_ymd(today)).await {
                Ok(found) => {
                    let storage = self.storage.lock().await;
                    let stored = self.store_found_tasks(&storage, &found).await?;
                    log::debug!("Cached {} of {} tasks found for {}", stored, found.len(), today);
                    let models = TaskRepository::get_due_on(&storage.conn, today).await?;
                    return Ok(Synced::remote(decode_all(models)?));
                }
                Err(e) => {
                    log::warn!("⚠️  Failed to search tasks due today, using local cache: {}", e);
                    e.to_string()
                }
            },
            Err(reason) => reason,
        };

        let storage = self.storage.lock().await;
        let models = TaskRepository::get_due_on(&storage.conn, today).await?;
        Ok(Synced::local(decode_all(models)?, fallback))
    }

    /// Creates a new task in a list.
    ///
    /// # Errors
    /// Returns an error if the draft is invalid, the list does not exist,
    /// or the backend rejects the task
    pub async fn create_task(&self, list_id: i64, draft: &TaskDraft) -> Result<Synced<Task>> {
        draft.validate()?;

        let list = {
            let storage = self.storage.lock().await;
            ListRepository::require_visible(&storage.conn, list_id).await?
        };

        let remote_result = match (self.remote(), list.remote_id) {
            (Ok(remote), Some(list_remote_id)) => {
                let args = CreateTaskArgs::from(draft);
                match remote.backend.create_task(&remote.token, list_remote_id, &args).await {
                    Ok(created) => Ok(created),
                    Err(e) => Err(fallback_or_fail(e, "Create task")?),
                }
            }
            (Ok(_), None) => Err("List not yet synced".to_string()),
            (Err(reason), _) => Err(reason),
        };

        let outcome = {
            let storage = self.storage.lock().await;
            match remote_result {
                Ok(created) => Synced::remote(Self::store_remote_task(&storage.conn, list_id, &created).await?),
                Err(reason) => {
                    let model =
                        TaskRepository::create(&storage.conn, list_id, draft, None, SyncState::Pending).await?;
                    Synced::local(model, reason)
                }
            }
        };

        log::info!("✅ Created task '{}' in list {}", draft.title, list_id);
        self.notify(&[Topic::Tasks]);
        Ok(Synced {
            value: outcome.value.try_into()?,
            origin: outcome.origin,
        })
    }

    /// Applies a partial update to a task.
    ///
    /// A task carrying unpushed local edits is sent in full so the earlier
    /// edits reach the backend too.
    ///
    /// # Errors
    /// Returns an error if the patch is empty or invalid, the task does not
    /// exist, or the backend rejects the change
    pub async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Synced<Task>> {
        patch.validate()?;
        if patch.is_empty() {
            anyhow::bail!("Nothing to update");
        }

        let existing: Task = {
            let storage = self.storage.lock().await;
            TaskRepository::require_visible(&storage.conn, id).await?.try_into()?
        };

        let remote_result = match (self.remote(), existing.remote_id) {
            (Ok(remote), Some(remote_id)) => {
                let args = if existing.sync_state == SyncState::Synced {
                    UpdateTaskArgs::from(patch)
                } else {
                    let mut merged = existing.clone();
                    merged.apply(patch);
                    UpdateTaskArgs::from(&merged)
                };
                match remote.backend.update_task(&remote.token, remote_id, &args).await {
                    Ok(updated) => Ok(updated),
                    Err(e) => Err(fallback_or_fail(e, "Update task")?),
                }
            }
            (Ok(_), None) => Err("Task not yet synced".to_string()),
            (Err(reason), _) => Err(reason),
        };

        let outcome = {
            let storage = self.storage.lock().await;
            match remote_result {
                Ok(updated) => {
                    let current = TaskRepository::require(&storage.conn, id).await?;
                    Synced::remote(Self::overwrite_task(&storage.conn, current, existing.list_id, &updated).await?)
                }
                Err(reason) => Synced::local(Self::write_task_locally(&storage.conn, id, patch).await?, reason),
            }
        };

        log::info!("📝 Updated task {}", id);
        self.notify(&[Topic::Tasks]);
        Ok(Synced {
            value: outcome.value.try_into()?,
            origin: outcome.origin,
        })
    }

    /// Apply a patch locally, tagging the row for the next reconcile pass.
    async fn write_task_locally<C>(conn: &C, id: i64, patch: &TaskPatch) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        match patch {
            TaskPatch {
                starred: Some(starred),
                title: None,
                description: None,
                completed: None,
                deadline: None,
                completion_rate: None,
            } => TaskRepository::star(conn, id, *starred, SyncState::Pending).await,
            TaskPatch {
                completed: Some(completed),
                title: None,
                description: None,
                starred: None,
                deadline: None,
                ..
            } if *patch == TaskPatch::completed(*completed) => {
                TaskRepository::check(conn, id, *completed, SyncState::Pending).await
            }
            _ => TaskRepository::update(conn, id, patch, SyncState::Pending).await,
        }
    }

    /// Star or unstar a task. Setting the current value again is a no-op
    /// on the stored state.
    pub async fn set_starred(&self, id: i64, starred: bool) -> Result<Synced<Task>> {
        self.update_task(id, &TaskPatch::starred(starred)).await
    }

    /// Complete or reopen a task; the completion rate becomes 100 or 0.
    pub async fn set_completed(&self, id: i64, completed: bool) -> Result<Synced<Task>> {
        self.update_task(id, &TaskPatch::completed(completed)).await
    }

    /// Toggle the starred flag of a task.
    pub async fn star_task(&self, task: &Task) -> Result<Synced<Task>> {
        self.set_starred(task.id, !task.starred).await
    }

    /// Toggle the completed flag of a task.
    pub async fn check_task(&self, task: &Task) -> Result<Synced<Task>> {
        self.set_completed(task.id, !task.completed).await
    }

    /// Deletes a task.
    ///
    /// When the backend cannot be reached, a task known to the backend is
    /// hidden locally and its delete is pushed by the next reconcile pass.
    ///
    /// # Errors
    /// Returns an error if the task does not exist or the backend rejects
    /// the delete
    pub async fn delete_task(&self, id: i64) -> Result<Synced<()>> {
        let existing = {
            let storage = self.storage.lock().await;
            TaskRepository::require_visible(&storage.conn, id).await?
        };

        let (outcome, tombstone) = match (self.remote(), existing.remote_id) {
            (Ok(remote), Some(remote_id)) => match remote.backend.delete_task(&remote.token, remote_id).await {
                Ok(()) => (Synced::remote(()), false),
                Err(e) if e.is_not_found() => (Synced::remote(()), false),
                Err(e) => (Synced::local((), fallback_or_fail(e, "Delete task")?), true),
            },
            (Err(reason), Some(_)) => (Synced::local((), reason), true),
            (Ok(_), None) => (Synced::local((), "Task not yet synced"), false),
            (Err(reason), None) => (Synced::local((), reason), false),
        };

        {
            let storage = self.storage.lock().await;
            if tombstone {
                TaskRepository::set_sync_state(&storage.conn, id, SyncState::Deleted).await?;
            } else {
                TaskRepository::delete(&storage.conn, id).await?;
            }
        }

        log::info!("🗑️  Deleted task {}", id);
        self.notify(&[Topic::Tasks]);
        Ok(outcome)
    }
}
