use anyhow::Result;

use crate::backend::{BackendError, CreateTaskArgs, ListArgs, UpdateTaskArgs};
use crate::entities::{list, task, SyncState};
use crate::models::{ListDraft, Task};
use crate::repositories::{ListRepository, TaskRepository};
use crate::session::Topic;
use crate::sync::{Remote, SyncService};

/// Summary of one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records the backend accepted
    pub pushed: usize,
    /// Records left for a later pass after a transient failure
    pub failed: usize,
    /// Records the backend rejected, now tagged as conflicts
    pub conflicts: usize,
    /// Another pass was already running
    pub skipped: bool,
}

impl ReconcileReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.conflicts == 0
    }
}

/// What happened to one record during a pass.
enum Push {
    Done,
    Retry,
    Conflict,
}

impl From<BackendError> for Push {
    fn from(error: BackendError) -> Self {
        if error.is_transient() {
            Push::Retry
        } else {
            Push::Conflict
        }
    }
}

impl SyncService {
    /// Pushes every local change made while the backend was unreachable.
    ///
    /// Pending lists go first so their tasks can reference them, then task
    /// changes, then list deletions. Transient failures leave the record
    /// pending for the next pass; rejections tag it as a conflict.
    ///
    /// If a pass is already running this returns immediately with
    /// `skipped` set.
    ///
    /// # Errors
    /// Returns an error if there is no backend or session, or local storage
    /// access fails
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let remote = self.remote().map_err(|reason| anyhow::anyhow!(reason))?;

        {
            let mut in_progress = self.sync_in_progress.lock().await;
            if *in_progress {
                log::info!("⏭️  Reconcile already in progress, skipping");
                return Ok(ReconcileReport::skipped());
            }
            *in_progress = true;
        }

        let result = self.perform_reconcile(&remote).await;

        {
            let mut in_progress = self.sync_in_progress.lock().await;
            *in_progress = false;
        }

        match &result {
            Ok(report) if report.is_clean() => log::info!("✅ Reconciled {} records", report.pushed),
            Ok(report) => log::warn!(
                "⚠️  Reconciled {} records, {} failed, {} conflicts",
                report.pushed,
                report.failed,
                report.conflicts
            ),
            Err(e) => log::error!("❌ Reconcile failed: {}", e),
        }
        result
    }

    async fn perform_reconcile(&self, remote: &Remote) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        let lists = {
            let storage = self.storage.lock().await;
            ListRepository::get_unsynced(&storage.conn).await?
        };
        let (pending_lists, deleted_lists): (Vec<_>, Vec<_>) =
            lists.into_iter().partition(|list| list.sync_state == SyncState::Pending);

        for list in pending_lists {
            let push = self.push_list(remote, &list).await?;
            self.record(&mut report, push, "list", list.id);
        }

        let tasks = {
            let storage = self.storage.lock().await;
            TaskRepository::get_unsynced(&storage.conn).await?
        };
        for task in tasks {
            let push = self.push_task(remote, task.clone()).await?;
            self.record(&mut report, push, "task", task.id);
        }

        for list in deleted_lists {
            let push = self.push_list_delete(remote, &list).await?;
            self.record(&mut report, push, "list", list.id);
        }

        if report.pushed > 0 {
            self.notify(&[Topic::Lists, Topic::Tasks]);
        }
        Ok(report)
    }

    fn record(&self, report: &mut ReconcileReport, push: Push, kind: &str, id: i64) {
        match push {
            Push::Done => report.pushed += 1,
            Push::Retry => {
                log::debug!("Keeping {} {} pending for the next pass", kind, id);
                report.failed += 1;
            }
            Push::Conflict => {
                log::warn!("⚠️  Backend rejected {} {}, marked as conflict", kind, id);
                report.conflicts += 1;
            }
        }
    }

    async fn push_list(&self, remote: &Remote, list: &list::Model) -> Result<Push> {
        let args = ListArgs::from(&ListDraft {
            name: list.name.clone(),
            description: list.description.clone(),
        });
        let result = match list.remote_id {
            None => remote.backend.create_list(&remote.token, &args).await,
            Some(remote_id) => remote.backend.update_list(&remote.token, remote_id, &args).await,
        };

        let storage = self.storage.lock().await;
        match result {
            Ok(pushed) => {
                ListRepository::mark_synced(&storage.conn, list.id, pushed.remote_id).await?;
                Ok(Push::Done)
            }
            Err(e) => {
                let push = Push::from(e);
                if let Push::Conflict = push {
                    ListRepository::set_sync_state(&storage.conn, list.id, SyncState::Conflict).await?;
                }
                Ok(push)
            }
        }
    }

    async fn push_list_delete(&self, remote: &Remote, list: &list::Model) -> Result<Push> {
        let result = match list.remote_id {
            None => Ok(()),
            Some(remote_id) => remote.backend.delete_list(&remote.token, remote_id).await,
        };

        let storage = self.storage.lock().await;
        match result {
            Ok(()) => {
                ListRepository::delete(&storage.conn, list.id).await?;
                Ok(Push::Done)
            }
            Err(e) if e.is_not_found() => {
                ListRepository::delete(&storage.conn, list.id).await?;
                Ok(Push::Done)
            }
            Err(e) => {
                let push = Push::from(e);
                if let Push::Conflict = push {
                    ListRepository::set_sync_state(&storage.conn, list.id, SyncState::Conflict).await?;
                }
                Ok(push)
            }
        }
    }

    async fn push_task(&self, remote: &Remote, model: task::Model) -> Result<Push> {
        let state = model.sync_state;
        let (id, remote_id, list_id) = (model.id, model.remote_id, model.list_id);

        if state == SyncState::Deleted {
            let result = match remote_id {
                None => Ok(()),
                Some(remote_id) => remote.backend.delete_task(&remote.token, remote_id).await,
            };
            let storage = self.storage.lock().await;
            return match result {
                Ok(()) => {
                    TaskRepository::delete(&storage.conn, id).await?;
                    Ok(Push::Done)
                }
                Err(e) if e.is_not_found() => {
                    TaskRepository::delete(&storage.conn, id).await?;
                    Ok(Push::Done)
                }
                Err(e) => {
                    let push = Push::from(e);
                    if let Push::Conflict = push {
                        TaskRepository::set_sync_state(&storage.conn, id, SyncState::Conflict).await?;
                    }
                    Ok(push)
                }
            };
        }

        let task: Task = model.try_into()?;
        let result = match remote_id {
            Some(remote_id) => {
                remote
                    .backend
                    .update_task(&remote.token, remote_id, &UpdateTaskArgs::from(&task))
                    .await
            }
            None => {
                let list_remote_id = {
                    let storage = self.storage.lock().await;
                    ListRepository::require(&storage.conn, list_id).await?.remote_id
                };
                let Some(list_remote_id) = list_remote_id else {
                    log::debug!("List {} of task {} has not reached the backend yet", list_id, id);
                    return Ok(Push::Retry);
                };
                remote
                    .backend
                    .create_task(&remote.token, list_remote_id, &CreateTaskArgs::from(&task))
                    .await
            }
        };

        let storage = self.storage.lock().await;
        match result {
            Ok(pushed) => {
                TaskRepository::mark_synced(&storage.conn, id, pushed.remote_id).await?;
                Ok(Push::Done)
            }
            Err(e) => {
                let push = Push::from(e);
                if let Push::Conflict = push {
                    TaskRepository::set_sync_state(&storage.conn, id, SyncState::Conflict).await?;
                }
                Ok(push)
            }
        }
    }
}
