use anyhow::Result;
use sea_orm::{ActiveValue, ConnectionTrait, IntoActiveModel, TransactionTrait};

use crate::backend::{BackendList, BackendTask};
use crate::entities::{list, task, SyncState};
use crate::repositories::{ListRepository, TaskRepository};
use crate::storage::LocalStorage;
use crate::sync::SyncService;
use crate::utils::datetime;

impl SyncService {
    /// Upsert one remote list into the cache.
    ///
    /// Rows with local changes that have not been pushed yet are left alone.
    pub(super) async fn store_remote_list<C>(conn: &C, remote: &BackendList) -> Result<list::Model>
    where
        C: ConnectionTrait,
    {
        let draft = remote.to_draft();
        match ListRepository::get_by_remote_id(conn, remote.remote_id).await? {
            Some(existing) if existing.sync_state != SyncState::Synced => Ok(existing),
            Some(existing) if existing.name == draft.name && existing.description == draft.description => Ok(existing),
            Some(existing) => ListRepository::update(conn, existing.id, &draft, SyncState::Synced).await,
            None => ListRepository::create(conn, &draft, Some(remote.remote_id), SyncState::Synced).await,
        }
    }

    /// Replace the cached lists with a full remote listing.
    ///
    /// # Arguments
    /// * `storage` - Local storage holding the cache
    /// * `lists` - Every list the backend returned
    pub(super) async fn store_lists_batch(&self, storage: &LocalStorage, lists: &[BackendList]) -> Result<()> {
        let txn = storage.conn.begin().await?;

        for remote in lists {
            Self::store_remote_list(&txn, remote).await?;
        }

        let keep: Vec<i64> = lists.iter().map(|remote| remote.remote_id).collect();
        let pruned = ListRepository::prune_synced_except(&txn, &keep).await?;
        if pruned > 0 {
            log::debug!("🗑️  Pruned {} lists removed remotely", pruned);
        }

        txn.commit().await?;
        Ok(())
    }

    /// Upsert one remote task into the cache under the given local list.
    ///
    /// Rows with local changes that have not been pushed yet are left alone.
    pub(super) async fn store_remote_task<C>(conn: &C, list_id: i64, remote: &BackendTask) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        match TaskRepository::get_by_remote_id(conn, remote.remote_id).await? {
            Some(existing) if existing.sync_state != SyncState::Synced => Ok(existing),
            Some(existing) if Self::task_matches(&existing, list_id, remote) => Ok(existing),
            Some(existing) => Self::overwrite_task(conn, existing, list_id, remote).await,
            None => {
                let model = task::ActiveModel {
                    remote_id: ActiveValue::Set(Some(remote.remote_id)),
                    list_id: ActiveValue::Set(list_id),
                    title: ActiveValue::Set(remote.title.clone()),
                    description: ActiveValue::Set(remote.description.clone()),
                    starred: ActiveValue::Set(remote.starred),
                    completed: ActiveValue::Set(remote.completed),
                    deadline: ActiveValue::Set(remote.deadline.map(datetime::format_ymd)),
                    completion_rate: ActiveValue::Set(i32::from(remote.completion_rate)),
                    sync_state: ActiveValue::Set(SyncState::Synced),
                    ..Default::default()
                };
                TaskRepository::insert(conn, model).await
            }
        }
    }

    /// Write every field of the remote copy over a cached row and mark it synced.
    pub(super) async fn overwrite_task<C>(
        conn: &C,
        existing: task::Model,
        list_id: i64,
        remote: &BackendTask,
    ) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        let mut model = existing.into_active_model();
        model.remote_id = ActiveValue::Set(Some(remote.remote_id));
        model.list_id = ActiveValue::Set(list_id);
        model.title = ActiveValue::Set(remote.title.clone());
        model.description = ActiveValue::Set(remote.description.clone());
        model.starred = ActiveValue::Set(remote.starred);
        model.completed = ActiveValue::Set(remote.completed);
        model.deadline = ActiveValue::Set(remote.deadline.map(datetime::format_ymd));
        model.completion_rate = ActiveValue::Set(i32::from(remote.completion_rate));
        model.sync_state = ActiveValue::Set(SyncState::Synced);
        TaskRepository::save(conn, model).await
    }

    fn task_matches(existing: &task::Model, list_id: i64, remote: &BackendTask) -> bool {
        existing.list_id == list_id
            && existing.title == remote.title
            && existing.description == remote.description
            && existing.starred == remote.starred
            && existing.completed == remote.completed
            && existing.deadline == remote.deadline.map(datetime::format_ymd)
            && existing.completion_rate == i32::from(remote.completion_rate)
    }

    /// Replace the cached tasks of one list with a full remote listing.
    pub(super) async fn store_tasks_batch(
        &self,
        storage: &LocalStorage,
        list_id: i64,
        tasks: &[BackendTask],
    ) -> Result<()> {
        let txn = storage.conn.begin().await?;

        for remote in tasks {
            Self::store_remote_task(&txn, list_id, remote).await?;
        }

        let keep: Vec<i64> = tasks.iter().map(|remote| remote.remote_id).collect();
        let pruned = TaskRepository::prune_synced_except(&txn, list_id, &keep).await?;
        if pruned > 0 {
            log::debug!("🗑️  Pruned {} tasks removed remotely from list {}", pruned, list_id);
        }

        txn.commit().await?;
        Ok(())
    }

    /// Cache tasks from a cross-list query, skipping those whose list is not cached.
    pub(super) async fn store_found_tasks(&self, storage: &LocalStorage, tasks: &[BackendTask]) -> Result<usize> {
        let txn = storage.conn.begin().await?;
        let mut stored = 0;

        for remote in tasks {
            match ListRepository::get_by_remote_id(&txn, remote.list_remote_id).await? {
                Some(list) if list.sync_state == SyncState::Deleted => log::debug!(
                    "Skipping task {}: list {} is deleted locally",
                    remote.remote_id,
                    list.id
                ),
                Some(list) => {
                    Self::store_remote_task(&txn, list.id, remote).await?;
                    stored += 1;
                }
                None => log::debug!(
                    "Skipping task {}: list {} is not cached",
                    remote.remote_id,
                    remote.list_remote_id
                ),
            }
        }

        txn.commit().await?;
        Ok(stored)
    }
}
