//! Task repository for database operations.

use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    Select,
};

use crate::constants::COMPLETION_RATE_MAX;
use crate::entities::{task, SyncState};
use crate::models::{TaskDraft, TaskPatch};
use crate::utils::datetime;

/// Repository for task-related database operations.
pub struct TaskRepository;

impl TaskRepository {
    /// Visible tasks (tombstones excluded), open ones first.
    fn visible() -> Select<task::Entity> {
        task::Entity::find()
            .filter(task::Column::SyncState.ne(SyncState::Deleted))
            .order_by_asc(task::Column::Completed)
            .order_by_asc(task::Column::Id)
    }

    /// Get all tasks of a list.
    pub async fn get_for_list<C>(conn: &C, list_id: i64) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(Self::visible()
            .filter(task::Column::ListId.eq(list_id))
            .all(conn)
            .await?)
    }

    /// Get a single task by local id.
    pub async fn get_by_id<C>(conn: &C, id: i64) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find_by_id(id).one(conn).await?)
    }

    /// Get a single task by local id, failing if it does not exist.
    pub async fn require<C>(conn: &C, id: i64) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        Self::get_by_id(conn, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))
    }

    /// Get a task that has not been deleted locally, failing otherwise.
    pub async fn require_visible<C>(conn: &C, id: i64) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        Self::get_by_id(conn, id)
            .await?
            .filter(|task| task.sync_state != SyncState::Deleted)
            .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))
    }

    /// Get a single task by remote id.
    pub async fn get_by_remote_id<C>(conn: &C, remote_id: i64) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::RemoteId.eq(remote_id))
            .one(conn)
            .await?)
    }

    /// Starred tasks that are not completed yet.
    pub async fn get_starred<C>(conn: &C) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(Self::visible()
            .filter(task::Column::Starred.eq(true))
            .filter(task::Column::Completed.eq(false))
            .all(conn)
            .await?)
    }

    /// Completed tasks across all lists.
    pub async fn get_completed<C>(conn: &C) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(Self::visible()
            .filter(task::Column::Completed.eq(true))
            .all(conn)
            .await?)
    }

    /// Tasks whose deadline falls on the given day.
    pub async fn get_due_on<C>(conn: &C, day: NaiveDate) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(Self::visible()
            .filter(task::Column::Deadline.eq(datetime::format_ymd(day)))
            .all(conn)
            .await?)
    }

    /// Insert a new task into a list.
    pub async fn create<C>(
        conn: &C,
        list_id: i64,
        draft: &TaskDraft,
        remote_id: Option<i64>,
        state: SyncState,
    ) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        let model = task::ActiveModel {
            remote_id: ActiveValue::Set(remote_id),
            list_id: ActiveValue::Set(list_id),
            title: ActiveValue::Set(draft.title.clone()),
            description: ActiveValue::Set(draft.description.clone()),
            starred: ActiveValue::Set(draft.starred),
            completed: ActiveValue::Set(false),
            deadline: ActiveValue::Set(draft.deadline.map(datetime::format_ymd)),
            completion_rate: ActiveValue::Set(i32::from(draft.completion_rate)),
            sync_state: ActiveValue::Set(state),
            ..Default::default()
        };
        Self::insert(conn, model).await
    }

    /// Insert a fully specified row.
    pub async fn insert<C>(conn: &C, model: task::ActiveModel) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        let inserted = model.insert(conn).await?;
        Self::require(conn, inserted.id).await
    }

    /// Write an arbitrary set of columns and return the fresh row.
    pub async fn save<C>(conn: &C, model: task::ActiveModel) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        let updated = model.update(conn).await?;
        Self::require(conn, updated.id).await
    }

    /// Apply a partial update.
    pub async fn update<C>(conn: &C, id: i64, patch: &TaskPatch, state: SyncState) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        let mut model = Self::require(conn, id).await?.into_active_model();
        if let Some(title) = &patch.title {
            model.title = ActiveValue::Set(title.clone());
        }
        if let Some(description) = &patch.description {
            model.description = ActiveValue::Set(description.clone());
        }
        if let Some(starred) = patch.starred {
            model.starred = ActiveValue::Set(starred);
        }
        if let Some(completed) = patch.completed {
            model.completed = ActiveValue::Set(completed);
        }
        if let Some(deadline) = patch.deadline {
            model.deadline = ActiveValue::Set(deadline.map(datetime::format_ymd));
        }
        if let Some(rate) = patch.completion_rate {
            model.completion_rate = ActiveValue::Set(i32::from(rate));
        }
        model.sync_state = ActiveValue::Set(state);
        Self::save(conn, model).await
    }

    /// Star or unstar a task.
    pub async fn star<C>(conn: &C, id: i64, starred: bool, state: SyncState) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        let mut model = Self::require(conn, id).await?.into_active_model();
        model.starred = ActiveValue::Set(starred);
        model.sync_state = ActiveValue::Set(state);
        Self::save(conn, model).await
    }

    /// Mark a task completed or uncompleted; the completion rate follows.
    pub async fn check<C>(conn: &C, id: i64, completed: bool, state: SyncState) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        let rate = if completed { COMPLETION_RATE_MAX } else { 0 };
        let mut model = Self::require(conn, id).await?.into_active_model();
        model.completed = ActiveValue::Set(completed);
        model.completion_rate = ActiveValue::Set(i32::from(rate));
        model.sync_state = ActiveValue::Set(state);
        Self::save(conn, model).await
    }

    /// Record the remote id and sync state after a push.
    pub async fn mark_synced<C>(conn: &C, id: i64, remote_id: i64) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        let mut model = Self::require(conn, id).await?.into_active_model();
        model.remote_id = ActiveValue::Set(Some(remote_id));
        model.sync_state = ActiveValue::Set(SyncState::Synced);
        Self::save(conn, model).await
    }

    /// Change only the sync state of a task.
    pub async fn set_sync_state<C>(conn: &C, id: i64, state: SyncState) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let mut model = Self::require(conn, id).await?.into_active_model();
        model.sync_state = ActiveValue::Set(state);
        model.update(conn).await?;
        Ok(())
    }

    /// Delete a task.
    pub async fn delete<C>(conn: &C, id: i64) -> Result<()>
    where
        C: ConnectionTrait,
    {
        task::Entity::delete_by_id(id).exec(conn).await?;
        Ok(())
    }

    /// Delete every task of a list.
    pub async fn delete_for_list<C>(conn: &C, list_id: i64) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::delete_many()
            .filter(task::Column::ListId.eq(list_id))
            .exec(conn)
            .await?
            .rows_affected)
    }

    /// Tasks with local changes still to push (pending and tombstones).
    pub async fn get_unsynced<C>(conn: &C) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::SyncState.is_in([SyncState::Pending, SyncState::Deleted]))
            .order_by_asc(task::Column::Id)
            .all(conn)
            .await?)
    }

    /// Delete synced tasks of a list whose remote id is not in `keep`.
    pub async fn prune_synced_except<C>(conn: &C, list_id: i64, keep: &[i64]) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let mut query = task::Entity::delete_many()
            .filter(task::Column::ListId.eq(list_id))
            .filter(task::Column::SyncState.eq(SyncState::Synced))
            .filter(task::Column::RemoteId.is_not_null());
        if !keep.is_empty() {
            query = query.filter(task::Column::RemoteId.is_not_in(keep.iter().copied()));
        }
        Ok(query.exec(conn).await?.rows_affected)
    }
}
