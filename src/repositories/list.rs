//! List repository for database operations.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};

use crate::entities::{list, SyncState};
use crate::models::ListDraft;

/// Repository for list-related database operations.
pub struct ListRepository;

impl ListRepository {
    /// Get all visible lists (tombstones excluded) in creation order.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<list::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(list::Entity::find()
            .filter(list::Column::SyncState.ne(SyncState::Deleted))
            .order_by_asc(list::Column::Id)
            .all(conn)
            .await?)
    }

    /// Get a single list by local id.
    pub async fn get_by_id<C>(conn: &C, id: i64) -> Result<Option<list::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(list::Entity::find_by_id(id).one(conn).await?)
    }

    /// Get a single list by local id, failing if it does not exist.
    pub async fn require<C>(conn: &C, id: i64) -> Result<list::Model>
    where
        C: ConnectionTrait,
    {
        Self::get_by_id(conn, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("List not found: {}", id))
    }

    /// Get a list that has not been deleted locally, failing otherwise.
    ///
    /// Tombstones count as missing so nothing can be added to or revive a
    /// list whose delete is still waiting to be pushed.
    pub async fn require_visible<C>(conn: &C, id: i64) -> Result<list::Model>
    where
        C: ConnectionTrait,
    {
        Self::get_by_id(conn, id)
            .await?
            .filter(|list| list.sync_state != SyncState::Deleted)
            .ok_or_else(|| anyhow::anyhow!("List not found: {}", id))
    }

    /// Get a single list by remote id.
    pub async fn get_by_remote_id<C>(conn: &C, remote_id: i64) -> Result<Option<list::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(list::Entity::find()
            .filter(list::Column::RemoteId.eq(remote_id))
            .one(conn)
            .await?)
    }

    /// Insert a new list.
    pub async fn create<C>(conn: &C, draft: &ListDraft, remote_id: Option<i64>, state: SyncState) -> Result<list::Model>
    where
        C: ConnectionTrait,
    {
        let model = list::ActiveModel {
            remote_id: ActiveValue::Set(remote_id),
            name: ActiveValue::Set(draft.name.clone()),
            description: ActiveValue::Set(draft.description.clone()),
            sync_state: ActiveValue::Set(state),
            ..Default::default()
        };
        let inserted = model.insert(conn).await?;
        Self::require(conn, inserted.id).await
    }

    /// Replace name and description of a list.
    pub async fn update<C>(conn: &C, id: i64, draft: &ListDraft, state: SyncState) -> Result<list::Model>
    where
        C: ConnectionTrait,
    {
        let mut model = Self::require(conn, id).await?.into_active_model();
        model.name = ActiveValue::Set(draft.name.clone());
        model.description = ActiveValue::Set(draft.description.clone());
        model.sync_state = ActiveValue::Set(state);
        model.update(conn).await?;
        Self::require(conn, id).await
    }

    /// Record the remote id and sync state after a push.
    pub async fn mark_synced<C>(conn: &C, id: i64, remote_id: i64) -> Result<list::Model>
    where
        C: ConnectionTrait,
    {
        let mut model = Self::require(conn, id).await?.into_active_model();
        model.remote_id = ActiveValue::Set(Some(remote_id));
        model.sync_state = ActiveValue::Set(SyncState::Synced);
        model.update(conn).await?;
        Self::require(conn, id).await
    }

    /// Change only the sync state of a list.
    pub async fn set_sync_state<C>(conn: &C, id: i64, state: SyncState) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let mut model = Self::require(conn, id).await?.into_active_model();
        model.sync_state = ActiveValue::Set(state);
        model.update(conn).await?;
        Ok(())
    }

    /// Delete a list; its tasks go with it through the foreign key cascade.
    pub async fn delete<C>(conn: &C, id: i64) -> Result<()>
    where
        C: ConnectionTrait,
    {
        list::Entity::delete_by_id(id).exec(conn).await?;
        Ok(())
    }

    /// Lists with local changes still to push (pending and tombstones).
    pub async fn get_unsynced<C>(conn: &C) -> Result<Vec<list::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(list::Entity::find()
            .filter(list::Column::SyncState.is_in([SyncState::Pending, SyncState::Deleted]))
            .order_by_asc(list::Column::Id)
            .all(conn)
            .await?)
    }

    /// Delete synced lists whose remote id is not in `keep`.
    ///
    /// Used after a full remote fetch to drop lists removed on the server.
    /// Pending and conflicting rows are never touched.
    pub async fn prune_synced_except<C>(conn: &C, keep: &[i64]) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let mut query = list::Entity::delete_many()
            .filter(list::Column::SyncState.eq(SyncState::Synced))
            .filter(list::Column::RemoteId.is_not_null());
        if !keep.is_empty() {
            query = query.filter(list::Column::RemoteId.is_not_in(keep.iter().copied()));
        }
        Ok(query.exec(conn).await?.rows_affected)
    }
}
