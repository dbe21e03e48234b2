//! Per-record synchronization state.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a local record stands relative to the remote backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Matches the last known remote copy
    #[default]
    #[sea_orm(string_value = "synced")]
    Synced,
    /// Created or modified locally, not yet pushed
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Deleted locally, remote delete still outstanding
    #[sea_orm(string_value = "deleted")]
    Deleted,
    /// The backend rejected the pending change
    #[sea_orm(string_value = "conflict")]
    Conflict,
}

impl SyncState {
    /// Whether the record still has to be pushed to the backend
    pub fn needs_push(self) -> bool {
        matches!(self, SyncState::Pending | SyncState::Deleted)
    }
}
