use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sync_state::SyncState;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub remote_id: Option<i64>,
    pub list_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub starred: bool,
    pub completed: bool,
    pub deadline: Option<String>,
    pub completion_rate: i32,
    pub created_at: String,
    pub updated_at: String,
    pub sync_state: SyncState,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::list::Entity",
        from = "Column::ListId",
        to = "super::list::Column::Id",
        on_delete = "Cascade"
    )]
    List,
}

impl Related<super::list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::List.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
