pub mod list;
pub mod sync_state;
pub mod task;

pub use list::Entity as List;
pub use sync_state::SyncState;
pub use task::Entity as Task;
