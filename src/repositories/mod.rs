//! Repository layer for database operations.
//!
//! Repositories encapsulate the queries against the `list` and `task`
//! tables. Every function is generic over [`sea_orm::ConnectionTrait`] so it
//! runs the same on a plain connection or inside a transaction.

pub mod list;
pub mod task;

pub use list::ListRepository;
pub use task::TaskRepository;
