//! Local storage module for list and task persistence
//!
//! This module owns the SQLite connection and schema. Queries live in
//! [`crate::repositories`].

pub mod db;

pub use db::LocalStorage;
