//! Tasklist - an offline-capable to-do data layer
//!
//! This library keeps lists and tasks in a local SQLite database and
//! synchronizes them with a REST backend. Reads are served from the backend
//! when it is reachable and from the local cache otherwise; writes made while
//! offline are queued and pushed later.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`config`] - Application configuration management
//! * [`storage`] - Local database and schema
//! * [`backend`] - REST client and wire types
//! * [`sync`] - Remote-first facade with local fallback
//! * [`session`] - Auth token, transient messages and reload signals
//! * [`app`] - The state container front ends hold

/// Account registration, sign-in and profile management
pub mod account;

/// User intents dispatched through the application state
pub mod actions;

/// Application state container
pub mod app;

/// Backend abstraction layer and REST client
pub mod backend;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and messages
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Logging setup and in-memory log buffer
pub mod logger;

/// Canonical domain types and input validation
pub mod models;

/// Persisted key-value preferences
pub mod preferences;

/// Repository layer for database operations
pub mod repositories;

/// Session-scoped shared state
pub mod session;

/// Local SQLite storage
pub mod storage;

/// Synchronization facade over the backend and the local store
pub mod sync;

/// Utility functions for date/time handling
pub mod utils;

pub use models::{List, ListDraft, SyncState, Task, TaskDraft, TaskPatch};
