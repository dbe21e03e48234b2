//! Constants used throughout the application
//!
//! This module centralizes field limits, preference keys, user-facing
//! messages and other constant values.

// Field limits
/// Maximum length of a list name, in characters
pub const LIST_NAME_MAX_LEN: usize = 32;
/// Maximum length of a task title, in characters
pub const TASK_TITLE_MAX_LEN: usize = 32;
/// Maximum length of a list or task description, in characters
pub const DESCRIPTION_MAX_LEN: usize = 256;
/// Upper bound of a task completion rate
pub const COMPLETION_RATE_MAX: u8 = 100;

// Preference keys
pub const PREF_TOKEN: &str = "token";
pub const PREF_THEME: &str = "theme";
pub const PREF_COLOR: &str = "color";
pub const PREF_SETTINGS: &str = "settings";
pub const PREF_INIT: &str = "init";

// Success Messages
pub const SUCCESS_LIST_CREATED: &str = "✅ List created";
pub const SUCCESS_LIST_UPDATED: &str = "✅ List updated";
pub const SUCCESS_LIST_DELETED: &str = "✅ List deleted";
pub const SUCCESS_TASK_CREATED: &str = "✅ Task created";
pub const SUCCESS_TASK_UPDATED: &str = "✅ Task updated";
pub const SUCCESS_TASK_DELETED: &str = "✅ Task deleted";
pub const SUCCESS_TASK_STARRED: &str = "⭐ Task starred";
pub const SUCCESS_TASK_UNSTARRED: &str = "✅ Task unstarred";
pub const SUCCESS_TASK_COMPLETED: &str = "✅ Task completed";
pub const SUCCESS_TASK_REOPENED: &str = "✅ Task reopened";
pub const SUCCESS_SYNC_COMPLETE: &str = "✅ Sync complete";
pub const SUCCESS_SAVED_OFFLINE: &str = "💾 Saved offline, will sync later";

// Error Messages
pub const ERROR_LIST_CREATE_FAILED: &str = "❌ Failed to create list";
pub const ERROR_LIST_UPDATE_FAILED: &str = "❌ Failed to update list";
pub const ERROR_LIST_DELETE_FAILED: &str = "❌ Failed to delete list";
pub const ERROR_TASK_CREATE_FAILED: &str = "❌ Failed to create task";
pub const ERROR_TASK_UPDATE_FAILED: &str = "❌ Failed to update task";
pub const ERROR_TASK_DELETE_FAILED: &str = "❌ Failed to delete task";
pub const ERROR_SYNC_FAILED: &str = "❌ Sync failed";
pub const ERROR_NOT_SIGNED_IN: &str = "Not signed in";
pub const ERROR_NO_BACKEND: &str = "No remote backend configured";

// UI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";

/// How long a transient message stays visible
pub const MESSAGE_DISPLAY_SECS: u64 = 4;

// Logging
/// Lines kept in the in-memory log buffer; older lines are dropped
pub const LOG_BUFFER_CAPACITY: usize = 500;
/// Recent log lines printed when a command fails
pub const LOG_LINES_ON_FAILURE: usize = 10;
