//! Backend abstraction layer for the remote REST service.
//!
//! This module defines the interface the sync layer talks to, the wire
//! representations of lists, tasks and accounts, and the error type every
//! remote call returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod rest;
pub mod wire;

use crate::models::{ListDraft, Task, TaskDraft, TaskPatch};
use crate::utils::datetime;

/// Human-readable phrase for an HTTP status code.
pub fn status_message(code: u16) -> String {
    match code {
        400 => "Bad Request".to_string(),
        401 => "Unauthorized".to_string(),
        403 => "Forbidden".to_string(),
        404 => "Not Found".to_string(),
        405 => "Method Not Allowed".to_string(),
        429 => "Too Many Requests".to_string(),
        500 => "Server Error".to_string(),
        _ => format!("Error {}", code),
    }
}

/// Error types for backend operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response
    #[error("{0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response body did not match the expected shape
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl BackendError {
    /// Build the error for a non-success status code.
    pub fn from_status(status: u16) -> Self {
        Self::Http {
            status,
            message: status_message(status),
        }
    }

    /// HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying later could succeed: transport failures, rate
    /// limiting and server errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidData(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// List as the REST API returns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendList {
    #[serde(rename = "id")]
    pub remote_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Task as the REST API returns it.
///
/// Older server builds send booleans as `"TRUE"`/`"FALSE"`, the rate as a
/// numeric string and the owning list as a nested object; the `wire`
/// helpers accept all of these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendTask {
    #[serde(rename = "id")]
    pub remote_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "wire::flexible_bool")]
    pub starred: bool,
    #[serde(default, deserialize_with = "wire::flexible_bool")]
    pub completed: bool,
    #[serde(default, deserialize_with = "wire::optional_date")]
    pub deadline: Option<chrono::NaiveDate>,
    #[serde(default, deserialize_with = "wire::flexible_rate")]
    pub completion_rate: u8,
    #[serde(rename = "list", deserialize_with = "wire::list_reference")]
    pub list_remote_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Account details returned by the auth endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Arguments for registering an account.
#[derive(Clone, Debug, Serialize)]
pub struct RegisterArgs {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Arguments for obtaining a token.
#[derive(Clone, Debug, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Arguments for changing the password of the signed-in account.
#[derive(Clone, Debug, Serialize)]
pub struct ChangePasswordArgs {
    pub current_password: String,
    pub new_password: String,
}

/// Body of list create and replace requests.
#[derive(Clone, Debug, Serialize)]
pub struct ListArgs {
    pub name: String,
    pub description: String,
}

/// Body of task create requests.
#[derive(Clone, Debug, Serialize)]
pub struct CreateTaskArgs {
    pub title: String,
    pub description: String,
    pub starred: bool,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub completion_rate: u8,
}

/// Body of partial task updates; absent fields are left alone and a `null`
/// deadline clears it.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateTaskArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<u8>,
}

impl From<&ListDraft> for ListArgs {
    fn from(draft: &ListDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone().unwrap_or_default(),
        }
    }
}

impl From<&TaskDraft> for CreateTaskArgs {
    fn from(draft: &TaskDraft) -> Self {
        Self {
            title: draft.title.clone(),
            description: draft.description.clone().unwrap_or_default(),
            starred: draft.starred,
            completed: false,
            deadline: draft.deadline.map(datetime::format_ymd),
            completion_rate: draft.completion_rate,
        }
    }
}

impl From<&TaskPatch> for UpdateTaskArgs {
    fn from(patch: &TaskPatch) -> Self {
        Self {
            title: patch.title.clone(),
            description: patch.description.clone().map(Option::unwrap_or_default),
            starred: patch.starred,
            completed: patch.completed,
            deadline: patch.deadline.map(|deadline| deadline.map(datetime::format_ymd)),
            completion_rate: patch.completion_rate,
        }
    }
}

impl From<&Task> for CreateTaskArgs {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            starred: task.starred,
            completed: task.completed,
            deadline: task.deadline.map(datetime::format_ymd),
            completion_rate: task.completion_rate,
        }
    }
}

impl From<&Task> for UpdateTaskArgs {
    /// Every field, for pushing a record whose earlier edits never reached
    /// the server.
    fn from(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            description: Some(task.description.clone().unwrap_or_default()),
            starred: Some(task.starred),
            completed: Some(task.completed),
            deadline: Some(task.deadline.map(datetime::format_ymd)),
            completion_rate: Some(task.completion_rate),
        }
    }
}

impl BackendList {
    pub fn to_draft(&self) -> ListDraft {
        ListDraft {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Interface of the remote to-do service.
///
/// Every authenticated call takes the bearer token explicitly; the caller
/// owns the session.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the backend type identifier (e.g., "rest").
    fn backend_type(&self) -> &str;

    // Account operations
    async fn register(&self, args: &RegisterArgs) -> Result<Profile, BackendError>;
    async fn log_in(&self, credentials: &Credentials) -> Result<String, BackendError>;
    async fn log_out(&self, token: &str) -> Result<(), BackendError>;
    async fn fetch_profile(&self, token: &str) -> Result<Profile, BackendError>;
    async fn change_password(&self, token: &str, args: &ChangePasswordArgs) -> Result<(), BackendError>;

    // CRUD operations for lists
    async fn fetch_lists(&self, token: &str) -> Result<Vec<BackendList>, BackendError>;
    async fn create_list(&self, token: &str, args: &ListArgs) -> Result<BackendList, BackendError>;
    async fn update_list(&self, token: &str, remote_id: i64, args: &ListArgs) -> Result<BackendList, BackendError>;
    async fn delete_list(&self, token: &str, remote_id: i64) -> Result<(), BackendError>;

    // CRUD operations for tasks
    async fn fetch_tasks(&self, token: &str, list_remote_id: i64) -> Result<Vec<BackendTask>, BackendError>;
    async fn fetch_task(&self, token: &str, remote_id: i64) -> Result<BackendTask, BackendError>;
    async fn search_tasks(&self, token: &str, query: &str) -> Result<Vec<BackendTask>, BackendError>;
    async fn create_task(
        &self,
        token: &str,
        list_remote_id: i64,
        args: &CreateTaskArgs,
    ) -> Result<BackendTask, BackendError>;
    async fn update_task(&self, token: &str, remote_id: i64, args: &UpdateTaskArgs) -> Result<BackendTask, BackendError>;
    async fn delete_task(&self, token: &str, remote_id: i64) -> Result<(), BackendError>;
}
