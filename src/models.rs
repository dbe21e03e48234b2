//! Canonical domain model.
//!
//! Every storage boundary converts into these types: the SQLite entities in
//! [`crate::entities`] through the `TryFrom` impls below, the REST wire types
//! in [`crate::backend`] through their own adapters. Nothing above the
//! storage layer sees raw rows or wire payloads.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::{COMPLETION_RATE_MAX, DESCRIPTION_MAX_LEN, LIST_NAME_MAX_LEN, TASK_TITLE_MAX_LEN};
use crate::entities::{list, task};
use crate::utils::datetime;

pub use crate::entities::SyncState;

/// A named collection of tasks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: i64,
    pub remote_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub sync_state: SyncState,
}

/// A unit of work owned by exactly one list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub remote_id: Option<i64>,
    pub list_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub starred: bool,
    pub completed: bool,
    pub deadline: Option<NaiveDate>,
    pub completion_rate: u8,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub sync_state: SyncState,
}

/// Input for creating or replacing a list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListDraft {
    pub name: String,
    pub description: Option<String>,
}

/// Input for creating a task.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub starred: bool,
    pub deadline: Option<NaiveDate>,
    pub completion_rate: u8,
}

/// Partial task update; `None` leaves a field untouched.
///
/// The nullable fields take `Some(None)` to clear the stored value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub starred: Option<bool>,
    pub completed: Option<bool>,
    pub deadline: Option<Option<NaiveDate>>,
    pub completion_rate: Option<u8>,
}

/// Rejected input, caught before anything is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("completion rate must be between 0 and {max}, got {value}")]
    CompletionRate { value: u8, max: u8 },
}

fn check_required(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    check_len(field, value, max)
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

fn check_description(description: Option<&str>) -> Result<(), ValidationError> {
    match description {
        Some(text) => check_len("description", text, DESCRIPTION_MAX_LEN),
        None => Ok(()),
    }
}

fn check_rate(value: u8) -> Result<(), ValidationError> {
    if value > COMPLETION_RATE_MAX {
        return Err(ValidationError::CompletionRate {
            value,
            max: COMPLETION_RATE_MAX,
        });
    }
    Ok(())
}

impl ListDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required("name", &self.name, LIST_NAME_MAX_LEN)?;
        check_description(self.description.as_deref())
    }
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required("title", &self.title, TASK_TITLE_MAX_LEN)?;
        check_description(self.description.as_deref())?;
        check_rate(self.completion_rate)
    }
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            check_required("title", title, TASK_TITLE_MAX_LEN)?;
        }
        check_description(self.description.as_ref().and_then(|d| d.as_deref()))?;
        if let Some(rate) = self.completion_rate {
            check_rate(rate)?;
        }
        Ok(())
    }

    /// Patch that stars or unstars a task.
    pub fn starred(starred: bool) -> Self {
        Self {
            starred: Some(starred),
            ..Default::default()
        }
    }

    /// Patch that completes or reopens a task; the rate follows the flag.
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            completion_rate: Some(if completed { COMPLETION_RATE_MAX } else { 0 }),
            ..Default::default()
        }
    }
}

impl Task {
    /// Time between creation and the last update of a completed task, shown
    /// as its completion duration. `None` while the task is open.
    pub fn completion_duration(&self) -> Option<String> {
        self.completed
            .then(|| datetime::calculate_duration(self.created_at, self.updated_at))
    }

    /// Apply a patch in memory, mirroring what the store does.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(starred) = patch.starred {
            self.starred = starred;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(rate) = patch.completion_rate {
            self.completion_rate = rate;
        }
    }
}

fn decode_timestamp(value: &str, column: &str) -> Result<NaiveDateTime> {
    datetime::parse_timestamp(value).ok_or_else(|| anyhow!("Invalid {} timestamp: {}", column, value))
}

impl TryFrom<list::Model> for List {
    type Error = anyhow::Error;

    fn try_from(model: list::Model) -> Result<Self> {
        Ok(Self {
            created_at: decode_timestamp(&model.created_at, "created_at")?,
            updated_at: decode_timestamp(&model.updated_at, "updated_at")?,
            id: model.id,
            remote_id: model.remote_id,
            name: model.name,
            description: model.description,
            sync_state: model.sync_state,
        })
    }
}

impl TryFrom<task::Model> for Task {
    type Error = anyhow::Error;

    fn try_from(model: task::Model) -> Result<Self> {
        let deadline = match model.deadline.as_deref() {
            Some(text) if !text.is_empty() => {
                Some(datetime::parse_date(text).map_err(|e| anyhow!("Invalid deadline '{}': {}", text, e))?)
            }
            _ => None,
        };
        let completion_rate = u8::try_from(model.completion_rate)
            .ok()
            .filter(|rate| *rate <= COMPLETION_RATE_MAX)
            .ok_or_else(|| anyhow!("Invalid completion_rate: {}", model.completion_rate))?;

        Ok(Self {
            created_at: decode_timestamp(&model.created_at, "created_at")?,
            updated_at: decode_timestamp(&model.updated_at, "updated_at")?,
            id: model.id,
            remote_id: model.remote_id,
            list_id: model.list_id,
            title: model.title,
            description: model.description,
            starred: model.starred,
            completed: model.completed,
            deadline,
            completion_rate,
            sync_state: model.sync_state,
        })
    }
}

/// Decode a batch of rows, failing on the first malformed one.
pub fn decode_all<M, T>(models: Vec<M>) -> Result<Vec<T>>
where
    T: TryFrom<M, Error = anyhow::Error>,
{
    models.into_iter().map(T::try_from).collect()
}
