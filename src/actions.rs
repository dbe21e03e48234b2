use crate::models::{ListDraft, Task, TaskDraft, TaskPatch};

/// User intents handled by [`crate::app::AppState::dispatch`].
#[derive(Debug, Clone)]
pub enum Action {
    // List operations
    CreateList(ListDraft),
    UpdateList { id: i64, draft: ListDraft },
    DeleteList(i64),

    // Task operations
    CreateTask { list_id: i64, draft: TaskDraft },
    UpdateTask { id: i64, patch: TaskPatch },
    DeleteTask(i64),
    StarTask(Task),
    CheckTask(Task),

    // Sync
    Reconcile,
}

impl Action {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateList(_) => "Create list",
            Action::UpdateList { .. } => "Update list",
            Action::DeleteList(_) => "Delete list",
            Action::CreateTask { .. } => "Create task",
            Action::UpdateTask { .. } => "Update task",
            Action::DeleteTask(_) => "Delete task",
            Action::StarTask(_) => "Star task",
            Action::CheckTask(_) => "Check task",
            Action::Reconcile => "Reconcile",
        }
    }
}
