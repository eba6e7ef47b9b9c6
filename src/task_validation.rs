use crate::task::{Task, TaskDraft, parse_clock_time, parse_due_date};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TaskValidationError {
    message: String,
}

impl TaskValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn validate_draft(draft: &TaskDraft) -> Result<(), TaskValidationError> {
    if draft.subject.trim().is_empty() {
        return Err(TaskValidationError::new("subject must not be empty"));
    }
    if parse_due_date(&draft.due_date).is_none() {
        return Err(TaskValidationError::new(format!(
            "dueDate '{}' is not a calendar date (expected YYYY-MM-DD)",
            draft.due_date
        )));
    }
    if let Some(time) = draft.time.as_deref() {
        if !time.trim().is_empty() && parse_clock_time(time).is_none() {
            return Err(TaskValidationError::new(format!(
                "time '{time}' is not a clock time (expected HH:MM)"
            )));
        }
    }
    Ok(())
}

pub fn validate_task(task: &Task) -> Result<(), TaskValidationError> {
    if task.id.trim().is_empty() {
        return Err(TaskValidationError::new("task id must not be empty"));
    }
    validate_draft(&task.draft())
        .map_err(|err| TaskValidationError::new(format!("task {}: {err}", task.id)))
}

/// Only identity is checked so that stored tasks with bad dates still load.
pub fn validate_task_collection(tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if task.id.trim().is_empty() {
            return Err(TaskValidationError::new("task id must not be empty"));
        }
        if !seen_ids.insert(task.id.as_str()) {
            return Err(TaskValidationError::new(format!(
                "duplicate task id {}",
                task.id
            )));
        }
    }
    Ok(())
}
