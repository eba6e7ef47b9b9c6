use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Homework,
    Exam,
    Commitment,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Homework => "homework",
            TaskType::Exam => "exam",
            TaskType::Commitment => "commitment",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "homework" | "compito" => Ok(TaskType::Homework),
            "exam" | "verifica" => Ok(TaskType::Exam),
            "commitment" | "impegno" => Ok(TaskType::Commitment),
            other => Err(format!(
                "unknown task type '{other}' (expected homework, exam or commitment)"
            )),
        }
    }
}

/// A planner entry as stored per user.
///
/// `due_date` keeps the text the store handed us; use [`Task::due_date`] for
/// the calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: TaskType,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "dueDate")]
    pub due_date_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        kind: TaskType,
        subject: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            subject: subject.into(),
            description: None,
            due_date_raw: format_date(due_date),
            time: None,
            completed: false,
            created_at: None,
        }
    }

    /// Calendar date the task is due, or `None` when the stored text is not a date.
    pub fn due_date(&self) -> Option<NaiveDate> {
        parse_due_date(&self.due_date_raw)
    }

    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            kind: self.kind,
            subject: self.subject.clone(),
            description: self.description.clone(),
            due_date: self.due_date_raw.clone(),
            time: self.time.clone(),
        }
    }

    pub(crate) fn apply_draft(&mut self, draft: TaskDraft) {
        self.kind = draft.kind;
        self.subject = draft.subject;
        self.description = draft.description.filter(|d| !d.trim().is_empty());
        self.due_date_raw = draft.due_date;
        self.time = draft.time.filter(|t| !t.trim().is_empty());
    }
}

/// The user-editable part of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(rename = "type", default)]
    pub kind: TaskType,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl TaskDraft {
    pub fn new(kind: TaskType, subject: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            kind,
            subject: subject.into(),
            description: None,
            due_date: format_date(due_date),
            time: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a due date, ignoring any time-of-day component.
///
/// Accepts `YYYY-MM-DD`, naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` and RFC 3339.
/// Offsets are not applied: the date part is taken as written.
pub fn parse_due_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(input) {
        return Some(stamp.naive_local().date());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|stamp| stamp.date())
}

pub fn parse_clock_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .ok()
}
