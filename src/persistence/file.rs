use super::{PersistenceError, PersistenceResult};
use crate::{
    Planner,
    profile::{Preferences, StudentProfile},
    task::{Task, TaskType},
    timetable::Timetable,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

#[derive(Serialize, Deserialize)]
struct PlannerSnapshot {
    #[serde(default)]
    profile: StudentProfile,
    #[serde(default)]
    preferences: Preferences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timetable: Option<Timetable>,
    tasks: Vec<Task>,
}

impl PlannerSnapshot {
    fn from_planner(planner: &Planner) -> PersistenceResult<Self> {
        let tasks = planner.tasks().to_vec();
        super::validate_tasks(&tasks)?;
        Ok(Self {
            profile: planner.profile().clone(),
            preferences: planner.preferences(),
            timetable: planner.custom_timetable().cloned(),
            tasks,
        })
    }

    fn into_planner(self) -> PersistenceResult<Planner> {
        super::validate_tasks(&self.tasks)?;
        Ok(Planner::from_parts(
            self.tasks,
            self.timetable,
            self.profile,
            self.preferences,
        )?)
    }
}

pub fn save_planner_to_json<P: AsRef<Path>>(planner: &Planner, path: P) -> PersistenceResult<()> {
    let snapshot = PlannerSnapshot::from_planner(planner)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    tracing::debug!(path = %path.as_ref().display(), tasks = snapshot.tasks.len(), "planner saved");
    Ok(())
}

pub fn load_planner_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Planner> {
    let file = File::open(path.as_ref())?;
    let snapshot: PlannerSnapshot = serde_json::from_reader(file)?;
    tracing::debug!(path = %path.as_ref().display(), tasks = snapshot.tasks.len(), "planner loaded");
    snapshot.into_planner()
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    subject: String,
    description: String,
    due_date: String,
    time: String,
    completed: String,
    #[serde(default)]
    created_at: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            kind: task.kind.as_str().to_string(),
            subject: task.subject.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task.due_date_raw.clone(),
            time: task.time.clone().unwrap_or_default(),
            completed: task.completed.to_string(),
            created_at: task.created_at.clone().unwrap_or_default(),
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<Task> {
        let kind = if self.kind.trim().is_empty() {
            TaskType::default()
        } else {
            TaskType::from_str(&self.kind).map_err(PersistenceError::InvalidData)?
        };
        Ok(Task {
            id: self.id,
            kind,
            subject: self.subject,
            description: parse_string_option(self.description),
            due_date_raw: self.due_date,
            time: parse_string_option(self.time),
            completed: parse_bool(&self.completed)?.unwrap_or(false),
            created_at: parse_string_option(self.created_at),
        })
    }
}

/// Write the planner's tasks as CSV, one row per task in board order.
pub fn export_tasks_to_csv<P: AsRef<Path>>(planner: &Planner, path: P) -> PersistenceResult<()> {
    super::validate_tasks(planner.tasks())?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in planner.tasks() {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read tasks from CSV. Rows are returned in file order; due dates are kept
/// verbatim.
pub fn import_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Task>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into_task()?);
    }
    super::validate_tasks(&tasks)?;
    Ok(tasks)
}

fn parse_bool(input: &str) -> PersistenceResult<Option<bool>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    match input.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
