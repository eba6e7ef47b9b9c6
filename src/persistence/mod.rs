use crate::planner::{Planner, PlannerError};
use crate::task::Task;
use crate::task_validation;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<PlannerError> for PersistenceError {
    fn from(value: PlannerError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Per-user planner storage.
pub trait PlannerStore: Send + Sync {
    fn save_planner(&self, user_id: &str, planner: &Planner) -> PersistenceResult<()>;
    fn load_planner(&self, user_id: &str) -> PersistenceResult<Option<Planner>>;
}

pub fn validate_tasks(tasks: &[Task]) -> PersistenceResult<()> {
    task_validation::validate_task_collection(tasks)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    export_tasks_to_csv, import_tasks_from_csv, load_planner_from_json, save_planner_to_json,
};
