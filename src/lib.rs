pub mod agenda;
pub mod board;
pub mod calendar;
pub mod chat;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod planner;
pub mod profile;
pub mod task;
pub(crate) mod task_validation;
pub mod timetable;
pub mod weekly;

pub use agenda::Agenda;
pub use board::{DayColumn, WeekBoard};
pub use calendar::{WeekDay, WeekWindow, WeekWindowError, start_of_week};
pub use chat::{ChatBackend, ChatError, ChatMessage, ChatSession, GeminiClient, Sender};
pub use config::PlannerConfig;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlannerStore;
pub use persistence::{
    PersistenceError, PlannerStore, export_tasks_to_csv, import_tasks_from_csv,
    load_planner_from_json, save_planner_to_json, validate_tasks,
};
pub use planner::{Planner, PlannerError};
pub use profile::{Preferences, StudentProfile, Theme};
pub use task::{Task, TaskDraft, TaskType};
pub use task_validation::TaskValidationError;
pub use timetable::{BASE_HOUR, SchoolDay, Slot, Timetable, TimetableError, compress, expand};
pub use weekly::{DayBucket, WeekBuckets, bucketize, bucketize_dates};
