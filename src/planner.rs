use crate::agenda::{self, Agenda};
use crate::board::WeekBoard;
use crate::calendar::WeekWindow;
use crate::profile::{Preferences, StudentProfile, Theme};
use crate::task::{Task, TaskDraft};
use crate::task_validation::{self, TaskValidationError};
use crate::timetable::Timetable;
use crate::weekly::{self, WeekBuckets};
use chrono::{NaiveDate, SecondsFormat, Utc};
use std::sync::LazyLock;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    #[error("task {0} not found")]
    TaskNotFound(String),
    #[error("task {0} already exists")]
    DuplicateTask(String),
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;

static DEFAULT_TIMETABLE: LazyLock<Timetable> = LazyLock::new(Timetable::default);

/// All planner state belonging to one student.
///
/// Task order is insertion order; it is the tie-break the weekly board uses
/// for tasks due on the same day.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    tasks: Vec<Task>,
    timetable: Option<Timetable>,
    profile: StudentProfile,
    preferences: Preferences,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        tasks: Vec<Task>,
        timetable: Option<Timetable>,
        profile: StudentProfile,
        preferences: Preferences,
    ) -> PlannerResult<Self> {
        task_validation::validate_task_collection(&tasks)?;
        Ok(Self {
            tasks,
            timetable,
            profile,
            preferences,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    fn position(&self, task_id: &str) -> PlannerResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == task_id)
            .ok_or_else(|| PlannerError::TaskNotFound(task_id.to_string()))
    }

    /// Create a new, not yet completed task with a fresh id.
    pub fn add_task(&mut self, draft: TaskDraft) -> PlannerResult<Task> {
        task_validation::validate_draft(&draft)?;
        let mut task = Task {
            id: Uuid::new_v4().to_string(),
            kind: draft.kind,
            subject: String::new(),
            description: None,
            due_date_raw: String::new(),
            time: None,
            completed: false,
            created_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        task.apply_draft(draft);
        self.tasks.push(task.clone());
        tracing::debug!(task_id = %task.id, "task added");
        Ok(task)
    }

    /// Replace the editable fields; id, completion and creation stamp are kept.
    pub fn update_task(&mut self, task_id: &str, draft: TaskDraft) -> PlannerResult<Task> {
        task_validation::validate_draft(&draft)?;
        let idx = self.position(task_id)?;
        let task = &mut self.tasks[idx];
        task.apply_draft(draft);
        Ok(task.clone())
    }

    /// Insert a complete task record, replacing any task with the same id in place.
    pub fn upsert_task_record(&mut self, task: Task) -> PlannerResult<()> {
        task_validation::validate_task(&task)?;
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
        Ok(())
    }

    /// Insert a task record that must not exist yet.
    pub fn insert_task_record(&mut self, task: Task) -> PlannerResult<()> {
        if self.find_task(&task.id).is_some() {
            return Err(PlannerError::DuplicateTask(task.id));
        }
        self.upsert_task_record(task)
    }

    pub fn toggle_completed(&mut self, task_id: &str) -> PlannerResult<Task> {
        let idx = self.position(task_id)?;
        let task = &mut self.tasks[idx];
        task.completed = !task.completed;
        Ok(task.clone())
    }

    pub fn delete_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != task_id);
        before != self.tasks.len()
    }

    /// The user's timetable, or the built-in default when none was saved.
    pub fn timetable(&self) -> &Timetable {
        self.timetable.as_ref().unwrap_or(&*DEFAULT_TIMETABLE)
    }

    pub fn has_custom_timetable(&self) -> bool {
        self.timetable.is_some()
    }

    pub(crate) fn custom_timetable(&self) -> Option<&Timetable> {
        self.timetable.as_ref()
    }

    pub fn set_timetable(&mut self, timetable: Timetable) {
        self.timetable = Some(timetable);
    }

    /// Edit the timetable in place, materializing the default first.
    pub fn edit_timetable<R>(&mut self, edit: impl FnOnce(&mut Timetable) -> R) -> R {
        let timetable = self
            .timetable
            .get_or_insert_with(|| DEFAULT_TIMETABLE.clone());
        edit(timetable)
    }

    pub fn reset_timetable(&mut self) {
        self.timetable = None;
    }

    pub fn profile(&self) -> &StudentProfile {
        &self.profile
    }

    pub fn set_profile(&mut self, profile: StudentProfile) {
        self.profile = profile;
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.preferences.theme = self.preferences.theme.toggled();
        self.preferences.theme
    }

    pub fn week_buckets(&self, week: &WeekWindow) -> WeekBuckets {
        weekly::bucketize(&self.tasks, week)
    }

    pub fn week_board(&self, week: &WeekWindow, today: NaiveDate) -> WeekBoard {
        WeekBoard::build(week, self.timetable(), &self.tasks, today)
    }

    pub fn agenda(&self, today: NaiveDate) -> Agenda {
        agenda::upcoming(&self.tasks, today)
    }
}
