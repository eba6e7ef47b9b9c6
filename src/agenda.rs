use crate::task::{Task, TaskType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upcoming exams and commitments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agenda {
    pub exams: Vec<Task>,
    pub commitments: Vec<Task>,
}

impl Agenda {
    pub fn is_empty(&self) -> bool {
        self.exams.is_empty() && self.commitments.is_empty()
    }
}

/// Exams and commitments due on or after `today`, earliest first.
pub fn upcoming(tasks: &[Task], today: NaiveDate) -> Agenda {
    let mut dated: Vec<(NaiveDate, &Task)> = tasks
        .iter()
        .filter(|task| matches!(task.kind, TaskType::Exam | TaskType::Commitment))
        .filter_map(|task| task.due_date().map(|due| (due, task)))
        .filter(|(due, _)| *due >= today)
        .collect();
    // stable: same-day entries keep input order
    dated.sort_by_key(|(due, _)| *due);

    let mut agenda = Agenda::default();
    for (_, task) in dated {
        match task.kind {
            TaskType::Exam => agenda.exams.push(task.clone()),
            TaskType::Commitment => agenda.commitments.push(task.clone()),
            TaskType::Homework => {}
        }
    }
    agenda
}
