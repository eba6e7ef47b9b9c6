//! Partitioning of tasks into the day buckets of a week.

use crate::calendar::{DAYS_PER_WEEK, WeekWindow, WeekWindowError};
use crate::task::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tasks due on one date of the window, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
}

/// Result of [`bucketize`]: always one bucket per window date, in date order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekBuckets {
    buckets: Vec<DayBucket>,
    /// Tasks skipped because their due date could not be parsed.
    unparseable: usize,
}

impl WeekBuckets {
    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn get(&self, date: NaiveDate) -> Option<&[Task]> {
        self.buckets
            .iter()
            .find(|bucket| bucket.date == date)
            .map(|bucket| bucket.tasks.as_slice())
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.iter().map(|bucket| bucket.date)
    }

    pub fn task_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.tasks.len()).sum()
    }

    pub fn unparseable(&self) -> usize {
        self.unparseable
    }

    pub fn into_buckets(self) -> Vec<DayBucket> {
        self.buckets
    }

    pub fn into_map(self) -> BTreeMap<NaiveDate, Vec<Task>> {
        self.buckets
            .into_iter()
            .map(|bucket| (bucket.date, bucket.tasks))
            .collect()
    }
}

/// Place every task due inside `week` into its day's bucket.
///
/// Tasks due outside the window are dropped. Tasks whose due date does not
/// parse are dropped as well and counted in [`WeekBuckets::unparseable`].
pub fn bucketize(tasks: &[Task], week: &WeekWindow) -> WeekBuckets {
    let mut buckets: Vec<DayBucket> = week
        .dates()
        .iter()
        .map(|&date| DayBucket {
            date,
            tasks: Vec::new(),
        })
        .collect();
    let mut unparseable = 0;

    for task in tasks {
        let Some(due) = task.due_date() else {
            tracing::debug!(task_id = %task.id, due_date = %task.due_date_raw, "skipping task with unparseable due date");
            unparseable += 1;
            continue;
        };
        if let Some(idx) = week.index_of(due) {
            buckets[idx].tasks.push(task.clone());
        }
    }

    debug_assert_eq!(buckets.len(), DAYS_PER_WEEK);
    WeekBuckets {
        buckets,
        unparseable,
    }
}

/// [`bucketize`] over a raw date list, rejecting anything that is not a
/// 7-day consecutive window.
pub fn bucketize_dates(tasks: &[Task], dates: &[NaiveDate]) -> Result<WeekBuckets, WeekWindowError> {
    let week = WeekWindow::from_dates(dates)?;
    Ok(bucketize(tasks, &week))
}
