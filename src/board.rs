use crate::calendar::WeekWindow;
use crate::task::Task;
use crate::timetable::{SchoolDay, Slot, Timetable};
use crate::weekly::bucketize;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One day of the weekly board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayColumn {
    pub date: NaiveDate,
    pub name: String,
    pub key: String,
    pub is_weekend: bool,
    pub is_today: bool,
    /// Empty on weekends.
    pub slots: Vec<Slot>,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBoard {
    pub week_start: NaiveDate,
    pub label: String,
    pub days: Vec<DayColumn>,
    pub hidden_tasks: usize,
}

impl WeekBoard {
    pub fn build(week: &WeekWindow, timetable: &Timetable, tasks: &[Task], today: NaiveDate) -> Self {
        let buckets = bucketize(tasks, week);
        let hidden_tasks = buckets.unparseable();

        let days = week
            .days()
            .into_iter()
            .zip(buckets.into_buckets())
            .map(|(day, bucket)| {
                let slots = if day.is_weekend {
                    Vec::new()
                } else {
                    SchoolDay::from_weekday(day.date.weekday())
                        .map(|school_day| timetable.slots(school_day))
                        .unwrap_or_default()
                };
                DayColumn {
                    is_today: day.date == today,
                    date: day.date,
                    name: day.name,
                    key: day.key,
                    is_weekend: day.is_weekend,
                    slots,
                    tasks: bucket.tasks,
                }
            })
            .collect();

        Self {
            week_start: week.start(),
            label: week.range_label(),
            days,
            hidden_tasks,
        }
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayColumn> {
        self.days.iter().find(|column| column.date == date)
    }
}
