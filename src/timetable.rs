use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wall-clock hour of the first period of the day.
pub const BASE_HOUR: u32 = 8;

/// A contiguous run of hours sharing one period label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub start_hour: u32,
    /// Exclusive.
    pub end_hour: u32,
    pub label: String,
}

impl Slot {
    /// Zero for a malformed slot whose end precedes its start.
    pub fn hours(&self) -> u32 {
        self.end_hour.saturating_sub(self.start_hour)
    }
}

/// Collapse a day's period labels into slots starting at [`BASE_HOUR`].
pub fn compress<S: AsRef<str>>(periods: &[S]) -> Vec<Slot> {
    merge_runs(periods, BASE_HOUR)
}

/// Collapse a day's period labels into slots, index 0 mapping to `base_hour`.
///
/// Consecutive labels merge only when they are exactly equal; no case or
/// whitespace folding is applied. Fails when the last slot would end past
/// `u32::MAX`.
pub fn compress_from<S: AsRef<str>>(
    periods: &[S],
    base_hour: u32,
) -> Result<Vec<Slot>, TimetableError> {
    u32::try_from(periods.len())
        .ok()
        .and_then(|len| base_hour.checked_add(len))
        .ok_or(TimetableError::HourOverflow {
            base_hour,
            periods: periods.len(),
        })?;
    Ok(merge_runs(periods, base_hour))
}

fn merge_runs<S: AsRef<str>>(periods: &[S], base_hour: u32) -> Vec<Slot> {
    let hour = |idx: usize| base_hour.saturating_add(u32::try_from(idx).unwrap_or(u32::MAX));
    let mut slots = Vec::new();
    let mut run_start = 0usize;

    for idx in 1..=periods.len() {
        let run_ended = idx == periods.len()
            || periods[idx].as_ref() != periods[run_start].as_ref();
        if run_ended {
            slots.push(Slot {
                start_hour: hour(run_start),
                end_hour: hour(idx),
                label: periods[run_start].as_ref().to_string(),
            });
            run_start = idx;
        }
    }
    slots
}

/// Expand slots back into one label per covered hour.
pub fn expand(slots: &[Slot]) -> Vec<String> {
    slots
        .iter()
        .flat_map(|slot| std::iter::repeat_n(slot.label.clone(), slot.hours() as usize))
        .collect()
}

/// A day of the six-day school week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchoolDay {
    #[serde(rename = "lun")]
    Monday,
    #[serde(rename = "mar")]
    Tuesday,
    #[serde(rename = "mer")]
    Wednesday,
    #[serde(rename = "gio")]
    Thursday,
    #[serde(rename = "ven")]
    Friday,
    #[serde(rename = "sab")]
    Saturday,
}

impl SchoolDay {
    pub const ALL: [SchoolDay; 6] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
        SchoolDay::Saturday,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SchoolDay::Monday => "lun",
            SchoolDay::Tuesday => "mar",
            SchoolDay::Wednesday => "mer",
            SchoolDay::Thursday => "gio",
            SchoolDay::Friday => "ven",
            SchoolDay::Saturday => "sab",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SchoolDay::Monday => "Lunedì",
            SchoolDay::Tuesday => "Martedì",
            SchoolDay::Wednesday => "Mercoledì",
            SchoolDay::Thursday => "Giovedì",
            SchoolDay::Friday => "Venerdì",
            SchoolDay::Saturday => "Sabato",
        }
    }

    /// Sunday has no school day.
    pub fn from_weekday(weekday: Weekday) -> Option<Self> {
        match weekday {
            Weekday::Mon => Some(SchoolDay::Monday),
            Weekday::Tue => Some(SchoolDay::Tuesday),
            Weekday::Wed => Some(SchoolDay::Wednesday),
            Weekday::Thu => Some(SchoolDay::Thursday),
            Weekday::Fri => Some(SchoolDay::Friday),
            Weekday::Sat => Some(SchoolDay::Saturday),
            Weekday::Sun => None,
        }
    }
}

impl fmt::Display for SchoolDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SchoolDay {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        SchoolDay::ALL
            .into_iter()
            .find(|day| day.key() == key)
            .ok_or_else(|| TimetableError::UnknownDay(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimetableError {
    #[error("unknown school day '{0}' (expected one of lun, mar, mer, gio, ven, sab)")]
    UnknownDay(String),
    #[error("{day} has no hour #{index} ({len} hours defined)")]
    HourOutOfRange {
        day: SchoolDay,
        index: usize,
        len: usize,
    },
    #[error("{periods} periods starting at hour {base_hour} run past the last representable hour")]
    HourOverflow { base_hour: u32, periods: usize },
}

/// Weekly class timetable keyed by school day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable {
    days: BTreeMap<SchoolDay, Vec<String>>,
}

impl Default for Timetable {
    fn default() -> Self {
        let mut timetable = Self::empty();
        let defaults: [(SchoolDay, &[&str]); 5] = [
            (
                SchoolDay::Monday,
                &["Latino", "Matematica", "Matematica", "Inglese", "Italiano"],
            ),
            (
                SchoolDay::Tuesday,
                &[
                    "Italiano",
                    "Motoria",
                    "Matematica",
                    "Matematica",
                    "Italiano",
                    "Scienze",
                ],
            ),
            (
                SchoolDay::Wednesday,
                &["Inglese", "Latino", "Italiano", "Arte", "Matematica"],
            ),
            (
                SchoolDay::Thursday,
                &[
                    "Scienze",
                    "Italiano",
                    "Italiano",
                    "Religione",
                    "Matematica",
                    "Arte",
                ],
            ),
            (
                SchoolDay::Friday,
                &["Latino", "Matematica", "Italiano", "Inglese", "Motoria"],
            ),
        ];
        for (day, subjects) in defaults {
            timetable.set_day(day, subjects.iter().map(|s| s.to_string()));
        }
        timetable
    }
}

impl Timetable {
    pub fn empty() -> Self {
        Self {
            days: BTreeMap::new(),
        }
    }

    pub fn periods(&self, day: SchoolDay) -> &[String] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_day<I>(&mut self, day: SchoolDay, periods: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.days.insert(day, periods.into_iter().collect());
    }

    pub fn set_subject(
        &mut self,
        day: SchoolDay,
        index: usize,
        subject: impl Into<String>,
    ) -> Result<(), TimetableError> {
        let periods = self.days.entry(day).or_default();
        let len = periods.len();
        let slot = periods
            .get_mut(index)
            .ok_or(TimetableError::HourOutOfRange { day, index, len })?;
        *slot = subject.into();
        Ok(())
    }

    /// Append an empty hour at the end of the day; returns its index.
    pub fn add_hour(&mut self, day: SchoolDay) -> usize {
        let periods = self.days.entry(day).or_default();
        periods.push(String::new());
        periods.len() - 1
    }

    pub fn remove_hour(&mut self, day: SchoolDay, index: usize) -> Result<String, TimetableError> {
        let periods = self.days.entry(day).or_default();
        if index >= periods.len() {
            return Err(TimetableError::HourOutOfRange {
                day,
                index,
                len: periods.len(),
            });
        }
        Ok(periods.remove(index))
    }

    pub fn slots(&self, day: SchoolDay) -> Vec<Slot> {
        compress(self.periods(day))
    }

    /// Distinct non-empty subjects of a day, in order of first appearance.
    pub fn suggested_subjects(&self, day: SchoolDay) -> Vec<String> {
        let mut seen = HashSet::new();
        self.periods(day)
            .iter()
            .filter(|subject| !subject.trim().is_empty())
            .filter(|subject| seen.insert(subject.as_str()))
            .cloned()
            .collect()
    }
}
