use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeekWindowError {
    #[error("a week window needs exactly 7 dates, got {0}")]
    WrongLength(usize),
    #[error("week window dates must be consecutive: {previous} is followed by {next}")]
    NotConsecutive { previous: NaiveDate, next: NaiveDate },
    #[error("week window starting at {0} runs past the supported calendar range")]
    OutOfRange(NaiveDate),
}

/// Monday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Seven consecutive calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<NaiveDate>", into = "Vec<NaiveDate>")]
pub struct WeekWindow {
    dates: [NaiveDate; DAYS_PER_WEEK],
}

impl WeekWindow {
    /// Window of the 7 days beginning at `start`. Callers wanting a
    /// Monday-based week should pass [`start_of_week`] or use [`Self::containing`].
    pub fn starting_on(start: NaiveDate) -> Result<Self, WeekWindowError> {
        let mut dates = [start; DAYS_PER_WEEK];
        for (offset, slot) in dates.iter_mut().enumerate() {
            *slot = start
                .checked_add_signed(Duration::days(offset as i64))
                .ok_or(WeekWindowError::OutOfRange(start))?;
        }
        Ok(Self { dates })
    }

    /// Monday-based week containing `date`.
    pub fn containing(date: NaiveDate) -> Result<Self, WeekWindowError> {
        Self::starting_on(start_of_week(date))
    }

    /// Validate a caller-supplied date list. Nothing is padded or truncated.
    pub fn from_dates(dates: &[NaiveDate]) -> Result<Self, WeekWindowError> {
        let dates: [NaiveDate; DAYS_PER_WEEK] = dates
            .try_into()
            .map_err(|_| WeekWindowError::WrongLength(dates.len()))?;
        for pair in dates.windows(2) {
            if pair[0].succ_opt() != Some(pair[1]) {
                return Err(WeekWindowError::NotConsecutive {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(Self { dates })
    }

    pub fn dates(&self) -> &[NaiveDate; DAYS_PER_WEEK] {
        &self.dates
    }

    pub fn start(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn end(&self) -> NaiveDate {
        self.dates[DAYS_PER_WEEK - 1]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    /// Position of `date` inside the window.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start()).num_days();
        if (0..DAYS_PER_WEEK as i64).contains(&offset) {
            Some(offset as usize)
        } else {
            None
        }
    }

    pub fn next(&self) -> Result<Self, WeekWindowError> {
        let start = self
            .end()
            .succ_opt()
            .ok_or(WeekWindowError::OutOfRange(self.start()))?;
        Self::starting_on(start)
    }

    pub fn previous(&self) -> Result<Self, WeekWindowError> {
        let start = self
            .start()
            .checked_sub_signed(Duration::days(DAYS_PER_WEEK as i64))
            .ok_or(WeekWindowError::OutOfRange(self.start()))?;
        Self::starting_on(start)
    }

    pub fn days(&self) -> Vec<WeekDay> {
        self.dates.iter().copied().map(WeekDay::new).collect()
    }

    /// `d/M - d/M`, e.g. `1/1 - 7/1`.
    pub fn range_label(&self) -> String {
        format!(
            "{} - {}",
            self.start().format("%-d/%-m"),
            self.end().format("%-d/%-m")
        )
    }
}

impl TryFrom<Vec<NaiveDate>> for WeekWindow {
    type Error = WeekWindowError;

    fn try_from(value: Vec<NaiveDate>) -> Result<Self, Self::Error> {
        Self::from_dates(&value)
    }
}

impl From<WeekWindow> for Vec<NaiveDate> {
    fn from(window: WeekWindow) -> Self {
        window.dates.to_vec()
    }
}

/// A date of a week window with its display naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDay {
    pub date: NaiveDate,
    /// Lower-case Italian day name, e.g. `lunedì`.
    pub name: String,
    /// Three-letter key, e.g. `lun`.
    pub key: String,
    pub is_weekend: bool,
}

impl WeekDay {
    pub fn new(date: NaiveDate) -> Self {
        let weekday = date.weekday();
        Self {
            date,
            name: day_name(weekday).to_string(),
            key: day_key(weekday).to_string(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        }
    }
}

pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "lunedì",
        Weekday::Tue => "martedì",
        Weekday::Wed => "mercoledì",
        Weekday::Thu => "giovedì",
        Weekday::Fri => "venerdì",
        Weekday::Sat => "sabato",
        Weekday::Sun => "domenica",
    }
}

pub fn day_key(weekday: Weekday) -> &'static str {
    &day_name(weekday)[..3]
}
