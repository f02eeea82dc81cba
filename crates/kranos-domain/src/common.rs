//! Shared identifiers, strict date parsing and calendar-month keys.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Canonical on-disk and on-wire date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Surrogate key type used by every persisted entity.
pub type EntityId = i64;

/// Exposes the surrogate key of a persisted entity.
pub trait Identifiable {
    fn id(&self) -> EntityId;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised when a value is not a strict `YYYY-MM-DD` calendar date.
pub struct DateParseError {
    pub input: String,
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date format `{}`, expected YYYY-MM-DD", self.input)
    }
}

impl std::error::Error for DateParseError {}

/// Parses a date strictly as `YYYY-MM-DD`.
///
/// Single-digit months or days, surrounding whitespace and any other layout
/// are rejected rather than coerced.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let error = || DateParseError {
        input: input.to_string(),
    };
    if !has_shape(input, &[4, 2, 2]) {
        return Err(error());
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| error())
}

/// Formats a date in the canonical `YYYY-MM-DD` layout.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Inclusive last day of a duration-based membership.
///
/// A 30-day plan starting on Jan 1 ends on Jan 30. Returns `None` for a zero
/// duration or when the result overflows the calendar.
pub fn membership_end_date(start: NaiveDate, duration_days: u32) -> Option<NaiveDate> {
    if duration_days == 0 {
        return None;
    }
    start.checked_add_days(Days::new(u64::from(duration_days) - 1))
}

fn has_shape(input: &str, groups: &[usize]) -> bool {
    let mut parts = input.split('-');
    for expected in groups {
        match parts.next() {
            Some(part) if part.len() == *expected && part.bytes().all(|b| b.is_ascii_digit()) => {}
            _ => return false,
        }
    }
    parts.next().is_none()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised when a value is not a `YYYY-MM` month key.
pub struct MonthKeyError {
    pub input: String,
}

impl fmt::Display for MonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid month `{}`, expected YYYY-MM", self.input)
    }
}

impl std::error::Error for MonthKeyError {}

/// A calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(MonthKeyError {
                input: format!("{year}-{month}"),
            });
        }
        Ok(Self { year, month })
    }

    pub fn parse(input: &str) -> Result<Self, MonthKeyError> {
        let error = || MonthKeyError {
            input: input.to_string(),
        };
        if !has_shape(input, &[4, 2]) {
            return Err(error());
        }
        let year = input[..4].parse::<i32>().map_err(|_| error())?;
        let month = input[5..].parse::<u32>().map_err(|_| error())?;
        Self::new(year, month).map_err(|_| error())
    }

    /// Month that contains `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}
