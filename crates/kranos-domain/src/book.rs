//! Monthly book status: whether a calendar month accepts financial mutations.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::MonthKey;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
/// Open months accept new and deleted memberships; closed months are frozen.
pub enum BookStatus {
    #[default]
    Open,
    Closed,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Open => "open",
            BookStatus::Closed => "closed",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, BookStatus::Closed)
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised for status strings other than `open` or `closed`.
pub struct BookStatusParseError {
    pub input: String,
}

impl fmt::Display for BookStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid book status `{}`, expected `open` or `closed`",
            self.input
        )
    }
}

impl std::error::Error for BookStatusParseError {}

impl FromStr for BookStatus {
    type Err = BookStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(BookStatus::Open),
            "closed" => Ok(BookStatus::Closed),
            _ => Err(BookStatusParseError {
                input: s.to_string(),
            }),
        }
    }
}

/// One row of the monthly book status ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookStatusRecord {
    pub month: MonthKey,
    pub status: BookStatus,
    /// Informational only; set when the month was last closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl BookStatusRecord {
    pub fn open(month: MonthKey) -> Self {
        Self {
            month,
            status: BookStatus::Open,
            closed_at: None,
        }
    }

    pub fn closed(month: MonthKey, at: DateTime<Utc>) -> Self {
        Self {
            month,
            status: BookStatus::Closed,
            closed_at: Some(at),
        }
    }
}
