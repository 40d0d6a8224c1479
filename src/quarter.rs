//! Calendar quarters in `YYYYQn` form.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Earliest year accepted for quarterly grouping.
pub const MIN_QUARTER_YEAR: i32 = 1990;

/// A calendar quarter. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quarter {
    year: i32,
    number: u8,
}

impl Quarter {
    /// Builds a quarter, returning `None` when `number` is not in 1..=4.
    pub fn new(year: i32, number: u8) -> Option<Self> {
        (1..=4).contains(&number).then_some(Self { year, number })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            number: ((date.month0() / 3) + 1) as u8,
        }
    }

    /// The quarter containing `now`.
    pub fn current(now: DateTime<Utc>) -> Self {
        Self::from_date(now.date_naive())
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// True when the quarter is not before 1990 and not after the quarter of `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.year >= MIN_QUARTER_YEAR && *self <= Self::current(now)
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised quarter label '{0}'")]
pub struct QuarterParseError(String);

impl FromStr for Quarter {
    type Err = QuarterParseError;

    /// Accepts `2025Q2`, `2025-Q2`, `2025 Q2`, `Q2_2025`, `Q2 2025` and `Q2-2025`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || QuarterParseError(s.to_string());
        let label = s.trim().to_ascii_uppercase();

        let (year_part, number_part) = if let Some(rest) = label.strip_prefix('Q') {
            let (number, year) = rest.split_once(['_', ' ', '-']).ok_or_else(err)?;
            (year, number)
        } else {
            let (year, number) = label.split_once('Q').ok_or_else(err)?;
            (year.trim_end_matches(['-', ' ', '_']), number)
        };

        if year_part.len() != 4 {
            return Err(err());
        }
        let year = year_part.parse::<i32>().map_err(|_| err())?;
        let number = number_part.trim().parse::<u8>().map_err(|_| err())?;
        Quarter::new(year, number).ok_or_else(err)
    }
}

impl TryFrom<String> for Quarter {
    type Error = QuarterParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Quarter> for String {
    fn from(q: Quarter) -> Self {
        q.to_string()
    }
}
