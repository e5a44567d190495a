//! Report month parsing and month arithmetic.

use std::fmt;
use std::str::FromStr;

use crate::{ModelError, ModelResult};

const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// A calendar month as used by the report series (`"YYYY-MM"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Years outside `0..=9999` are rejected along with invalid months.
    pub fn new(year: i32, month: u32) -> ModelResult<Self> {
        if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ModelError::MalformedMonth(format!("{year}-{month}")));
        }
        Ok(Self { year, month })
    }

    /// Signed number of months from `self` to `later`.
    ///
    /// Positive when `later` is after `self`. Order of the inputs in a series
    /// does not matter; unsorted or gapped months simply produce larger or
    /// negative distances.
    pub fn months_until(&self, later: &YearMonth) -> i32 {
        (later.year - self.year) * 12 + (later.month as i32 - self.month as i32)
    }
}

impl FromStr for YearMonth {
    type Err = ModelError;

    /// Accepts `"YYYY-MM"`; trailing components such as a day (`"YYYY-MM-DD"`)
    /// are ignored.
    fn from_str(s: &str) -> ModelResult<Self> {
        let malformed = || ModelError::MalformedMonth(s.to_string());
        let mut parts = s.trim().split('-');
        let year = parts
            .next()
            .and_then(|y| y.parse::<i32>().ok())
            .ok_or_else(malformed)?;
        let month = parts
            .next()
            .and_then(|m| m.parse::<u32>().ok())
            .ok_or_else(malformed)?;
        YearMonth::new(year, month).map_err(|_| malformed())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Month distance between two month strings, `None` if either is malformed.
pub fn month_distance(earlier: &str, later: &str) -> Option<i32> {
    let a = earlier.parse::<YearMonth>().ok()?;
    let b = later.parse::<YearMonth>().ok()?;
    Some(a.months_until(&b))
}
