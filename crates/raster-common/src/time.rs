//! Month-based time handling for the raster archive.
//!
//! Every raster is addressed by a zero-based month offset (`TimeIndex`) from a
//! configured epoch month. `TimeCodec` converts between the offset and the
//! calendar month used in URLs and summaries.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month. Serialized as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month (1 = January)
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Parse a `YYYY-MM` string (also accepts `YYYY-M`).
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| TimeParseError::InvalidFormat(s.to_string()))?;

        let year: i32 = year
            .parse()
            .map_err(|_| TimeParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| TimeParseError::InvalidFormat(s.to_string()))?;

        if !(1..=12).contains(&month) {
            return Err(TimeParseError::InvalidMonth(month));
        }

        Ok(Self { year, month })
    }

    /// Months since year 0: `year*12 + month-1`.
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    /// Inverse of [`YearMonth::ordinal`].
    pub fn from_ordinal(total: i64) -> Self {
        Self {
            year: total.div_euclid(12) as i32,
            month: total.rem_euclid(12) as u32 + 1,
        }
    }

    /// The month containing the given instant.
    pub fn of(dt: DateTime<Utc>) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
        }
    }

    /// The month before this one.
    pub fn previous(&self) -> Self {
        Self::from_ordinal(self.ordinal() - 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = TimeParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

/// Zero-based month offset from the configured epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeIndex(pub u32);

impl TimeIndex {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Offset this index by `delta` months, returning `None` below zero.
    pub fn offset(&self, delta: i64) -> Option<TimeIndex> {
        let target = self.0 as i64 + delta;
        u32::try_from(target).ok().map(TimeIndex)
    }
}

impl From<u32> for TimeIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for TimeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Converts between time indices and calendar months for a fixed epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCodec {
    epoch: YearMonth,
}

impl Default for TimeCodec {
    fn default() -> Self {
        Self::new(YearMonth::new(2016, 1))
    }
}

impl TimeCodec {
    pub fn new(epoch: YearMonth) -> Self {
        Self { epoch }
    }

    pub fn epoch(&self) -> YearMonth {
        self.epoch
    }

    /// Calendar month for a time index. Indices past the archive end still
    /// compute.
    pub fn to_calendar(&self, index: TimeIndex) -> YearMonth {
        YearMonth::from_ordinal(self.epoch.ordinal() + index.0 as i64)
    }

    /// Signed month offset of `(year, month)` from the epoch. Negative for
    /// months before the epoch.
    pub fn to_index(&self, year: i32, month: u32) -> i64 {
        YearMonth::new(year, month).ordinal() - self.epoch.ordinal()
    }

    /// Time index of a calendar month, if it is not before the epoch.
    pub fn index_of(&self, ym: YearMonth) -> Option<TimeIndex> {
        u32::try_from(self.to_index(ym.year, ym.month))
            .ok()
            .map(TimeIndex)
    }

    /// Number of months from the epoch through `end`, inclusive.
    pub fn months_through(&self, end: YearMonth) -> u32 {
        let span = end.ordinal() - self.epoch.ordinal() + 1;
        span.clamp(0, u32::MAX as i64) as u32
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid month format: {0}. Expected 'YYYY-MM'")]
    InvalidFormat(String),

    #[error("Month out of range: {0}")]
    InvalidMonth(u32),
}
