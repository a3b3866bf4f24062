//! Open time windows for correction rules

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Formats accepted for catalog times, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid time '{value}': expected 'YYYY-MM-DD HH:MM' (UTC), 'YYYY-MM-DD' or RFC 3339")]
pub struct TimeParseError {
    pub value: String,
}

/// Parse a catalog time string.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]` and bare dates (both UTC), or a full
/// RFC 3339 timestamp with offset.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimeParseError {
            value: value.to_string(),
        })
}

/// One end of a time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bound {
    At(DateTime<Utc>),
    #[default]
    Unbounded,
}

impl Bound {
    /// Parse an optional catalog time; `None` means unbounded.
    pub fn parse(value: Option<&str>) -> Result<Self, TimeParseError> {
        match value {
            Some(v) => parse_time(v).map(Bound::At),
            None => Ok(Bound::Unbounded),
        }
    }
}

impl From<DateTime<Utc>> for Bound {
    fn from(t: DateTime<Utc>) -> Self {
        Bound::At(t)
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::At(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M")),
            Self::Unbounded => f.write_str("*"),
        }
    }
}

/// Open interval `(start, end)` in which a rule applies.
///
/// An unbounded start matches from the beginning of time. An unbounded end
/// is resolved to the evaluation instant each time the window is checked,
/// so matching for such rules moves forward with the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    pub start: Bound,
    pub end: Bound,
}

impl TimeWindow {
    pub fn new(start: impl Into<Bound>, end: impl Into<Bound>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Window with no start and an end that tracks the evaluation instant.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, TimeParseError> {
        Ok(Self {
            start: Bound::parse(start)?,
            end: Bound::parse(end)?,
        })
    }

    /// Strict containment: `start < time < end`, where an unbounded end is
    /// `now`.
    pub fn contains(&self, time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.contains_with(time, || now)
    }

    /// Like [`contains`](Self::contains), but `now` is only called when the
    /// end is unbounded and the start test has already passed.
    pub fn contains_with<F>(&self, time: DateTime<Utc>, now: F) -> bool
    where
        F: FnOnce() -> DateTime<Utc>,
    {
        let after_start = match self.start {
            Bound::At(start) => start < time,
            Bound::Unbounded => true,
        };
        if !after_start {
            return false;
        }
        match self.end {
            Bound::At(end) => time < end,
            Bound::Unbounded => time < now(),
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}
