//! Calendar events as consumed by the engine.
//!
//! Events arrive already resolved to local wall-clock time, so instants are
//! [`NaiveDateTime`]. An event whose end precedes its start is kept and
//! treated as zero-length at its start rather than rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::interval::Interval;

/// A time-bounded calendar record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub owner_id: String,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            owner_id: owner_id.into(),
        }
    }

    /// Build an event from datetime strings (see [`parse_datetime`]).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDatetime`] if either bound cannot be parsed.
    pub fn parse(
        id: impl Into<String>,
        start: &str,
        end: &str,
        owner_id: impl Into<String>,
    ) -> Result<Self, EngineError> {
        Ok(Self::new(
            id,
            parse_datetime(start)?,
            parse_datetime(end)?,
            owner_id,
        ))
    }

    pub fn is_malformed(&self) -> bool {
        self.end < self.start
    }

    /// A copy with a malformed end collapsed onto the start.
    pub fn normalized(&self) -> Event {
        let mut event = self.clone();
        if event.is_malformed() {
            tracing::debug!(event_id = %event.id, "normalizing event with end before start");
            event.end = event.start;
        }
        event
    }

    /// The event's span, normalized.
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    pub fn duration_minutes(&self) -> f64 {
        self.interval().duration_minutes()
    }

    pub fn overlaps(&self, other: &Event) -> bool {
        self.interval().overlaps(&other.interval())
    }
}

// ── Parsing ─────────────────────────────────────────────────────────────────

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a local datetime.
///
/// Accepts RFC 3339 (the offset is dropped and the wall-clock time kept, since
/// events are already localized) or an ISO 8601 local datetime with `T` or a
/// space separator and optional seconds.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDatetime`] if no format matches.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, EngineError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .ok_or_else(|| EngineError::InvalidDatetime(format!("'{s}'")))
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns [`EngineError::InvalidDate`] if the string is not a valid date.
pub fn parse_date(s: &str) -> Result<NaiveDate, EngineError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| EngineError::InvalidDate(format!("'{}': {}", s, e)))
}

// ── Tests ───────────────────────────────────────────────────────────────────
