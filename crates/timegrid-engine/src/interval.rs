//! Half-open time intervals and the overlap predicate.
//!
//! Every conflict decision in the engine goes through [`overlaps`]:
//! `[a.start, a.end)` and `[b.start, b.end)` intersect iff
//! `a.start < b.end && b.start < a.end`. Back-to-back bookings therefore do
//! not conflict, and a zero-length interval only overlaps intervals that
//! strictly contain its instant.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` span of local wall-clock time.
///
/// Construction through [`Interval::new`] guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    /// Build an interval, collapsing `end < start` to a zero-length interval
    /// at `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// A zero-length interval at `instant`.
    pub fn instant(instant: NaiveDateTime) -> Self {
        Self {
            start: instant,
            end: instant,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self, other)
    }

    /// Whether `instant` lies in `[start, end)`.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 60.0
    }

    /// The non-empty common part of two intervals, if any.
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Interval { start, end })
    }

    /// Length of the common part in minutes (`0.0` when disjoint).
    pub fn intersection_minutes(&self, other: &Interval) -> f64 {
        self.intersection(other)
            .map_or(0.0, |common| common.duration_minutes())
    }

    /// Clamp both endpoints into `bounds`.
    pub fn clamp_to(&self, bounds: &Interval) -> Interval {
        Interval {
            start: self.start.clamp(bounds.start, bounds.end),
            end: self.end.clamp(bounds.start, bounds.end),
        }
    }
}

/// Half-open overlap test.
///
/// ```
/// use chrono::NaiveDate;
/// use timegrid_engine::interval::{overlaps, Interval};
///
/// let day = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
/// let at = |h, m| day.and_hms_opt(h, m, 0).unwrap();
///
/// let first = Interval::new(at(9, 0), at(10, 0));
/// let second = Interval::new(at(10, 0), at(11, 0));
/// assert!(!overlaps(&first, &second)); // touching is not overlapping
/// ```
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && b.start < a.end
}

/// Union of the given intervals as a sorted list of disjoint, non-empty
/// intervals. Touching intervals are coalesced.
pub fn merge_intervals(intervals: impl IntoIterator<Item = Interval>) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.into_iter().filter(|i| !i.is_empty()).collect();
    sorted.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

// ── Day windows ─────────────────────────────────────────────────────────────

/// The rendered part of one calendar day: `[date@start_minute, date@end_minute)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub bounds: Interval,
}

impl DayWindow {
    /// `end_minute` may be 1440 (the following midnight). Offsets past the
    /// last representable datetime saturate to [`NaiveDateTime::MAX`].
    pub fn new(date: NaiveDate, start_minute: u32, end_minute: u32) -> Self {
        let midnight = date.and_time(NaiveTime::MIN);
        let at_minute = |minute: u32| {
            midnight
                .checked_add_signed(chrono::Duration::minutes(i64::from(minute)))
                .unwrap_or(NaiveDateTime::MAX)
        };
        let start = at_minute(start_minute);
        let end = at_minute(end_minute);
        Self {
            date,
            bounds: Interval::new(start, end),
        }
    }

    /// The whole calendar day.
    pub fn full_day(date: NaiveDate) -> Self {
        Self::new(date, 0, 24 * 60)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.bounds.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.bounds.end
    }

    /// Whether any part of `interval` is rendered in this window.
    ///
    /// A zero-length interval is visible when its instant lies in the window.
    pub fn intersects(&self, interval: &Interval) -> bool {
        if interval.is_empty() {
            self.bounds.contains(interval.start)
        } else {
            overlaps(&self.bounds, interval)
        }
    }

    /// Minutes from the window start to `instant`, clamped into the window.
    pub fn offset_minutes(&self, instant: NaiveDateTime) -> f64 {
        let clamped = instant.clamp(self.bounds.start, self.bounds.end);
        (clamped - self.bounds.start).num_seconds() as f64 / 60.0
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
