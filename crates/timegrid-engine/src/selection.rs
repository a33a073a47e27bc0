//! Day-cell highlighting for single-date and date-range selection.
//!
//! The calendar UI owns a [`SelectionState`] and passes a snapshot into
//! [`classify`] for every rendered day. A range is active only when both
//! bounds are set and differ. Interior days of an active range are
//! highlighted on business days only, unless the later bound falls on a
//! weekend, in which case every interior day is highlighted.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Snapshot of the calendar's selection.
///
/// `range_end` is ignored while `range_start` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionState {
    pub today: NaiveDate,
    pub selected: NaiveDate,
    #[serde(default)]
    pub range_start: Option<NaiveDate>,
    #[serde(default)]
    pub range_end: Option<NaiveDate>,
}

impl SelectionState {
    /// Single-day selection with no range.
    pub fn new(today: NaiveDate, selected: NaiveDate) -> Self {
        Self {
            today,
            selected,
            range_start: None,
            range_end: None,
        }
    }

    /// The end bound, if a start bound makes it meaningful.
    pub fn effective_range_end(&self) -> Option<NaiveDate> {
        self.range_start.and(self.range_end)
    }

    /// `(lo, hi)` of the active range, or `None` when either bound is
    /// missing or both are the same day.
    pub fn active_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.range_start, self.effective_range_end()) {
            (Some(start), Some(end)) if start != end => Some((start.min(end), start.max(end))),
            _ => None,
        }
    }

    /// Long-press: start a new range at `date`.
    pub fn begin_range(self, date: NaiveDate) -> Self {
        Self {
            range_start: Some(date),
            range_end: None,
            ..self
        }
    }

    /// Tap on `date`.
    ///
    /// With a range started, tapping its start collapses back to a single-day
    /// selection of that date; tapping any other date sets it as the range
    /// end and selects it. Without a range the date simply becomes selected.
    pub fn tap(self, date: NaiveDate) -> Self {
        match self.range_start {
            Some(start) if start == date => Self {
                selected: date,
                range_start: None,
                range_end: None,
                ..self
            },
            Some(_) => Self {
                selected: date,
                range_end: Some(date),
                ..self
            },
            None => Self {
                selected: date,
                range_end: None,
                ..self
            },
        }
    }
}

/// Highlight flags for one day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayHighlight {
    pub is_today: bool,
    pub is_selected: bool,
    pub is_range_start: bool,
    pub is_range_end: bool,
    pub is_in_range: bool,
}

/// The single color token a day cell should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    None,
    Today,
    Selected,
    InRange,
    RangeEndpoint,
}

impl DayHighlight {
    /// Collapse the flags, range endpoints taking precedence over range
    /// interior, then single selection, then today.
    pub fn kind(&self) -> HighlightKind {
        if self.is_range_start || self.is_range_end {
            HighlightKind::RangeEndpoint
        } else if self.is_in_range {
            HighlightKind::InRange
        } else if self.is_selected {
            HighlightKind::Selected
        } else if self.is_today {
            HighlightKind::Today
        } else {
            HighlightKind::None
        }
    }
}

/// Classify `date` against a selection snapshot.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use timegrid_engine::{classify, SelectionState};
///
/// let d = |day| NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
/// // Thursday 12th to Tuesday 17th: the weekend in between is skipped.
/// let state = SelectionState {
///     today: d(10),
///     selected: d(17),
///     range_start: Some(d(12)),
///     range_end: Some(d(17)),
/// };
/// assert!(classify(d(13), &state).is_in_range);
/// assert!(!classify(d(14), &state).is_in_range);
/// assert!(classify(d(17), &state).is_range_end);
/// ```
pub fn classify(date: NaiveDate, state: &SelectionState) -> DayHighlight {
    DayHighlight {
        is_today: date == state.today,
        is_selected: date == state.selected && state.range_start.is_none(),
        is_range_start: state.range_start == Some(date),
        is_range_end: state.effective_range_end() == Some(date),
        is_in_range: is_in_range(date, state),
    }
}

fn is_in_range(date: NaiveDate, state: &SelectionState) -> bool {
    let Some((lo, hi)) = state.active_range() else {
        return false;
    };
    if date < lo || date > hi {
        return false;
    }
    if date == lo || date == hi {
        return true;
    }
    is_weekend(hi) || !is_weekend(date)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ── Tests ───────────────────────────────────────────────────────────────────
