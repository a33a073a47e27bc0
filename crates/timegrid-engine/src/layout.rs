//! Column assignment and pixel geometry for day and week grids.
//!
//! Within a cluster, events are placed greedily in start order into the
//! leftmost column that holds nothing overlapping them, then each event is
//! widened rightward across the cluster's columns until it reaches one that
//! contains a conflicting event. Geometry is derived from a [`GridConfig`]:
//! vertical position comes from the event's (window-clamped) time, horizontal
//! position from its column and span within the cluster.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cluster::{cluster, visit_order};
use crate::config::GridConfig;
use crate::event::Event;
use crate::interval::Interval;

/// Column and widened span of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub column: usize,
    /// Number of columns the event covers, starting at `column` (at least 1).
    pub span: usize,
}

/// The result of [`assign_columns`], parallel to the input slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnAssignment {
    slots: Vec<Slot>,
    ids: Vec<String>,
    column_count: usize,
}

impl ColumnAssignment {
    /// Number of columns opened for the cluster.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Slot of the event at `index` in the slice given to [`assign_columns`].
    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Column of the last event carrying `event_id`, matching [`Self::to_map`].
    pub fn column_of(&self, event_id: &str) -> Option<usize> {
        self.ids
            .iter()
            .rposition(|id| id == event_id)
            .map(|i| self.slots[i].column)
    }

    /// Column index keyed by event id.
    pub fn to_map(&self) -> BTreeMap<String, usize> {
        self.ids
            .iter()
            .cloned()
            .zip(self.slots.iter().map(|slot| slot.column))
            .collect()
    }
}

/// Assign rendering columns to the events of one cluster.
///
/// Events are processed by start time, ties broken by `id`. An event goes
/// into the first column none of whose members overlaps it; when every
/// column conflicts a new one is opened. Spans are then widened through
/// subsequent conflict-free columns.
///
/// # Examples
///
/// ```
/// use timegrid_engine::{assign_columns, Event};
///
/// let events = vec![
///     Event::parse("a", "2026-03-16T09:00", "2026-03-16T10:30", "").unwrap(),
///     Event::parse("b", "2026-03-16T10:00", "2026-03-16T11:00", "").unwrap(),
///     Event::parse("c", "2026-03-16T10:15", "2026-03-16T10:45", "").unwrap(),
/// ];
/// let columns = assign_columns(&events);
/// assert_eq!(columns.column_count(), 3);
/// assert_eq!(columns.column_of("c"), Some(2));
/// ```
pub fn assign_columns(events: &[Event]) -> ColumnAssignment {
    let intervals: Vec<Interval> = events.iter().map(Event::interval).collect();
    let mut columns: Vec<Vec<usize>> = Vec::new();
    let mut column_of = vec![0usize; events.len()];

    for i in visit_order(events) {
        let current = intervals[i];
        let free = columns
            .iter()
            .position(|members| members.iter().all(|&j| !intervals[j].overlaps(&current)));
        let column = match free {
            Some(column) => column,
            None => {
                columns.push(Vec::new());
                columns.len() - 1
            }
        };
        columns[column].push(i);
        column_of[i] = column;
    }

    let slots = (0..events.len())
        .map(|i| {
            let column = column_of[i];
            let widened = columns[column + 1..]
                .iter()
                .take_while(|members| members.iter().all(|&j| !intervals[j].overlaps(&intervals[i])))
                .count();
            Slot {
                column,
                span: 1 + widened,
            }
        })
        .collect();

    tracing::trace!(
        events = events.len(),
        columns = columns.len(),
        "assigned columns"
    );

    ColumnAssignment {
        slots,
        ids: events.iter().map(|e| e.id.clone()).collect(),
        column_count: columns.len(),
    }
}

// ── Geometry ────────────────────────────────────────────────────────────────

/// Pixel rectangle of one event, relative to the grid's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub event_id: String,
    pub top: f64,
    pub height: f64,
    pub left: f64,
    pub width: f64,
    pub column: usize,
    pub span: usize,
    /// Number of columns in the event's cluster.
    pub columns: usize,
}

/// Compute geometry for one cluster laid out on `date`.
///
/// `assignment` must come from [`assign_columns`] on the same slice. Times
/// outside the grid's day window are clamped for positioning only. Items are
/// returned in start order (ties by `id`).
pub fn layout(
    events: &[Event],
    assignment: &ColumnAssignment,
    grid: &GridConfig,
    date: NaiveDate,
) -> Vec<LayoutItem> {
    let window = grid.window_for(date);
    let column_width = grid.column_width_px();
    let columns = assignment.column_count().max(1);

    visit_order(events)
        .into_iter()
        .filter_map(|i| {
            let slot = assignment.slot(i)?;
            let event = &events[i];
            let clamped = event.interval().clamp_to(&window.bounds);

            let top = window.offset_minutes(clamped.start) * grid.px_per_minute;
            let height = (clamped.duration_minutes() * grid.px_per_minute - grid.bottom_gap_px)
                .max(grid.min_height_px);
            let left = slot.column as f64 * column_width / columns as f64;
            let width = slot.span as f64 * column_width / columns as f64 - grid.right_gap_px;

            Some(LayoutItem {
                event_id: event.id.clone(),
                top: top.max(0.0),
                height: height.max(0.0),
                left: left.max(0.0),
                width: width.max(0.0),
                column: slot.column,
                span: slot.span,
                columns,
            })
        })
        .collect()
}

/// Lay out every event visible on `date` in a single day column.
///
/// Malformed events are treated as zero-length, events entirely outside the
/// grid's day window are dropped, and the rest are clustered and laid out.
/// Items come out cluster by cluster in start order.
pub fn layout_day(events: &[Event], date: NaiveDate, grid: &GridConfig) -> Vec<LayoutItem> {
    let window = grid.window_for(date);
    let visible: Vec<Event> = events
        .iter()
        .map(Event::normalized)
        .filter(|event| {
            let keep = window.intersects(&event.interval());
            if !keep {
                tracing::trace!(event_id = %event.id, %date, "event outside day window");
            }
            keep
        })
        .collect();

    let items: Vec<LayoutItem> = cluster(&visible)
        .iter()
        .flat_map(|group| {
            let assignment = assign_columns(group.events());
            layout(group.events(), &assignment, grid, date)
        })
        .collect();

    tracing::debug!(
        %date,
        supplied = events.len(),
        visible = visible.len(),
        items = items.len(),
        "laid out day"
    );
    items
}

/// One day column of a multi-day grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLayout {
    pub date: NaiveDate,
    pub day_index: usize,
    pub items: Vec<LayoutItem>,
}

/// Lay out several days side by side.
///
/// The day at position `n` of `dates` occupies the `n`th of the grid's
/// `total_columns` day columns, so its items are shifted right by
/// `n * column_width`. Clustering never crosses day boundaries. Dates past
/// the grid's `total_columns` have no column to occupy and are dropped.
pub fn layout_days(events: &[Event], dates: &[NaiveDate], grid: &GridConfig) -> Vec<DayLayout> {
    let column_width = grid.column_width_px();
    let day_columns = grid.total_columns.max(1) as usize;
    if dates.len() > day_columns {
        tracing::warn!(
            dates = dates.len(),
            total_columns = day_columns,
            "more dates than day columns, dropping the excess"
        );
    }
    dates
        .iter()
        .take(day_columns)
        .enumerate()
        .map(|(day_index, &date)| {
            let offset = day_index as f64 * column_width;
            let items = layout_day(events, date, grid)
                .into_iter()
                .map(|mut item| {
                    item.left += offset;
                    item
                })
                .collect();
            DayLayout {
                date,
                day_index,
                items,
            }
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────────────
