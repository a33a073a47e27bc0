//! # timegrid-engine
//!
//! Deterministic calendar grid computation.
//!
//! Given an already-localized list of events for a bounded window, the engine
//! decides which events conflict, lays conflicting events out side by side in
//! a day or week grid, summarizes historical density as a weekday × hour
//! free/busy heatmap, and classifies day cells against a date-range
//! selection. Every function is pure and synchronous: inputs in, derived
//! values out, with no shared state.
//!
//! ## Modules
//!
//! - [`interval`]: Half-open intervals, the overlap predicate, day windows
//! - [`event`]: Event records and datetime parsing
//! - [`cluster`](mod@cluster): Group events into transitive conflict clusters
//! - [`layout`](mod@layout): Column assignment, widening, and pixel geometry
//! - [`heatmap`]: Weekday × hour free ratios and color mapping
//! - [`selection`]: Single-day and range highlighting
//! - [`config`]: Grid and heatmap configuration
//! - [`error`]: Error types

pub mod cluster;
pub mod config;
pub mod error;
pub mod event;
pub mod heatmap;
pub mod interval;
pub mod layout;
pub mod selection;

pub use cluster::{cluster, Cluster};
pub use config::{weekday_index, GridConfig, HeatmapConfig, WeekStartDay, MAX_LOOKBACK_DAYS};
pub use error::EngineError;
pub use event::{parse_date, parse_datetime, Event};
pub use heatmap::{
    aggregate, aggregate_matrix, aggregate_with_options, heatmap_color, HeatmapCell,
    HeatmapMatrix, HeatmapPalette, Rgba,
};
pub use interval::{merge_intervals, overlaps, DayWindow, Interval};
pub use layout::{
    assign_columns, layout, layout_day, layout_days, ColumnAssignment, DayLayout, LayoutItem,
    Slot,
};
pub use selection::{classify, DayHighlight, HighlightKind, SelectionState};
