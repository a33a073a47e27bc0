//! Grid and heatmap configuration.
//!
//! Both structs deserialize with `#[serde(default)]`, so a configuration file
//! only needs the keys it overrides. Call `validate()` before handing a
//! hand-edited configuration to the engine.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::heatmap::HeatmapPalette;
use crate::interval::DayWindow;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Longest accepted heatmap lookback, roughly ten years of days.
pub const MAX_LOOKBACK_DAYS: u32 = 3660;

// ── Configurable week start ─────────────────────────────────────────────────

/// Which weekday gets index 0 in heatmap rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartDay {
    /// ISO 8601 standard (Monday = 0).
    #[default]
    Monday,
    /// US/Canada convention (Sunday = 0).
    Sunday,
}

/// Row index (0..=6) of `weekday` for the given week start.
pub fn weekday_index(weekday: Weekday, week_start: WeekStartDay) -> u8 {
    let days = match week_start {
        WeekStartDay::Monday => weekday.num_days_from_monday(),
        WeekStartDay::Sunday => weekday.num_days_from_sunday(),
    };
    days as u8
}

// ── GridConfig ──────────────────────────────────────────────────────────────

/// Pixel geometry of a day or week grid.
///
/// `total_width_px` is shared by `total_columns` equal day columns: 1 for a
/// day view, 7 for a week view. Events conflicting within one day split that
/// day's column further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub total_columns: u32,
    pub total_width_px: f64,
    /// First rendered minute of the day (0 = midnight).
    pub day_start_minute: u32,
    /// End of the rendered day, exclusive (1440 = next midnight).
    pub day_end_minute: u32,
    pub px_per_minute: f64,
    pub right_gap_px: f64,
    pub bottom_gap_px: f64,
    /// Floor applied to event height so very short events stay tappable.
    pub min_height_px: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            total_columns: 1,
            total_width_px: 360.0,
            day_start_minute: 0,
            day_end_minute: MINUTES_PER_DAY,
            px_per_minute: 1.0,
            right_gap_px: 2.0,
            bottom_gap_px: 2.0,
            min_height_px: 16.0,
        }
    }
}

impl GridConfig {
    /// Check the configuration for values that would make geometry meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.total_columns == 0 {
            return Err(EngineError::InvalidConfig(
                "total_columns must be at least 1".to_string(),
            ));
        }
        if self.day_end_minute > MINUTES_PER_DAY {
            return Err(EngineError::InvalidConfig(format!(
                "day_end_minute must be at most {MINUTES_PER_DAY}, got {}",
                self.day_end_minute
            )));
        }
        if self.day_start_minute >= self.day_end_minute {
            return Err(EngineError::InvalidConfig(format!(
                "day_start_minute ({}) must be before day_end_minute ({})",
                self.day_start_minute, self.day_end_minute
            )));
        }
        if !(self.px_per_minute.is_finite() && self.px_per_minute > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "px_per_minute must be a positive number, got {}",
                self.px_per_minute
            )));
        }
        for (name, value) in [
            ("total_width_px", self.total_width_px),
            ("right_gap_px", self.right_gap_px),
            ("bottom_gap_px", self.bottom_gap_px),
            ("min_height_px", self.min_height_px),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Width of one day column. A zero column count is treated as one.
    pub fn column_width_px(&self) -> f64 {
        self.total_width_px / f64::from(self.total_columns.max(1))
    }

    /// Height of the whole rendered day.
    pub fn day_height_px(&self) -> f64 {
        f64::from(self.day_end_minute.saturating_sub(self.day_start_minute)) * self.px_per_minute
    }

    /// The rendered window of `date`.
    pub fn window_for(&self, date: NaiveDate) -> DayWindow {
        let end = self.day_end_minute.min(MINUTES_PER_DAY);
        DayWindow::new(date, self.day_start_minute.min(end), end)
    }
}

// ── HeatmapConfig ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Number of calendar days, ending at the reference date, to sample.
    pub lookback_days: u32,
    pub week_start: WeekStartDay,
    pub palette: HeatmapPalette,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            lookback_days: 28,
            week_start: WeekStartDay::Monday,
            palette: HeatmapPalette::default(),
        }
    }
}

impl HeatmapConfig {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if `lookback_days` exceeds
    /// [`MAX_LOOKBACK_DAYS`] or the palette is invalid.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(EngineError::InvalidConfig(format!(
                "lookback_days must be at most {MAX_LOOKBACK_DAYS}, got {}",
                self.lookback_days
            )));
        }
        self.palette.validate()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
