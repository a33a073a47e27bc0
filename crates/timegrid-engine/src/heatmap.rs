//! Weekday × hour free/busy heatmap.
//!
//! Each sampled day is cut into hour buckets `[h:00, h+1:00)` for
//! `h in 0..HOUR_BUCKETS`. A bucket's free ratio is the share of the hour not
//! covered by any event. Buckets are pooled by weekday and hour (every
//! Monday 09:00 in the window averages into one cell), and a cell that no
//! sampled day contributed to reports fully free.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::{weekday_index, WeekStartDay};
use crate::error::EngineError;
use crate::event::Event;
use crate::interval::Interval;

/// Hour buckets per day. The last bucket covers 22:00–23:00.
pub const HOUR_BUCKETS: usize = 23;

pub const DAYS_PER_WEEK: usize = 7;

const MINUTES_PER_BUCKET: f64 = 60.0;

/// Aggregated free ratio for one weekday/hour pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    /// Row index 0..=6, numbered from the configured week start.
    pub weekday: u8,
    /// Hour bucket 0..=22.
    pub hour: u8,
    /// Mean free share of the hour, in `[0, 1]`.
    pub free_ratio: f64,
}

/// Aggregate `events` over the `lookback_days` days ending at
/// `reference_date`, with Monday as weekday 0.
///
/// Returns `7 * HOUR_BUCKETS` cells ordered by weekday, then hour.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use timegrid_engine::{aggregate, Event};
///
/// // Monday 2026-03-16, busy for half of the 09:00 hour.
/// let events = vec![Event::parse("standup", "2026-03-16T09:00", "2026-03-16T09:30", "").unwrap()];
/// let reference = NaiveDate::from_ymd_opt(2026, 3, 22).unwrap();
///
/// let cells = aggregate(&events, 7, reference);
/// let monday_nine = cells.iter().find(|c| c.weekday == 0 && c.hour == 9).unwrap();
/// assert_eq!(monday_nine.free_ratio, 0.5);
/// ```
pub fn aggregate(events: &[Event], lookback_days: u32, reference_date: NaiveDate) -> Vec<HeatmapCell> {
    aggregate_with_options(events, lookback_days, reference_date, WeekStartDay::Monday)
}

/// [`aggregate`] with a configurable first weekday.
pub fn aggregate_with_options(
    events: &[Event],
    lookback_days: u32,
    reference_date: NaiveDate,
    week_start: WeekStartDay,
) -> Vec<HeatmapCell> {
    let intervals: Vec<Interval> = events
        .iter()
        .map(Event::interval)
        .filter(|interval| !interval.is_empty())
        .collect();

    let mut sums = [[0.0f64; HOUR_BUCKETS]; DAYS_PER_WEEK];
    let mut samples = [0u32; DAYS_PER_WEEK];

    for offset in 0..lookback_days {
        let Some(day) = reference_date.checked_sub_days(Days::new(u64::from(offset))) else {
            break;
        };
        let row = usize::from(weekday_index(day.weekday(), week_start));
        let free = day_free_ratios(&intervals, day);
        for (sum, ratio) in sums[row].iter_mut().zip(free) {
            *sum += ratio;
        }
        samples[row] += 1;
    }

    tracing::debug!(
        events = events.len(),
        lookback_days,
        %reference_date,
        "aggregated heatmap"
    );

    (0..DAYS_PER_WEEK)
        .flat_map(|row| {
            let sampled = samples[row];
            let sums = sums[row];
            (0..HOUR_BUCKETS).map(move |hour| HeatmapCell {
                weekday: row as u8,
                hour: hour as u8,
                free_ratio: if sampled == 0 {
                    1.0
                } else {
                    (sums[hour] / f64::from(sampled)).clamp(0.0, 1.0)
                },
            })
        })
        .collect()
}

/// Free ratio of every hour bucket of `day`.
fn day_free_ratios(intervals: &[Interval], day: NaiveDate) -> [f64; HOUR_BUCKETS] {
    let midnight = day.and_time(NaiveTime::MIN);
    let bucket_of = |hour: usize| {
        let start = midnight + chrono::Duration::hours(hour as i64);
        Interval::new(start, start + chrono::Duration::hours(1))
    };

    let mut ratios = [1.0; HOUR_BUCKETS];
    for (hour, ratio) in ratios.iter_mut().enumerate() {
        let bucket = bucket_of(hour);
        // Overlapping events each contribute their own minutes.
        let busy_minutes: f64 = intervals.iter().map(|i| i.intersection_minutes(&bucket)).sum();
        *ratio = free_ratio(busy_minutes);
    }
    ratios
}

/// `clamp(1 - busy/60, 0, 1)`.
pub fn free_ratio(busy_minutes: f64) -> f64 {
    (1.0 - busy_minutes / MINUTES_PER_BUCKET).clamp(0.0, 1.0)
}

// ── HeatmapMatrix ───────────────────────────────────────────────────────────

/// Indexed view over the cells returned by [`aggregate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapMatrix {
    cells: Vec<HeatmapCell>,
}

impl HeatmapMatrix {
    pub fn cell(&self, weekday: u8, hour: u8) -> Option<&HeatmapCell> {
        let (weekday, hour) = (usize::from(weekday), usize::from(hour));
        if weekday >= DAYS_PER_WEEK || hour >= HOUR_BUCKETS {
            return None;
        }
        self.cells.get(weekday * HOUR_BUCKETS + hour)
    }

    /// The cell with the lowest free ratio; the earliest one wins ties.
    pub fn busiest(&self) -> Option<&HeatmapCell> {
        self.cells.iter().reduce(|best, cell| {
            if cell.free_ratio < best.free_ratio {
                cell
            } else {
                best
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeatmapCell> {
        self.cells.iter()
    }

    pub fn into_cells(self) -> Vec<HeatmapCell> {
        self.cells
    }
}

pub fn aggregate_matrix(
    events: &[Event],
    lookback_days: u32,
    reference_date: NaiveDate,
    week_start: WeekStartDay,
) -> HeatmapMatrix {
    HeatmapMatrix {
        cells: aggregate_with_options(events, lookback_days, reference_date, week_start),
    }
}

// ── Color mapping ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f64,
}

impl Rgba {
    /// CSS `rgba()` notation, alpha rounded to three decimals.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
    }
}

/// Base color and alpha range for heatmap cells.
///
/// A fully free cell gets `min_alpha`, a fully busy one `max_alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapPalette {
    pub base: [u8; 3],
    pub min_alpha: f64,
    pub max_alpha: f64,
}

impl Default for HeatmapPalette {
    fn default() -> Self {
        Self {
            base: [47, 128, 237],
            min_alpha: 0.1,
            max_alpha: 1.0,
        }
    }
}

impl HeatmapPalette {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] unless
    /// `0 <= min_alpha <= max_alpha <= 1`.
    pub fn validate(&self) -> Result<(), EngineError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !(in_unit(self.min_alpha) && in_unit(self.max_alpha)) {
            return Err(EngineError::InvalidConfig(format!(
                "palette alphas must be within [0, 1], got {}..{}",
                self.min_alpha, self.max_alpha
            )));
        }
        if self.min_alpha > self.max_alpha {
            return Err(EngineError::InvalidConfig(format!(
                "palette min_alpha ({}) exceeds max_alpha ({})",
                self.min_alpha, self.max_alpha
            )));
        }
        Ok(())
    }

    /// Color for a free ratio. Out-of-range ratios are clamped; NaN counts
    /// as fully free.
    pub fn color_for(&self, free_ratio: f64) -> Rgba {
        let ratio = if free_ratio.is_nan() {
            1.0
        } else {
            free_ratio.clamp(0.0, 1.0)
        };
        let [r, g, b] = self.base;
        Rgba {
            r,
            g,
            b,
            a: self.min_alpha * ratio + self.max_alpha * (1.0 - ratio),
        }
    }
}

/// [`HeatmapPalette::color_for`] with the default palette.
pub fn heatmap_color(free_ratio: f64) -> Rgba {
    HeatmapPalette::default().color_for(free_ratio)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ev(id: &str, day: NaiveDate, start: (u32, u32), end: (u32, u32)) -> Event {
        Event::new(
            id,
            day.and_hms_opt(start.0, start.1, 0).unwrap(),
            day.and_hms_opt(end.0, end.1, 0).unwrap(),
            "",
        )
    }

    fn ratio(cells: &[HeatmapCell], weekday: u8, hour: u8) -> f64 {
        cells
            .iter()
            .find(|c| c.weekday == weekday && c.hour == hour)
            .unwrap()
            .free_ratio
    }

    // 2026-03-16 is a Monday.
    fn monday() -> NaiveDate {
        date(2026, 3, 16)
    }

    // ── aggregate ───────────────────────────────────────────────────────

    #[test]
    fn test_cell_count_and_order() {
        let cells = aggregate(&[], 7, monday());
        assert_eq!(cells.len(), DAYS_PER_WEEK * HOUR_BUCKETS);
        assert_eq!((cells[0].weekday, cells[0].hour), (0, 0));
        assert_eq!((cells[22].weekday, cells[22].hour), (0, 22));
        assert_eq!((cells[23].weekday, cells[23].hour), (1, 0));
    }

    #[test]
    fn test_empty_events_all_free() {
        let cells = aggregate(&[], 28, monday());
        assert!(cells.iter().all(|c| c.free_ratio == 1.0));
    }

    #[test]
    fn test_zero_lookback_all_free() {
        let events = vec![ev("a", monday(), (9, 0), (10, 0))];
        let cells = aggregate(&events, 0, monday());
        assert!(cells.iter().all(|c| c.free_ratio == 1.0));
    }

    #[test]
    fn test_weekly_half_hour_event() {
        let sunday = date(2026, 3, 22);
        let events = vec![ev("standup", monday(), (9, 0), (9, 30))];
        let cells = aggregate(&events, 7, sunday);
        assert_eq!(ratio(&cells, 0, 9), 0.5);
        let others = cells
            .iter()
            .filter(|c| !(c.weekday == 0 && c.hour == 9))
            .all(|c| c.free_ratio == 1.0);
        assert!(others);
    }

    #[test]
    fn test_pooled_days_are_averaged() {
        // Two Mondays sampled, busy for the whole 10:00 hour on one of them.
        let reference = date(2026, 3, 23);
        let events = vec![ev("a", monday(), (10, 0), (11, 0))];
        let cells = aggregate(&events, 14, reference);
        assert_eq!(ratio(&cells, 0, 10), 0.5);
    }

    #[test]
    fn test_events_outside_lookback_are_ignored() {
        let events = vec![ev("old", date(2026, 3, 2), (9, 0), (10, 0))];
        let cells = aggregate(&events, 7, date(2026, 3, 22));
        assert_eq!(ratio(&cells, 0, 9), 1.0);
    }

    #[test]
    fn test_event_spanning_buckets() {
        let events = vec![ev("long", monday(), (9, 30), (11, 15))];
        let cells = aggregate(&events, 1, monday());
        assert_eq!(ratio(&cells, 0, 9), 0.5);
        assert_eq!(ratio(&cells, 0, 10), 0.0);
        assert_eq!(ratio(&cells, 0, 11), 0.75);
    }

    #[test]
    fn test_double_booking_sums_minutes() {
        let events = vec![
            ev("a", monday(), (9, 0), (9, 30)),
            ev("b", monday(), (9, 0), (9, 30)),
        ];
        let cells = aggregate(&events, 1, monday());
        assert_eq!(ratio(&cells, 0, 9), 0.0);
    }

    #[test]
    fn test_overbooked_hour_clamps_to_zero() {
        let events = vec![
            ev("a", monday(), (14, 0), (15, 0)),
            ev("b", monday(), (14, 15), (14, 45)),
            ev("c", monday(), (15, 0), (15, 20)),
        ];
        let cells = aggregate(&events, 1, monday());
        assert_eq!(ratio(&cells, 0, 14), 0.0);
        assert_eq!(ratio(&cells, 0, 15), 1.0 - 20.0 / 60.0);
    }

    #[test]
    fn test_overnight_event_counts_on_both_days() {
        let tuesday = monday().succ_opt().unwrap();
        let overnight = Event::new(
            "overnight",
            monday().and_hms_opt(22, 0, 0).unwrap(),
            tuesday.and_hms_opt(1, 0, 0).unwrap(),
            "",
        );
        let cells = aggregate(&[overnight], 2, tuesday);
        assert_eq!(ratio(&cells, 0, 22), 0.0);
        assert_eq!(ratio(&cells, 1, 0), 0.0);
        assert_eq!(ratio(&cells, 1, 1), 1.0);
    }

    #[test]
    fn test_malformed_and_zero_length_events_are_free() {
        let events = vec![
            ev("bad", monday(), (10, 0), (9, 0)),
            ev("point", monday(), (11, 0), (11, 0)),
        ];
        let cells = aggregate(&events, 1, monday());
        assert!(cells.iter().all(|c| c.free_ratio == 1.0));
    }

    #[test]
    fn test_sunday_week_start() {
        let events = vec![ev("a", monday(), (9, 0), (10, 0))];
        let cells = aggregate_with_options(&events, 7, monday(), WeekStartDay::Sunday);
        // Monday is row 1 when weeks start on Sunday.
        assert_eq!(ratio(&cells, 1, 9), 0.0);
        assert_eq!(ratio(&cells, 0, 9), 1.0);
    }

    #[test]
    fn test_free_ratio_clamps() {
        assert_eq!(free_ratio(0.0), 1.0);
        assert_eq!(free_ratio(30.0), 0.5);
        assert_eq!(free_ratio(90.0), 0.0);
        assert_eq!(free_ratio(-10.0), 1.0);
    }

    // ── HeatmapMatrix ───────────────────────────────────────────────────

    #[test]
    fn test_matrix_lookup_and_busiest() {
        let events = vec![
            ev("a", monday(), (14, 0), (15, 0)),
            ev("b", monday(), (9, 0), (9, 30)),
        ];
        let matrix = aggregate_matrix(&events, 1, monday(), WeekStartDay::Monday);
        assert_eq!(matrix.cell(0, 14).unwrap().free_ratio, 0.0);
        assert!(matrix.cell(7, 0).is_none());
        assert!(matrix.cell(0, 23).is_none());
        let busiest = matrix.busiest().unwrap();
        assert_eq!((busiest.weekday, busiest.hour), (0, 14));
        assert_eq!(matrix.iter().count(), DAYS_PER_WEEK * HOUR_BUCKETS);
    }

    // ── Color mapping ───────────────────────────────────────────────────

    #[test]
    fn test_color_endpoints() {
        let palette = HeatmapPalette::default();
        assert_eq!(palette.color_for(1.0).a, palette.min_alpha);
        assert_eq!(palette.color_for(0.0).a, 1.0);
        let mid = palette.color_for(0.5).a;
        assert!((mid - 0.55).abs() < 1e-12, "got: {mid}");
    }

    #[test]
    fn test_color_uses_base_rgb() {
        let palette = HeatmapPalette {
            base: [255, 0, 10],
            min_alpha: 0.0,
            max_alpha: 0.8,
        };
        let color = palette.color_for(0.25);
        assert_eq!((color.r, color.g, color.b), (255, 0, 10));
        assert!((color.a - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_color_out_of_range_and_nan() {
        let palette = HeatmapPalette::default();
        assert_eq!(palette.color_for(2.0), palette.color_for(1.0));
        assert_eq!(palette.color_for(-1.0), palette.color_for(0.0));
        assert_eq!(palette.color_for(f64::NAN), palette.color_for(1.0));
    }

    #[test]
    fn test_css_format() {
        assert_eq!(heatmap_color(0.0).to_css(), "rgba(47, 128, 237, 1.000)");
    }

    #[test]
    fn test_palette_validation() {
        assert!(HeatmapPalette::default().validate().is_ok());
        let inverted = HeatmapPalette {
            min_alpha: 0.9,
            max_alpha: 0.2,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
        let out_of_range = HeatmapPalette {
            max_alpha: 1.5,
            ..Default::default()
        };
        assert!(out_of_range.validate().is_err());
    }
}
