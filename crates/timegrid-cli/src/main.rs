//! `timegrid`: calendar grid layout, free/busy heatmaps, and range
//! highlighting from the command line.
//!
//! Events are read as a JSON array of `{ id, start, end, owner_id }` records
//! from a file or stdin; results are written to stdout as JSON. Logs go to
//! stderr.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use timegrid_engine::{
    aggregate_with_options, classify, layout_days, parse_date, DayHighlight, GridConfig,
    HeatmapCell, HeatmapConfig, HighlightKind, SelectionState,
};
use tracing_subscriber::EnvFilter;

mod input;

/// Calendar time-interval engine
#[derive(Parser, Debug)]
#[command(name = "timegrid")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log engine decisions to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lay out events as pixel rectangles for one or more day columns
    Layout {
        /// Events JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        events: String,
        /// First day to lay out (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Number of consecutive days
        #[arg(long, default_value_t = 1)]
        days: u32,
        /// Grid configuration JSON file
        #[arg(short, long)]
        grid: Option<PathBuf>,
    },
    /// Aggregate past events into a weekday × hour free/busy heatmap
    Heatmap {
        /// Events JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        events: String,
        /// Last sampled day (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date_arg)]
        reference: NaiveDate,
        /// Days to sample, overriding the config file
        #[arg(short, long)]
        lookback: Option<u32>,
        /// Heatmap configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Include a CSS color for every cell
        #[arg(long)]
        colors: bool,
    },
    /// Classify dates against a selection state
    Classify {
        /// Current day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        today: NaiveDate,
        /// Selected day, defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        selected: Option<NaiveDate>,
        /// Range start
        #[arg(long, value_parser = parse_date_arg)]
        range_start: Option<NaiveDate>,
        /// Range end
        #[arg(long, value_parser = parse_date_arg)]
        range_end: Option<NaiveDate>,
        /// Dates to classify
        #[arg(required = true, value_parser = parse_date_arg)]
        dates: Vec<NaiveDate>,
    },
}

#[derive(Serialize)]
struct HeatmapRow {
    #[serde(flatten)]
    cell: HeatmapCell,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

#[derive(Serialize)]
struct ClassifiedDay {
    date: NaiveDate,
    kind: HighlightKind,
    #[serde(flatten)]
    highlight: DayHighlight,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Layout {
            events,
            date,
            days,
            grid,
        } => {
            let grid = match grid {
                Some(path) => input::load_config::<GridConfig>(Some(path.as_path()))?,
                None => GridConfig {
                    total_columns: days.max(1),
                    ..GridConfig::default()
                },
            };
            grid.validate().context("Invalid grid configuration")?;
            if days > grid.total_columns {
                bail!(
                    "--days {days} exceeds the grid's {} day column(s); raise total_columns",
                    grid.total_columns
                );
            }

            let events = input::load_events(&events)?;
            let dates: Vec<NaiveDate> = date.iter_days().take(days.max(1) as usize).collect();
            print_json(&layout_days(&events, &dates, &grid), cli.pretty)
        }
        Command::Heatmap {
            events,
            reference,
            lookback,
            config,
            colors,
        } => {
            let mut config: HeatmapConfig = input::load_config(config.as_deref())?;
            if let Some(days) = lookback {
                config.lookback_days = days;
            }
            config.validate().context("Invalid heatmap configuration")?;

            let events = input::load_events(&events)?;
            let rows: Vec<HeatmapRow> =
                aggregate_with_options(&events, config.lookback_days, reference, config.week_start)
                    .into_iter()
                    .map(|cell| HeatmapRow {
                        color: colors.then(|| config.palette.color_for(cell.free_ratio).to_css()),
                        cell,
                    })
                    .collect();
            print_json(&rows, cli.pretty)
        }
        Command::Classify {
            today,
            selected,
            range_start,
            range_end,
            dates,
        } => {
            let state = SelectionState {
                today,
                selected: selected.unwrap_or(today),
                range_start,
                range_end,
            };
            let days: Vec<ClassifiedDay> = dates
                .into_iter()
                .map(|date| {
                    let highlight = classify(date, &state);
                    ClassifiedDay {
                        date,
                        kind: highlight.kind(),
                        highlight,
                    }
                })
                .collect();
            print_json(&days, cli.pretty)
        }
    }
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}
