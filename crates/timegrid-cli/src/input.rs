//! Reading events and configuration files.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use timegrid_engine::Event;

/// Event as it appears in an input file: datetimes are strings so both RFC
/// 3339 and plain local timestamps are accepted.
#[derive(Debug, Deserialize)]
struct EventRecord {
    id: String,
    start: String,
    end: String,
    #[serde(default)]
    owner_id: String,
}

/// Read `path` (or stdin for `-`) to a string.
pub fn read_source(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read '{path}'"))
    }
}

/// Parse a JSON array of event records.
pub fn parse_events(json: &str) -> Result<Vec<Event>> {
    let records: Vec<EventRecord> =
        serde_json::from_str(json).context("Failed to parse events JSON")?;
    records
        .into_iter()
        .map(|r| {
            Event::parse(&r.id, &r.start, &r.end, r.owner_id)
                .with_context(|| format!("Invalid event '{}'", r.id))
        })
        .collect()
}

pub fn load_events(path: &str) -> Result<Vec<Event>> {
    let events = parse_events(&read_source(path)?)?;
    tracing::debug!(count = events.len(), source = path, "loaded events");
    Ok(events)
}

/// Load a JSON config file, or the default when no path is given.
pub fn load_config<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config '{}'", path.display()))
        }
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events_mixed_formats() {
        let events = parse_events(
            r#"[
                {"id": "a", "start": "2026-03-16T09:00:00Z", "end": "2026-03-16T10:00:00Z"},
                {"id": "b", "start": "2026-03-16 10:00", "end": "2026-03-16 11:00", "owner_id": "u1"}
            ]"#,
        )
        .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].duration_minutes(), 60.0);
        assert_eq!(events[1].owner_id, "u1");
    }

    #[test]
    fn test_parse_events_bad_datetime_names_event() {
        let err = parse_events(r#"[{"id": "oops", "start": "soon", "end": "later"}]"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("oops"), "got: {err:#}");
    }

    #[test]
    fn test_parse_events_not_an_array() {
        assert!(parse_events(r#"{"id": "a"}"#).is_err());
    }
}
