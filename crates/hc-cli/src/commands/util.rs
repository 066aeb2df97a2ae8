//! Shared utilities for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use hc_core::{LayoutEvent, Occurrence, ServiceDefinition};
use serde::Serialize;

/// Loads service definitions from a JSON array file.
///
/// A missing file is an empty schedule. Invalid definitions are kept, since
/// the engine treats them as producing no visits, but each one is logged.
pub fn load_services(path: &Path) -> Result<Vec<ServiceDefinition>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "services file not found, using empty schedule");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let services: Vec<ServiceDefinition> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse services from {}", path.display()))?;

    for service in &services {
        if let Err(err) = service.validate() {
            tracing::warn!(id = %service.id, error = %err, "invalid service definition");
        }
    }
    tracing::debug!(count = services.len(), "loaded services");

    Ok(services)
}

/// Writes service definitions back as a pretty-printed JSON array.
pub fn save_services(path: &Path, services: &[ServiceDefinition]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut json = serde_json::to_string_pretty(services)?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Parses a calendar date.
///
/// Supports:
/// - ISO 8601: "2024-01-10"
/// - Relative: "today", "tomorrow", "yesterday"
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let today = Local::now().date_naive();
    match s {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| {
        format!("Invalid date: {s}. Use YYYY-MM-DD, 'today', 'tomorrow' or 'yesterday'")
    })
}

/// Resolves an optional `--date` argument, defaulting to today.
pub fn date_or_today(date: Option<&str>) -> Result<NaiveDate> {
    date.map_or_else(|| Ok(Local::now().date_naive()), parse_date)
}

/// "09:00-10:30"
pub fn format_time_range(occurrence: &Occurrence<'_>) -> String {
    format!(
        "{}-{}",
        occurrence.start.format("%H:%M"),
        occurrence.end.format("%H:%M")
    )
}

/// One rendered block: time, lane and service.
pub fn format_event_row(event: &LayoutEvent<'_>) -> String {
    let occurrence = &event.occurrence;
    let caregiver = occurrence
        .definition
        .caregiver_id
        .as_ref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default();
    format!(
        "{}  lane {}/{}  {}{}",
        format_time_range(occurrence),
        event.lane + 1,
        event.lane_count,
        occurrence.service_id(),
        caregiver
    )
}

/// "2 visits outside visible hours"
pub fn format_outside(count: usize) -> String {
    format!("{} outside visible hours", plural(count, "visit"))
}

/// "1 visit", "3 visits"
pub fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// A positioned block for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct EventJson {
    pub service_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caregiver_id: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub lane: usize,
    pub lane_count: usize,
    pub top_fraction: f64,
    pub height_fraction: f64,
}

impl From<&LayoutEvent<'_>> for EventJson {
    fn from(event: &LayoutEvent<'_>) -> Self {
        let definition = event.occurrence.definition;
        Self {
            service_id: definition.id.to_string(),
            caregiver_id: definition.caregiver_id.as_ref().map(ToString::to_string),
            start: event.occurrence.start,
            end: event.occurrence.end,
            lane: event.lane,
            lane_count: event.lane_count,
            top_fraction: event.top_fraction,
            height_fraction: event.height_fraction,
        }
    }
}
