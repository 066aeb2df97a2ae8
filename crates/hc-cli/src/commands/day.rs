//! Day command: one day's visits laid out in lanes.
//!
//! The day view caps how many lanes are shown side by side; visits in
//! lanes past the cap are reported as hidden rather than dropped silently.

use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use hc_core::{DayLayout, ServiceDefinition, layout_day, occurrences_on_day};
use serde::Serialize;

use super::util::{EventJson, format_event_row, format_outside, plural};
use crate::Config;

/// Day layout for JSON output.
#[derive(Debug, Serialize)]
pub struct DayJson {
    pub date: NaiveDate,
    pub lanes_used: usize,
    pub hidden_count: usize,
    pub outside_window: usize,
    pub events: Vec<EventJson>,
}

impl From<&DayLayout<'_>> for DayJson {
    fn from(layout: &DayLayout<'_>) -> Self {
        Self {
            date: layout.date,
            lanes_used: layout.lanes_used,
            hidden_count: layout.hidden_count,
            outside_window: layout.outside_window,
            events: layout.events.iter().map(EventJson::from).collect(),
        }
    }
}

/// Computes the capped layout of `date`.
pub fn build_day<'a>(
    services: &'a [ServiceDefinition],
    config: &Config,
    date: NaiveDate,
) -> Result<DayLayout<'a>> {
    let window = config.day_hours()?.on(date);
    let occurrences = occurrences_on_day(services, date);
    Ok(layout_day(&occurrences, window, config.day_layout_options()))
}

/// Formats the human-readable day view.
pub fn format_day(layout: &DayLayout<'_>) -> String {
    let mut output = String::new();

    writeln!(output, "DAY: {}", layout.date.format("%A, %b %-d, %Y")).unwrap();
    writeln!(output).unwrap();

    if layout.events.is_empty() && layout.hidden_count == 0 {
        if layout.outside_window == 0 {
            writeln!(output, "No visits scheduled.").unwrap();
        } else {
            writeln!(output, "No visits in visible hours.").unwrap();
            writeln!(output, "{}", format_outside(layout.outside_window)).unwrap();
        }
        return output;
    }

    for event in &layout.events {
        writeln!(output, "{}", format_event_row(event)).unwrap();
    }

    writeln!(output).unwrap();
    if layout.hidden_count > 0 {
        writeln!(
            output,
            "+{} hidden by overlap ({} shown, {} needed)",
            layout.hidden_count,
            plural(layout.events.len(), "visit"),
            plural(layout.lanes_used, "lane")
        )
        .unwrap();
    } else {
        writeln!(
            output,
            "{} in {}",
            plural(layout.events.len(), "visit"),
            plural(layout.lanes_used, "lane")
        )
        .unwrap();
    }
    if layout.outside_window > 0 {
        writeln!(output, "{}", format_outside(layout.outside_window)).unwrap();
    }

    output
}

pub fn run<W: std::io::Write>(
    writer: &mut W,
    services: &[ServiceDefinition],
    config: &Config,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let layout = build_day(services, config, date)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&DayJson::from(&layout))?)?;
    } else {
        write!(writer, "{}", format_day(&layout))?;
    }
    Ok(())
}
