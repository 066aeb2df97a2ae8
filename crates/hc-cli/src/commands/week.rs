//! Week command: seven day columns, each laid out independently.
//!
//! Unlike the day view, week columns stretch to fit every lane.

use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use hc_core::{DayLayout, ServiceDefinition, layout_week, occurrences_in_week};
use serde::Serialize;

use super::day::DayJson;
use super::util::{format_event_row, format_outside};
use crate::Config;

/// Week layout for JSON output.
#[derive(Debug, Serialize)]
pub struct WeekJson {
    pub week_start: NaiveDate,
    pub days: Vec<DayJson>,
}

/// Computes the layout of the week containing `date`.
pub fn build_week<'a>(
    services: &'a [ServiceDefinition],
    config: &Config,
    date: NaiveDate,
) -> Result<Vec<DayLayout<'a>>> {
    let hours = config.day_hours()?;
    let days = occurrences_in_week(services, date, config.week_starts_on.weekday());
    Ok(layout_week(&days, hours, config.min_height_fraction))
}

/// Formats the human-readable week view.
pub fn format_week(days: &[DayLayout<'_>]) -> String {
    let mut output = String::new();

    if let Some(first) = days.first() {
        writeln!(output, "WEEK OF {}", first.date.format("%b %-d, %Y")).unwrap();
    }

    for day in days {
        writeln!(output).unwrap();
        writeln!(output, "{}", day.date.format("%a %b %-d")).unwrap();
        if day.events.is_empty() && day.outside_window == 0 {
            writeln!(output, "  (no visits)").unwrap();
        }
        for event in &day.events {
            writeln!(output, "  {}", format_event_row(event)).unwrap();
        }
        if day.outside_window > 0 {
            writeln!(output, "  {}", format_outside(day.outside_window)).unwrap();
        }
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
    let days = build_week(services, config, date)?;
    if json {
        let week = WeekJson {
            week_start: days.first().map_or(date, |d| d.date),
            days: days.iter().map(DayJson::from).collect(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&week)?)?;
    } else {
        write!(writer, "{}", format_week(&days))?;
    }
    Ok(())
}
