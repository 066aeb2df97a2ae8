//! Month command: visit counts with a short preview per day.
//!
//! Month cells do not use lane layout; they only show the first few visits
//! by start time.

use std::fmt::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use hc_core::{MonthCell, MonthGrid, ServiceDefinition, month_grid};
use serde::Serialize;

use super::util::plural;
use crate::Config;

#[derive(Debug, Serialize)]
pub struct PreviewJson {
    pub service_id: String,
    pub start: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct CellJson {
    pub date: NaiveDate,
    pub in_month: bool,
    pub count: usize,
    pub preview: Vec<PreviewJson>,
}

/// Month grid for JSON output, one array of seven cells per week.
#[derive(Debug, Serialize)]
pub struct MonthJson {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<CellJson>>,
}

impl From<&MonthCell<'_>> for CellJson {
    fn from(cell: &MonthCell<'_>) -> Self {
        Self {
            date: cell.date,
            in_month: cell.in_month,
            count: cell.count,
            preview: cell
                .preview
                .iter()
                .map(|o| PreviewJson {
                    service_id: o.service_id().to_string(),
                    start: o.start,
                })
                .collect(),
        }
    }
}

impl From<&MonthGrid<'_>> for MonthJson {
    fn from(grid: &MonthGrid<'_>) -> Self {
        Self {
            year: grid.year,
            month: grid.month,
            weeks: grid
                .weeks()
                .map(|week| week.iter().map(CellJson::from).collect())
                .collect(),
        }
    }
}

/// Computes the grid of the month containing `date`.
pub fn build_month<'a>(
    services: &'a [ServiceDefinition],
    config: &Config,
    date: NaiveDate,
) -> Result<MonthGrid<'a>> {
    month_grid(
        services,
        date.year(),
        date.month(),
        config.week_starts_on.weekday(),
        config.month_preview_limit,
    )
    .with_context(|| format!("no month grid for {date}"))
}

fn format_cell(cell: &MonthCell<'_>) -> String {
    let mut parts: Vec<String> = cell
        .preview
        .iter()
        .map(|o| format!("{} {}", o.start.format("%H:%M"), o.service_id()))
        .collect();
    if cell.overflow() > 0 {
        parts.push(format!("+{} more", cell.overflow()));
    }
    format!(
        "{}  {}: {}",
        cell.date.format("%b %e"),
        plural(cell.count, "visit"),
        parts.join(", ")
    )
}

/// Formats the human-readable month view: busy days of the month only.
pub fn format_month(grid: &MonthGrid<'_>) -> String {
    let mut output = String::new();

    let title = NaiveDate::from_ymd_opt(grid.year, grid.month, 1)
        .map_or_else(|| format!("{}-{:02}", grid.year, grid.month), |d| {
            d.format("%B %Y").to_string()
        });
    writeln!(output, "MONTH: {title}").unwrap();
    writeln!(output).unwrap();

    let busy: Vec<&MonthCell<'_>> = grid
        .cells
        .iter()
        .filter(|c| c.in_month && c.count > 0)
        .collect();

    if busy.is_empty() {
        writeln!(output, "No visits scheduled this month.").unwrap();
        return output;
    }

    for cell in &busy {
        writeln!(output, "{}", format_cell(cell)).unwrap();
    }

    let total: usize = busy.iter().map(|c| c.count).sum();
    writeln!(output).unwrap();
    writeln!(output, "Total: {}", plural(total, "visit")).unwrap();

    output
}

pub fn run<W: std::io::Write>(
    writer: &mut W,
    services: &[ServiceDefinition],
    config: &Config,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let grid = build_month(services, config, date)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&MonthJson::from(&grid))?)?;
    } else {
        write!(writer, "{}", format_month(&grid))?;
    }
    Ok(())
}
