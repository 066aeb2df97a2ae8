//! Year command: visit counts per month.

use std::fmt::Write;

use anyhow::Result;
use hc_core::{ServiceDefinition, count_per_month_in_year};
use serde::Serialize;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Year summary for JSON output.
#[derive(Debug, Serialize)]
pub struct YearJson {
    pub year: i32,
    /// Visits per month, January first.
    pub months: [usize; 12],
    pub total: usize,
}

/// Formats the human-readable year summary.
pub fn format_year(year: i32, counts: &[usize; 12]) -> String {
    let mut output = String::new();

    writeln!(output, "YEAR: {year}").unwrap();
    writeln!(output).unwrap();
    for (name, count) in MONTH_NAMES.iter().zip(counts) {
        writeln!(output, "{name}  {count:>5}").unwrap();
    }
    writeln!(output).unwrap();
    writeln!(output, "Total: {}", counts.iter().sum::<usize>()).unwrap();

    output
}

pub fn run<W: std::io::Write>(
    writer: &mut W,
    services: &[ServiceDefinition],
    year: i32,
    json: bool,
) -> Result<()> {
    let months = count_per_month_in_year(services, year);
    if json {
        let summary = YearJson {
            year,
            months,
            total: months.iter().sum(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        write!(writer, "{}", format_year(year, &months))?;
    }
    Ok(())
}
