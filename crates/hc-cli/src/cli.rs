//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hc_core::MoveScope;

/// Home-care scheduling calendar.
///
/// Expands recurring service definitions into day, week, month and year
/// views, and plans drag-and-drop moves.
#[derive(Debug, Parser)]
#[command(name = "hc", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show one day's visits laid out in lanes.
    Day {
        /// Date to show (YYYY-MM-DD, today, tomorrow, yesterday).
        #[arg(long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the seven days of the week containing a date.
    Week {
        /// Any date in the week (YYYY-MM-DD, today, tomorrow, yesterday).
        #[arg(long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show visit counts and previews for the month containing a date.
    Month {
        /// Any date in the month (YYYY-MM-DD, today, tomorrow, yesterday).
        #[arg(long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show visit counts per month.
    Year {
        /// Year to summarize (defaults to the current year).
        #[arg(long)]
        year: Option<i32>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate every service definition.
    Check,

    /// Plan moving a service to a new day and hour.
    Move {
        /// The service ID.
        id: String,

        /// Target date (YYYY-MM-DD, today, tomorrow, yesterday).
        #[arg(long)]
        date: String,

        /// Target hour (0-23); minutes are set to zero.
        #[arg(long)]
        hour: u32,

        /// Move one visit (single) or every visit (series).
        #[arg(long, default_value = "series")]
        scope: MoveScope,

        /// Write the change back to the services file.
        #[arg(long)]
        apply: bool,
    },
}
