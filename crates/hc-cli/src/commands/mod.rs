//! CLI subcommand implementations.

pub mod check;
pub mod day;
pub mod month;
pub mod reschedule;
pub mod util;
pub mod week;
pub mod year;
