//! Scheduling engine for home-care visits.
//!
//! This crate contains the pure, synchronous logic behind the calendar:
//! - Recurrence: which days a service occurs on, and when it starts
//! - Occurrences: expanding definitions over a day, week, month or year
//! - Layout: placing a day's overlapping visits into lanes
//! - Moves: turning a drag-and-drop into an update request
//!
//! Nothing here performs I/O or keeps state between calls.

mod layout;
mod moves;
mod occurrence;
pub mod recurrence;
mod service;
pub mod types;

pub use layout::{
    DayHours, DayLayout, LayoutEvent, LayoutOptions, VisibleWindow, layout_day, layout_week,
};
pub use moves::{MoveRejection, MoveScope, UpdateRequest, plan_move};
pub use occurrence::{
    DayOccurrences, MonthCell, MonthGrid, Occurrence, count_on_day, count_per_month_in_year,
    month_grid, occurrences_in_range, occurrences_in_week, occurrences_on_day, week_start,
};
pub use recurrence::{applies_on, materialized_start};
pub use service::{
    MAX_OCCURRENCE_MINUTES, MIN_OCCURRENCE_MINUTES, RecurrenceConfigError, ServiceDefinition,
    parse_day_bound,
};
pub use types::{CaregiverId, DaySet, RepeatMode, ServiceId, ValidationError};
