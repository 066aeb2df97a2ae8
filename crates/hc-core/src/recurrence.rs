//! Recurrence rule evaluation.
//!
//! Answers "does this service occur on that day?" and "when does it start
//! on that day?". Both are pure functions of the definition and the day.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::service::ServiceDefinition;
use crate::types::RepeatMode;

/// Returns true if `definition` produces an occurrence on `day`.
///
/// A series never occurs before its anchor date, and a recurring series
/// never occurs after its `repeat_until` day. A custom rule with no days
/// never occurs.
pub fn applies_on(definition: &ServiceDefinition, day: NaiveDate) -> bool {
    let anchor = definition.anchor_date();
    if day < anchor {
        return false;
    }

    let mode = definition.repeat_mode;
    if mode == RepeatMode::None {
        return day == anchor;
    }

    if definition.repeat_until.is_some_and(|until| day > until) {
        return false;
    }

    let weekday = day.weekday();
    match mode {
        RepeatMode::None => false,
        RepeatMode::Weekdays => !is_weekend(weekday),
        RepeatMode::Everyday => true,
        RepeatMode::Weekend => is_weekend(weekday),
        RepeatMode::Custom => definition.repeat_days.contains(weekday),
    }
}

/// The start of `definition`'s occurrence on `day`.
///
/// Keeps the anchor's hour and minute and discards its date, so every
/// occurrence in a series starts at the same wall-clock time.
pub fn materialized_start(definition: &ServiceDefinition, day: NaiveDate) -> NaiveDateTime {
    let time = definition.time_of_day();
    let time = time
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time);
    day.and_time(time)
}

const fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}
