//! Service definitions as delivered by the persistence layer.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::types::{CaregiverId, DaySet, RepeatMode, ServiceId};

/// Shortest occurrence the calendar will lay out, in minutes.
///
/// Shorter (or non-positive) durations are stretched to this so every
/// occurrence stays a clickable block.
pub const MIN_OCCURRENCE_MINUTES: i64 = 30;

/// Longest visit a definition may describe, in minutes (one full day).
pub const MAX_OCCURRENCE_MINUTES: i64 = 24 * 60;

/// Recurrence settings that cannot produce a sensible series.
///
/// These are caught when a definition is created or edited; the engine
/// itself degrades to "no occurrences" instead of failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecurrenceConfigError {
    #[error("duration must be at least 1 minute, got {minutes}")]
    NonPositiveDuration { minutes: i64 },

    #[error("duration must be at most 1440 minutes (one day), got {minutes}")]
    DurationTooLong { minutes: i64 },

    #[error("repeating services ({mode}) need an end date")]
    MissingRepeatUntil { mode: RepeatMode },

    #[error("custom repetition needs at least one day of the week")]
    EmptyCustomDays,

    #[error("end date {until} is before the first visit on {anchor}")]
    RepeatUntilBeforeAnchor { until: NaiveDate, anchor: NaiveDate },
}

/// A scheduled service, possibly repeating.
///
/// One definition stands for its whole series; occurrences are computed on
/// demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub id: ServiceId,
    /// Wall-clock start of the first visit. The date anchors the series and
    /// the time of day is reused for every occurrence.
    pub start: NaiveDateTime,
    pub duration_minutes: i64,
    #[serde(default)]
    pub repeat_mode: RepeatMode,
    /// Last day (inclusive) the series may produce an occurrence on.
    #[serde(
        default,
        deserialize_with = "deserialize_day_bound",
        skip_serializing_if = "Option::is_none"
    )]
    pub repeat_until: Option<NaiveDate>,
    /// Days used by [`RepeatMode::Custom`]; ignored by the other modes.
    #[serde(default)]
    pub repeat_days: DaySet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caregiver_id: Option<CaregiverId>,
}

impl ServiceDefinition {
    /// A one-off service.
    pub const fn new(id: ServiceId, start: NaiveDateTime, duration_minutes: i64) -> Self {
        Self {
            id,
            start,
            duration_minutes,
            repeat_mode: RepeatMode::None,
            repeat_until: None,
            repeat_days: DaySet::EMPTY,
            caregiver_id: None,
        }
    }

    #[must_use]
    pub fn repeating(mut self, mode: RepeatMode, until: Option<NaiveDate>) -> Self {
        self.repeat_mode = mode;
        self.repeat_until = until;
        self
    }

    /// Switches to [`RepeatMode::Custom`] on the given days.
    #[must_use]
    pub fn on_days(mut self, days: DaySet) -> Self {
        self.repeat_mode = RepeatMode::Custom;
        self.repeat_days = days;
        self
    }

    /// The calendar date of the first occurrence.
    pub fn anchor_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// The wall-clock time shared by every occurrence.
    pub fn time_of_day(&self) -> NaiveTime {
        self.start.time()
    }

    /// Length of each occurrence, kept between [`MIN_OCCURRENCE_MINUTES`]
    /// and [`MAX_OCCURRENCE_MINUTES`].
    pub fn occurrence_duration(&self) -> Duration {
        Duration::minutes(
            self.duration_minutes
                .clamp(MIN_OCCURRENCE_MINUTES, MAX_OCCURRENCE_MINUTES),
        )
    }

    /// Checks the recurrence settings a scheduling form must enforce.
    pub fn validate(&self) -> Result<(), RecurrenceConfigError> {
        if self.duration_minutes < 1 {
            return Err(RecurrenceConfigError::NonPositiveDuration {
                minutes: self.duration_minutes,
            });
        }
        if self.duration_minutes > MAX_OCCURRENCE_MINUTES {
            return Err(RecurrenceConfigError::DurationTooLong {
                minutes: self.duration_minutes,
            });
        }

        if !self.repeat_mode.is_recurring() {
            return Ok(());
        }

        let Some(until) = self.repeat_until else {
            return Err(RecurrenceConfigError::MissingRepeatUntil {
                mode: self.repeat_mode,
            });
        };

        if until < self.anchor_date() {
            return Err(RecurrenceConfigError::RepeatUntilBeforeAnchor {
                until,
                anchor: self.anchor_date(),
            });
        }

        if self.repeat_mode == RepeatMode::Custom && self.repeat_days.is_empty() {
            return Err(RecurrenceConfigError::EmptyCustomDays);
        }

        Ok(())
    }
}

/// Parses an end-of-series bound, accepting a date or a date-time.
///
/// Only the date survives; the bound is compared by calendar day.
pub fn parse_day_bound(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    s.parse::<NaiveDate>()
        .or_else(|_| s.parse::<NaiveDateTime>().map(|dt| dt.date()))
}

fn deserialize_day_bound<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_day_bound(&raw).map_err(serde::de::Error::custom))
        .transpose()
}
