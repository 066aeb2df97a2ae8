//! Drag-and-drop move planning.
//!
//! Turns "this visit was dropped on day D at hour H" into the update the
//! persistence layer should apply. Nothing is mutated here.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::service::ServiceDefinition;
use crate::types::{DaySet, RepeatMode, ServiceId, ValidationError};

/// What a move applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveScope {
    /// Only the dragged occurrence.
    Single,
    /// Every occurrence of the definition.
    Series,
}

impl MoveScope {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Series => "series",
        }
    }
}

impl fmt::Display for MoveScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MoveScope {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "series" => Ok(Self::Series),
            _ => Err(ValidationError::InvalidMoveScope {
                value: s.to_string(),
            }),
        }
    }
}

/// The mutation to send to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub id: ServiceId,
    pub new_start: NaiveDateTime,
    /// Replacement day set, present only when a custom series had to be remapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_repeat_days: Option<DaySet>,
}

impl UpdateRequest {
    /// The definition as it reads after this update.
    ///
    /// Returns `None` if `definition` is not the one this update targets.
    pub fn apply_to(&self, definition: &ServiceDefinition) -> Option<ServiceDefinition> {
        if definition.id != self.id {
            return None;
        }
        Some(ServiceDefinition {
            start: self.new_start,
            repeat_days: self.new_repeat_days.unwrap_or(definition.repeat_days),
            ..definition.clone()
        })
    }
}

/// Why a move cannot be planned.
///
/// These are user-facing outcomes: the caller should re-prompt rather than
/// treat them as failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveRejection {
    /// Recurring series have no way to represent one detached occurrence.
    #[error("service {id} repeats ({mode}); move the whole series instead")]
    SingleOccurrenceOfSeries { id: ServiceId, mode: RepeatMode },

    #[error("hour must be between 0 and 23, got {hour}")]
    InvalidHour { hour: u32 },

    #[error("service {id} ends on {until}; it cannot be moved to start on {target}")]
    BeyondRepeatUntil {
        id: ServiceId,
        until: NaiveDate,
        target: NaiveDate,
    },
}

/// Plans moving `definition` so it starts on `target_day` at `target_hour`:00.
///
/// The duration and end date are kept. Moving a custom series to a weekday
/// outside its day set swaps the old anchor weekday for the new one, or adds
/// the new one if the old weekday was not in the set, so the number of
/// visits per week is preserved.
pub fn plan_move(
    definition: &ServiceDefinition,
    target_day: NaiveDate,
    target_hour: u32,
    scope: MoveScope,
) -> Result<UpdateRequest, MoveRejection> {
    let mode = definition.repeat_mode;
    if scope == MoveScope::Single && mode.is_recurring() {
        tracing::debug!(id = %definition.id, %mode, "rejected single-occurrence move on a series");
        return Err(MoveRejection::SingleOccurrenceOfSeries {
            id: definition.id.clone(),
            mode,
        });
    }

    let new_start = target_day
        .and_hms_opt(target_hour, 0, 0)
        .ok_or(MoveRejection::InvalidHour { hour: target_hour })?;

    if let Some(until) = definition.repeat_until.filter(|_| mode.is_recurring()) {
        if target_day > until {
            return Err(MoveRejection::BeyondRepeatUntil {
                id: definition.id.clone(),
                until,
                target: target_day,
            });
        }
    }

    let new_repeat_days = (mode == RepeatMode::Custom)
        .then(|| {
            remap_days(
                definition.repeat_days,
                definition.anchor_date().weekday(),
                target_day.weekday(),
            )
        })
        .flatten();

    tracing::debug!(
        id = %definition.id,
        %scope,
        %new_start,
        remapped = new_repeat_days.is_some(),
        "planned move"
    );

    Ok(UpdateRequest {
        id: definition.id.clone(),
        new_start,
        new_repeat_days,
    })
}

/// New day set for a custom series moving from `old` to `new`, or `None`
/// when `new` is already covered.
fn remap_days(days: DaySet, old: Weekday, new: Weekday) -> Option<DaySet> {
    if days.contains(new) {
        None
    } else if days.contains(old) {
        Some(days.without(old).with(new))
    } else {
        Some(days.with(new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::applies_on;

    fn day(date: &str) -> NaiveDate {
        date.parse().unwrap()
    }

    fn service(start: &str) -> ServiceDefinition {
        ServiceDefinition::new(ServiceId::new("svc-1").unwrap(), start.parse().unwrap(), 90)
    }

    /// Custom series anchored on Monday 2024-01-08, visiting Mondays and Thursdays.
    fn monday_thursday_series() -> ServiceDefinition {
        service("2024-01-08T09:15:00")
            .on_days(DaySet::from_weekdays([Weekday::Mon, Weekday::Thu]))
            .repeating(RepeatMode::Custom, Some(day("2024-03-29")))
    }

    #[test]
    fn series_move_swaps_old_weekday_for_new() {
        let def = monday_thursday_series();
        // 2024-01-17 is a Wednesday
        let request = plan_move(&def, day("2024-01-17"), 14, MoveScope::Series).unwrap();

        assert_eq!(request.id, def.id);
        assert_eq!(
            request.new_start,
            "2024-01-17T14:00:00".parse::<NaiveDateTime>().unwrap()
        );
        assert_eq!(
            request.new_repeat_days,
            Some(DaySet::from_weekdays([Weekday::Wed, Weekday::Thu]))
        );
    }

    #[test]
    fn series_move_onto_covered_weekday_keeps_days() {
        let def = monday_thursday_series();
        // 2024-01-11 is a Thursday
        let request = plan_move(&def, day("2024-01-11"), 8, MoveScope::Series).unwrap();
        assert_eq!(request.new_repeat_days, None);
    }

    #[test]
    fn series_move_adds_day_when_anchor_weekday_not_in_set() {
        // Anchored on a Tuesday but only visiting Mondays and Thursdays
        let def = service("2024-01-09T09:00:00")
            .on_days(DaySet::from_weekdays([Weekday::Mon, Weekday::Thu]))
            .repeating(RepeatMode::Custom, Some(day("2024-03-29")));
        let request = plan_move(&def, day("2024-01-13"), 10, MoveScope::Series).unwrap();
        assert_eq!(
            request.new_repeat_days,
            Some(DaySet::from_weekdays([
                Weekday::Mon,
                Weekday::Thu,
                Weekday::Sat
            ]))
        );
    }

    #[test]
    fn single_move_of_series_is_rejected() {
        let def = monday_thursday_series();
        let result = plan_move(&def, day("2024-01-17"), 14, MoveScope::Single);
        assert_eq!(
            result,
            Err(MoveRejection::SingleOccurrenceOfSeries {
                id: def.id.clone(),
                mode: RepeatMode::Custom
            })
        );
        assert!(result.unwrap_err().to_string().contains("whole series"));
    }

    #[test]
    fn single_move_of_one_off_visit() {
        let def = service("2024-01-10T09:45:00");
        let request = plan_move(&def, day("2024-01-12"), 16, MoveScope::Single).unwrap();
        assert_eq!(
            request.new_start,
            "2024-01-12T16:00:00".parse::<NaiveDateTime>().unwrap()
        );
        assert_eq!(request.new_repeat_days, None);
    }

    #[test]
    fn weekday_series_move_has_no_day_set() {
        let def = service("2024-01-08T09:00:00")
            .repeating(RepeatMode::Weekdays, Some(day("2024-06-30")));
        let request = plan_move(&def, day("2024-01-10"), 7, MoveScope::Series).unwrap();
        assert_eq!(request.new_repeat_days, None);
    }

    #[test]
    fn planning_twice_gives_the_same_request() {
        let def = monday_thursday_series();
        let first = plan_move(&def, day("2024-01-17"), 14, MoveScope::Series);
        let second = plan_move(&def, day("2024-01-17"), 14, MoveScope::Series);
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_hour_is_rejected() {
        let def = service("2024-01-10T09:00:00");
        assert_eq!(
            plan_move(&def, day("2024-01-10"), 24, MoveScope::Single),
            Err(MoveRejection::InvalidHour { hour: 24 })
        );
    }

    #[test]
    fn move_past_end_date_is_rejected() {
        let def = monday_thursday_series();
        let result = plan_move(&def, day("2024-04-01"), 9, MoveScope::Series);
        assert!(matches!(
            result,
            Err(MoveRejection::BeyondRepeatUntil { .. })
        ));
    }

    #[test]
    fn applied_update_produces_a_valid_series_on_the_target_day() {
        let def = monday_thursday_series();
        let target = day("2024-01-17");
        let request = plan_move(&def, target, 14, MoveScope::Series).unwrap();
        let moved = request.apply_to(&def).unwrap();

        assert_eq!(moved.validate(), Ok(()));
        assert_eq!(moved.duration_minutes, def.duration_minutes);
        assert_eq!(moved.repeat_until, def.repeat_until);
        assert!(applies_on(&moved, target));
        assert!(!applies_on(&moved, day("2024-01-15")));
        assert!(applies_on(&moved, day("2024-01-18")));
    }

    #[test]
    fn update_does_not_apply_to_other_services() {
        let def = monday_thursday_series();
        let request = plan_move(&def, day("2024-01-17"), 14, MoveScope::Series).unwrap();
        let other = ServiceDefinition {
            id: ServiceId::new("svc-2").unwrap(),
            ..def
        };
        assert!(request.apply_to(&other).is_none());
    }

    #[test]
    fn update_request_serializes_without_empty_day_set() {
        let def = service("2024-01-10T09:00:00");
        let request = plan_move(&def, day("2024-01-12"), 16, MoveScope::Single).unwrap();
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"id":"svc-1","new_start":"2024-01-12T16:00:00"}"#);
    }

    #[test]
    fn scope_parses_from_str() {
        assert_eq!("series".parse::<MoveScope>().unwrap(), MoveScope::Series);
        assert!("occurrence".parse::<MoveScope>().is_err());
    }
}
