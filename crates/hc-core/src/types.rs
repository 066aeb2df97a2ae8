//! Core type definitions with validation.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Invalid repeat mode value.
    #[error("invalid repeat mode: {value}")]
    InvalidRepeatMode { value: String },

    /// Invalid move scope value.
    #[error("invalid move scope: {value} (expected single or series)")]
    InvalidMoveScope { value: String },

    /// A day-of-week index outside 0 (Sunday) ..= 6 (Saturday).
    #[error("day of week must be between 0 (Sunday) and 6 (Saturday), got {value}")]
    DayOfWeekOutOfRange { value: u8 },

    /// Visible hours must satisfy `start < end <= 24`.
    #[error("visible hours must satisfy start < end <= 24, got {start}..{end}")]
    InvalidDayHours { start: u32, end: u32 },
}

/// Declares a non-blank string identifier.
///
/// IDs are ordered so that occurrence lists can break ties by ID and stay
/// reproducible.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Rejects empty and whitespace-only IDs.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $label });
                }
                Ok(Self(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_id!(
    /// Identifies a service definition. Uniqueness is up to the caller.
    ServiceId, "service ID"
);

define_id!(
    /// A validated caregiver identifier.
    ///
    /// Only used as a color key when rendering; never evaluated by the engine.
    CaregiverId, "caregiver ID"
);

/// The rule governing which calendar days a service occurs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// A one-off service on its anchor date.
    #[default]
    None,
    /// Monday through Friday.
    Weekdays,
    /// Every day.
    Everyday,
    /// Saturday and Sunday.
    Weekend,
    /// The days listed in the definition's day set.
    Custom,
}

impl RepeatMode {
    /// String representation used in JSON and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Weekdays => "weekdays",
            Self::Everyday => "everyday",
            Self::Weekend => "weekend",
            Self::Custom => "custom",
        }
    }

    /// Whether this mode can produce more than one occurrence.
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RepeatMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "weekdays" => Ok(Self::Weekdays),
            "everyday" => Ok(Self::Everyday),
            "weekend" => Ok(Self::Weekend),
            "custom" => Ok(Self::Custom),
            _ => Err(ValidationError::InvalidRepeatMode {
                value: s.to_string(),
            }),
        }
    }
}

/// A set of days of the week.
///
/// Serialized as a sorted list of indices where 0 is Sunday and 6 is
/// Saturday, which is the numbering the scheduling forms use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DaySet(u8);

impl DaySet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Builds a set from weekdays.
    pub fn from_weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter().fold(Self::EMPTY, Self::with)
    }

    /// Builds a set from Sunday-based indices, rejecting anything above 6.
    pub fn from_indices(indices: impl IntoIterator<Item = u8>) -> Result<Self, ValidationError> {
        indices.into_iter().try_fold(Self::EMPTY, |set, index| {
            weekday_from_index(index).map(|day| set.with(day))
        })
    }

    /// Returns a copy of this set with `day` added.
    #[must_use]
    pub fn with(self, day: Weekday) -> Self {
        Self(self.0 | bit(day))
    }

    /// Returns a copy of this set with `day` removed.
    #[must_use]
    pub fn without(self, day: Weekday) -> Self {
        Self(self.0 & !bit(day))
    }

    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the days in Sunday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        (0..7u8)
            .filter(move |&i| self.0 & (1 << i) != 0)
            .filter_map(|i| weekday_from_index(i).ok())
    }
}

impl TryFrom<Vec<u8>> for DaySet {
    type Error = ValidationError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(value)
    }
}

impl From<DaySet> for Vec<u8> {
    fn from(set: DaySet) -> Self {
        set.iter().map(weekday_index).collect()
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|d| d.to_string()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

fn bit(day: Weekday) -> u8 {
    1 << weekday_index(day)
}

/// Sunday-based index of a weekday (Sunday = 0).
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "value is in 0..7")]
pub fn weekday_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Weekday for a Sunday-based index.
pub fn weekday_from_index(index: u8) -> Result<Weekday, ValidationError> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        value => Err(ValidationError::DayOfWeekOutOfRange { value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_id_rejects_blank() {
        assert!(ServiceId::new("").is_err());
        assert!(ServiceId::new("  ").is_err());
        assert!(ServiceId::new("svc-1").is_ok());
    }

    #[test]
    fn service_ids_order_lexically() {
        let mut ids = vec![ServiceId::new("b").unwrap(), ServiceId::new("a").unwrap()];
        ids.sort();
        assert_eq!(ids[0].to_string(), "a");
    }

    #[test]
    fn caregiver_id_serde_rejects_empty() {
        let result: Result<CaregiverId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn service_id_serde_roundtrip() {
        let id = ServiceId::new("svc-42").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"svc-42\"");
        let parsed: ServiceId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn repeat_mode_from_str() {
        assert_eq!("weekend".parse::<RepeatMode>().unwrap(), RepeatMode::Weekend);
        assert_eq!("custom".parse::<RepeatMode>().unwrap(), RepeatMode::Custom);
        assert!("fortnightly".parse::<RepeatMode>().is_err());
    }

    #[test]
    fn repeat_mode_serializes_lowercase() {
        let json = serde_json::to_string(&RepeatMode::Everyday).unwrap();
        assert_eq!(json, "\"everyday\"");
        assert!(!RepeatMode::None.is_recurring());
        assert!(RepeatMode::Weekdays.is_recurring());
    }

    #[test]
    fn day_set_uses_sunday_based_indices() {
        let set = DaySet::from_indices([1, 3]).unwrap();
        assert!(set.contains(Weekday::Mon));
        assert!(set.contains(Weekday::Wed));
        assert!(!set.contains(Weekday::Sun));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn day_set_rejects_out_of_range_index() {
        assert_eq!(
            DaySet::from_indices([7]),
            Err(ValidationError::DayOfWeekOutOfRange { value: 7 })
        );
        let result: Result<DaySet, _> = serde_json::from_str("[0, 9]");
        assert!(result.is_err());
    }

    #[test]
    fn day_set_serializes_sorted() {
        let set = DaySet::from_weekdays([Weekday::Sat, Weekday::Sun, Weekday::Tue]);
        assert_eq!(serde_json::to_string(&set).unwrap(), "[0,2,6]");
        let parsed: DaySet = serde_json::from_str("[6,2,0,2]").unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn day_set_with_and_without() {
        let set = DaySet::EMPTY.with(Weekday::Thu).with(Weekday::Mon);
        let moved = set.without(Weekday::Mon).with(Weekday::Wed);
        assert_eq!(
            moved.iter().collect::<Vec<_>>(),
            vec![Weekday::Wed, Weekday::Thu]
        );
        assert!(DaySet::EMPTY.is_empty());
        assert_eq!(moved.to_string(), "{Wed, Thu}");
    }
}
