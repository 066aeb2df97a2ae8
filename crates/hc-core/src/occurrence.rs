//! Occurrence materialization.
//!
//! Expands service definitions into the concrete occurrences covering a
//! date range. Occurrences are computed on demand from the definitions and
//! are never stored.
//!
//! # Ordering
//!
//! Every list returned here is sorted by start, then end, then service ID,
//! so layout downstream is reproducible even when two visits are identical.

use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use rayon::prelude::*;

use crate::recurrence::{applies_on, materialized_start};
use crate::service::ServiceDefinition;
use crate::types::ServiceId;

/// One concrete visit of a service on a specific day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub definition: &'a ServiceDefinition,
    pub start: NaiveDateTime,
    /// Always strictly after `start`.
    pub end: NaiveDateTime,
}

impl<'a> Occurrence<'a> {
    /// Builds the occurrence of `definition` on `day`.
    ///
    /// Does not check whether the definition actually applies on that day.
    pub fn materialize(definition: &'a ServiceDefinition, day: NaiveDate) -> Self {
        let start = materialized_start(definition, day);
        Self {
            definition,
            start,
            end: start
                .checked_add_signed(definition.occurrence_duration())
                .unwrap_or(NaiveDateTime::MAX),
        }
    }

    pub fn service_id(&self) -> &'a ServiceId {
        &self.definition.id
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open interval overlap; back-to-back visits do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Total order used for every occurrence list: start, end, service ID.
    pub fn chronological(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
            .then_with(|| self.service_id().cmp(other.service_id()))
    }
}

/// The occurrences of a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOccurrences<'a> {
    pub date: NaiveDate,
    pub occurrences: Vec<Occurrence<'a>>,
}

/// One day cell of a month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCell<'a> {
    pub date: NaiveDate,
    /// False for the leading and trailing days borrowed from adjacent months.
    pub in_month: bool,
    pub count: usize,
    /// The first few occurrences by start time.
    pub preview: Vec<Occurrence<'a>>,
}

impl MonthCell<'_> {
    /// Occurrences that did not fit in the preview.
    pub fn overflow(&self) -> usize {
        self.count - self.preview.len()
    }
}

/// A month laid out as full weeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid<'a> {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<MonthCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    /// Rows of seven cells each.
    pub fn weeks(&self) -> impl Iterator<Item = &[MonthCell<'a>]> {
        self.cells.chunks(7)
    }
}

/// Iterates `from..=to`. Empty when `from > to`.
fn days_inclusive(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |day| *day <= to)
}

/// Expands `definitions` into every occurrence between `from` and `to`, inclusive.
pub fn occurrences_in_range(
    definitions: &[ServiceDefinition],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<Occurrence<'_>> {
    let mut occurrences: Vec<Occurrence<'_>> = days_inclusive(from, to)
        .flat_map(move |day| {
            definitions
                .iter()
                .filter(move |definition| applies_on(definition, day))
                .map(move |definition| Occurrence::materialize(definition, day))
        })
        .collect();
    occurrences.sort_by(Occurrence::chronological);

    tracing::trace!(
        %from,
        %to,
        definitions = definitions.len(),
        occurrences = occurrences.len(),
        "materialized occurrences"
    );
    occurrences
}

pub fn occurrences_on_day(
    definitions: &[ServiceDefinition],
    day: NaiveDate,
) -> Vec<Occurrence<'_>> {
    occurrences_in_range(definitions, day, day)
}

/// Number of occurrences on `day`, without building them.
pub fn count_on_day(definitions: &[ServiceDefinition], day: NaiveDate) -> usize {
    definitions
        .iter()
        .filter(|definition| applies_on(definition, day))
        .count()
}

/// The first day of the week containing `date`.
pub fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let offset =
        (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(offset))
}

/// The seven days of the week containing `date`, each with its occurrences.
pub fn occurrences_in_week(
    definitions: &[ServiceDefinition],
    date: NaiveDate,
    first_day: Weekday,
) -> Vec<DayOccurrences<'_>> {
    week_start(date, first_day)
        .iter_days()
        .take(7)
        .map(|date| DayOccurrences {
            date,
            occurrences: occurrences_on_day(definitions, date),
        })
        .collect()
}

fn count_in_month(definitions: &[ServiceDefinition], year: i32, month: u32) -> usize {
    NaiveDate::from_ymd_opt(year, month, 1).map_or(0, |first| {
        first
            .iter_days()
            .take_while(|day| day.month() == month)
            .map(|day| count_on_day(definitions, day))
            .sum()
    })
}

/// Occurrence counts for each month of `year`, January first.
pub fn count_per_month_in_year(definitions: &[ServiceDefinition], year: i32) -> [usize; 12] {
    let mut counts = [0usize; 12];
    counts
        .par_iter_mut()
        .zip(1..13u32)
        .for_each(|(count, month)| *count = count_in_month(definitions, year, month));
    counts
}

/// Builds the grid for `month` of `year`: full weeks starting on `first_day`,
/// each cell with its count and at most `preview_limit` occurrences.
///
/// Returns `None` for an invalid year/month.
pub fn month_grid(
    definitions: &[ServiceDefinition],
    year: i32,
    month: u32,
    first_day: Weekday,
    preview_limit: usize,
) -> Option<MonthGrid<'_>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first
        .iter_days()
        .take_while(|day| day.month() == month)
        .last()?;
    let grid_start = week_start(first, first_day);
    let grid_end = week_start(last, first_day) + Duration::days(6);

    let cells = days_inclusive(grid_start, grid_end)
        .map(|date| {
            let mut preview = occurrences_on_day(definitions, date);
            let count = preview.len();
            preview.truncate(preview_limit);
            MonthCell {
                date,
                in_month: date.month() == month,
                count,
                preview,
            }
        })
        .collect();

    Some(MonthGrid { year, month, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DaySet, RepeatMode};

    fn day(date: &str) -> NaiveDate {
        date.parse().unwrap()
    }

    fn at(value: &str) -> NaiveDateTime {
        value.parse().unwrap()
    }

    fn service(id: &str, start: &str, minutes: i64) -> ServiceDefinition {
        ServiceDefinition::new(ServiceId::new(id).unwrap(), at(start), minutes)
    }

    fn ids<'a>(occurrences: &[Occurrence<'a>]) -> Vec<&'a str> {
        occurrences.iter().map(|o| o.service_id().as_str()).collect()
    }

    #[test]
    fn custom_series_over_range() {
        let defs = vec![
            service("mw", "2024-01-10T09:00:00", 60)
                .on_days(DaySet::from_indices([1, 3]).unwrap())
                .repeating(RepeatMode::Custom, Some(day("2024-01-24"))),
        ];
        let occurrences = occurrences_in_range(&defs, day("2024-01-01"), day("2024-01-31"));
        let dates: Vec<NaiveDate> = occurrences.iter().map(|o| o.start.date()).collect();
        assert_eq!(
            dates,
            vec![
                day("2024-01-10"),
                day("2024-01-15"),
                day("2024-01-17"),
                day("2024-01-22"),
                day("2024-01-24"),
            ]
        );
        assert!(occurrences.iter().all(|o| o.end - o.start == Duration::minutes(60)));
    }

    #[test]
    fn short_durations_are_stretched() {
        let defs = vec![service("quick", "2024-01-10T09:00:00", 10)];
        let occurrences = occurrences_on_day(&defs, day("2024-01-10"));
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].end, at("2024-01-10T09:30:00"));
    }

    #[test]
    fn zero_duration_still_has_positive_length() {
        let defs = vec![service("zero", "2024-01-10T09:00:00", 0)];
        let occurrences = occurrences_on_day(&defs, day("2024-01-10"));
        assert!(occurrences[0].end > occurrences[0].start);
    }

    #[test]
    fn huge_durations_are_capped_instead_of_overflowing() {
        let defs = vec![
            service("endless", "2024-01-10T09:00:00", i64::MAX),
            service("long", "2024-01-10T10:00:00", 1_000_000_000_000),
        ];
        let occurrences = occurrences_on_day(&defs, day("2024-01-10"));
        assert_eq!(occurrences.len(), 2);
        assert!(occurrences.iter().all(|o| o.duration() == Duration::days(1)));
        assert_eq!(occurrences[0].end, at("2024-01-11T09:00:00"));
    }

    #[test]
    fn day_list_is_sorted_by_start_end_then_id() {
        let defs = vec![
            service("c", "2024-01-10T10:00:00", 60),
            service("b", "2024-01-10T09:00:00", 90),
            service("a", "2024-01-10T10:00:00", 60),
            service("d", "2024-01-10T09:00:00", 60),
        ];
        let occurrences = occurrences_on_day(&defs, day("2024-01-10"));
        assert_eq!(ids(&occurrences), vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn inverted_range_is_empty() {
        let defs = vec![service("a", "2024-01-10T10:00:00", 60)];
        assert!(occurrences_in_range(&defs, day("2024-01-11"), day("2024-01-09")).is_empty());
    }

    #[test]
    fn week_starts_on_requested_day() {
        // 2024-01-10 is a Wednesday
        assert_eq!(week_start(day("2024-01-10"), Weekday::Mon), day("2024-01-08"));
        assert_eq!(week_start(day("2024-01-10"), Weekday::Sun), day("2024-01-07"));
        assert_eq!(week_start(day("2024-01-07"), Weekday::Mon), day("2024-01-01"));
        assert_eq!(week_start(day("2024-01-08"), Weekday::Mon), day("2024-01-08"));
    }

    #[test]
    fn week_has_seven_days_with_occurrences() {
        let defs = vec![
            service("weekday", "2024-01-08T09:00:00", 60)
                .repeating(RepeatMode::Weekdays, Some(day("2024-12-31"))),
        ];
        let week = occurrences_in_week(&defs, day("2024-01-10"), Weekday::Mon);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, day("2024-01-08"));
        let counts: Vec<usize> = week.iter().map(|d| d.occurrences.len()).collect();
        assert_eq!(counts, vec![1, 1, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn year_counts_per_month() {
        let defs = vec![
            service("daily", "2024-01-15T09:00:00", 60)
                .repeating(RepeatMode::Everyday, Some(day("2024-03-10"))),
            service("once", "2024-07-04T12:00:00", 60),
        ];
        let counts = count_per_month_in_year(&defs, 2024);
        assert_eq!(counts, [17, 29, 10, 0, 0, 0, 1, 0, 0, 0, 0, 0]);
        assert_eq!(count_per_month_in_year(&defs, 2025), [0; 12]);
    }

    #[test]
    fn month_grid_pads_to_full_weeks() {
        let defs = vec![
            service("daily", "2024-02-01T09:00:00", 60)
                .repeating(RepeatMode::Everyday, Some(day("2024-02-29"))),
            service("extra", "2024-02-14T08:00:00", 60),
            service("late", "2024-02-14T18:00:00", 60),
        ];
        // February 2024 starts on a Thursday and ends on a Thursday
        let grid = month_grid(&defs, 2024, 2, Weekday::Mon, 2).unwrap();
        assert_eq!(grid.cells.len(), 35);
        assert_eq!(grid.cells[0].date, day("2024-01-29"));
        assert!(!grid.cells[0].in_month);
        assert_eq!(grid.cells[0].count, 0);
        assert_eq!(grid.weeks().count(), 5);

        let valentines = grid
            .cells
            .iter()
            .find(|c| c.date == day("2024-02-14"))
            .unwrap();
        assert_eq!(valentines.count, 3);
        assert_eq!(ids(&valentines.preview), vec!["extra", "daily"]);
        assert_eq!(valentines.overflow(), 1);
    }

    #[test]
    fn month_grid_rejects_invalid_month() {
        assert!(month_grid(&[], 2024, 13, Weekday::Mon, 3).is_none());
    }
}
