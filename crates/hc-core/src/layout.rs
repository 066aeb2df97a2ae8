//! Calendar lane layout.
//!
//! Places one day's occurrences into side-by-side lanes so that no two
//! overlapping visits share a lane, and maps each onto a vertical slice of
//! the visible part of the day.
//!
//! # Algorithm Summary
//!
//! 1. Set aside visits that do not reach into the visible window, then
//!    sort the rest by start, end, service ID.
//! 2. Sweep left to right, folding a snapshot of the visits still running:
//!    visits that ended at or before the new start are dropped, and the new
//!    visit takes the lowest lane nobody running holds. Sweeping by start
//!    time makes this optimal for interval graphs, so the number of lanes
//!    equals the largest set of visits running at one instant.
//! 3. For each visit, sample the boundaries of every visit overlapping it
//!    and keep the highest concurrency seen; that is its `lane_count`.
//! 4. Map start and length onto fractions of the visible window.
//! 5. Only then apply the parallel-lane cap: visits in lanes at or past the
//!    cap are counted as hidden rather than returned.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::occurrence::{DayOccurrences, Occurrence};
use crate::types::ValidationError;

/// Offset used to sample "just before the end" of a visit.
fn end_epsilon() -> Duration {
    Duration::milliseconds(1)
}

/// The hours of each day the calendar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    start_hour: u32,
    end_hour: u32,
}

impl DayHours {
    /// Midnight to midnight.
    pub const FULL_DAY: Self = Self {
        start_hour: 0,
        end_hour: 24,
    };

    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, ValidationError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(ValidationError::InvalidDayHours {
                start: start_hour,
                end: end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    /// These hours on a specific date.
    pub fn on(self, date: NaiveDate) -> VisibleWindow {
        let midnight = date.and_time(NaiveTime::MIN);
        VisibleWindow {
            start: midnight + Duration::hours(i64::from(self.start_hour)),
            end: midnight + Duration::hours(i64::from(self.end_hour)),
        }
    }
}

impl Default for DayHours {
    fn default() -> Self {
        Self::FULL_DAY
    }
}

/// The visible stretch of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl VisibleWindow {
    pub fn full_day(date: NaiveDate) -> Self {
        DayHours::FULL_DAY.on(date)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "millisecond spans within a day fit in f64 exactly"
    )]
    fn fraction(&self, span: Duration) -> f64 {
        let total = self.duration().num_milliseconds();
        if total <= 0 {
            return 0.0;
        }
        span.num_milliseconds() as f64 / total as f64
    }

    /// True if some part of `occurrence` falls inside the window.
    pub fn shows(&self, occurrence: &Occurrence<'_>) -> bool {
        occurrence.start < self.end && self.start < occurrence.end
    }

    /// Top and height of `occurrence`, clipped to the window.
    fn position(&self, occurrence: &Occurrence<'_>, min_height_fraction: f64) -> (f64, f64) {
        let start = occurrence.start.clamp(self.start, self.end);
        let end = occurrence.end.clamp(self.start, self.end);
        let top = self.fraction(start - self.start).clamp(0.0, 1.0);
        let height = self
            .fraction(end - start)
            .max(min_height_fraction)
            .clamp(0.0, 1.0);
        (top, height)
    }
}

/// Tuning for a layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Floor for `height_fraction` so short visits stay clickable.
    pub min_height_fraction: f64,
    /// Lanes shown side by side; `None` shows every lane.
    pub max_parallel_lanes: Option<usize>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_height_fraction: 0.02,
            max_parallel_lanes: None,
        }
    }
}

/// An occurrence positioned for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEvent<'a> {
    pub occurrence: Occurrence<'a>,
    /// Column within the day; overlapping events never share one.
    pub lane: usize,
    /// Most events running at once at any instant this event touches.
    /// Always greater than `lane`.
    pub lane_count: usize,
    pub top_fraction: f64,
    pub height_fraction: f64,
}

/// The layout of one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayLayout<'a> {
    pub date: NaiveDate,
    /// Visible events in chronological order.
    pub events: Vec<LayoutEvent<'a>>,
    /// Events left out because their lane is at or past the cap.
    pub hidden_count: usize,
    /// Lanes needed to show every event, before the cap.
    pub lanes_used: usize,
    /// Events entirely before or after the visible hours. They take no lane.
    pub outside_window: usize,
}

/// Snapshot of the lane sweep after placing some prefix of the events.
#[derive(Debug, Clone, Default)]
struct Sweep {
    /// `(end, lane)` of events that may still conflict with later starts.
    running: Vec<(NaiveDateTime, usize)>,
    lanes: Vec<usize>,
}

impl Sweep {
    fn place(self, occurrence: &Occurrence<'_>) -> Self {
        let running: Vec<(NaiveDateTime, usize)> = self
            .running
            .into_iter()
            .filter(|(end, _)| *end > occurrence.start)
            .collect();

        let lane = (0..=running.len())
            .find(|candidate| running.iter().all(|(_, held)| held != candidate))
            .unwrap_or(running.len());

        let running = running
            .into_iter()
            .chain(std::iter::once((occurrence.end, lane)))
            .collect();
        let lanes = self.lanes.into_iter().chain(std::iter::once(lane)).collect();
        Self { running, lanes }
    }
}

/// Lane of each occurrence; `sorted` must be in chronological order.
fn assign_lanes(sorted: &[Occurrence<'_>]) -> Vec<usize> {
    sorted.iter().fold(Sweep::default(), Sweep::place).lanes
}

/// Highest number of events running at once while `event` runs.
fn cluster_width<'a>(event: &Occurrence<'a>, all: &[Occurrence<'a>]) -> usize {
    let neighbours: Vec<&Occurrence<'a>> = all.iter().filter(|o| o.overlaps(event)).collect();
    let epsilon = end_epsilon();

    neighbours
        .iter()
        .flat_map(|o| [o.start, o.end - epsilon])
        .filter(|instant| event.start <= *instant && *instant < event.end)
        .map(|instant| {
            neighbours
                .iter()
                .filter(|o| o.start <= instant && instant < o.end)
                .count()
        })
        .max()
        .unwrap_or(1)
}

/// Lays out one day's occurrences inside `window`.
///
/// Input order does not matter. Events with no part inside `window` are
/// only counted in `outside_window`. Events whose lane reaches
/// `options.max_parallel_lanes` are counted in `hidden_count` instead of
/// being returned; lanes are always computed over the full set first.
pub fn layout_day<'a>(
    occurrences: &[Occurrence<'a>],
    window: VisibleWindow,
    options: LayoutOptions,
) -> DayLayout<'a> {
    let (mut sorted, outside): (Vec<Occurrence<'a>>, Vec<Occurrence<'a>>) =
        occurrences.iter().copied().partition(|o| window.shows(o));
    sorted.sort_by(Occurrence::chronological);

    let lanes = assign_lanes(&sorted);
    let lanes_used = lanes.iter().max().map_or(0, |max| max + 1);

    let (events, hidden): (Vec<LayoutEvent<'a>>, Vec<LayoutEvent<'a>>) = sorted
        .iter()
        .zip(lanes)
        .map(|(occurrence, lane)| {
            let (top_fraction, height_fraction) =
                window.position(occurrence, options.min_height_fraction);
            LayoutEvent {
                occurrence: *occurrence,
                lane,
                lane_count: cluster_width(occurrence, &sorted),
                top_fraction,
                height_fraction,
            }
        })
        .partition(|event| options.max_parallel_lanes.is_none_or(|cap| event.lane < cap));

    if !hidden.is_empty() {
        tracing::debug!(
            date = %window.start.date(),
            hidden = hidden.len(),
            lanes_used,
            "events hidden by parallel-lane cap"
        );
    }

    DayLayout {
        date: window.start.date(),
        events,
        hidden_count: hidden.len(),
        lanes_used,
        outside_window: outside.len(),
    }
}

/// Lays out each day of a week independently, without a lane cap.
pub fn layout_week<'a>(
    days: &[DayOccurrences<'a>],
    hours: DayHours,
    min_height_fraction: f64,
) -> Vec<DayLayout<'a>> {
    let options = LayoutOptions {
        min_height_fraction,
        max_parallel_lanes: None,
    };
    days.iter()
        .map(|day| layout_day(&day.occurrences, hours.on(day.date), options))
        .collect()
}
