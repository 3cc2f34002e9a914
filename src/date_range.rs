//! Date-interval value type consumed by the mapping engine.
//!
//! A `DateRange` is an immutable pair of timestamps normalized at
//! construction: endpoints are clamped into explicit [`DateBounds`] and
//! ordered so `start <= finish` always holds. Bounds are passed in rather
//! than read from process-wide state, so tests cannot interfere with each
//! other by mutating shared clamps.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};
use crate::mapper::{FromXml, ReadContext, ToXml, WriteContext};

/// Round-trippable text format for mapped date-times.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Inclusive clamp bounds applied at `DateRange` construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

impl Default for DateBounds {
    fn default() -> Self {
        Self {
            min: NaiveDate::from_ymd_opt(1753, 1, 1)
                .expect("valid constant date")
                .and_hms_opt(0, 0, 0)
                .expect("valid constant time"),
            max: NaiveDate::from_ymd_opt(9999, 12, 31)
                .expect("valid constant date")
                .and_hms_opt(23, 59, 59)
                .expect("valid constant time"),
        }
    }
}

impl DateBounds {
    fn clamp(&self, value: NaiveDateTime) -> NaiveDateTime {
        value.max(self.min).min(self.max)
    }
}

/// Position of a point in time relative to a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeState {
    Past,
    Current,
    Future,
}

/// Immutable start/finish interval with structural equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDateTime,
    finish: NaiveDateTime,
}

impl DateRange {
    /// Construct with the default bounds.
    pub fn new(start: NaiveDateTime, finish: NaiveDateTime) -> Self {
        Self::with_bounds(start, finish, &DateBounds::default())
    }

    /// Construct with explicit bounds; endpoints outside the bounds are
    /// clamped, reversed endpoints are swapped.
    pub fn with_bounds(start: NaiveDateTime, finish: NaiveDateTime, bounds: &DateBounds) -> Self {
        let (start, finish) = if start <= finish {
            (start, finish)
        } else {
            (finish, start)
        };
        Self {
            start: bounds.clamp(start),
            finish: bounds.clamp(finish),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn finish(&self) -> NaiveDateTime {
        self.finish
    }

    /// Whether `point` lies within the range, endpoints included.
    pub fn contains(&self, point: NaiveDateTime) -> bool {
        self.start <= point && point <= self.finish
    }

    /// Whether `other` lies entirely within this range.
    pub fn contains_range(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.finish <= self.finish
    }

    /// The envelope of both ranges: minimum start, maximum finish.
    pub fn union(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            finish: self.finish.max(other.finish),
        }
    }

    /// Whether the ranges share no point at all.
    pub fn disjoint(&self, other: &DateRange) -> bool {
        self.finish < other.start || other.finish < self.start
    }

    /// Classify `point` relative to the range.
    pub fn determine_state(&self, point: NaiveDateTime) -> DateRangeState {
        if point < self.start {
            DateRangeState::Past
        } else if point > self.finish {
            DateRangeState::Future
        } else {
            DateRangeState::Current
        }
    }

    /// A copy of the range with a new start.
    pub fn change_start(&self, start: NaiveDateTime) -> DateRange {
        DateRange::new(start, self.finish)
    }

    /// A copy of the range with the start shifted by `delta`.
    pub fn change_start_by(&self, delta: Duration) -> DateRange {
        DateRange::new(self.start + delta, self.finish)
    }

    /// A copy of the range with a new finish.
    pub fn change_finish(&self, finish: NaiveDateTime) -> DateRange {
        DateRange::new(self.start, finish)
    }

    /// A copy of the range with the finish shifted by `delta`.
    pub fn change_finish_by(&self, delta: Duration) -> DateRange {
        DateRange::new(self.start, self.finish + delta)
    }
}

/// Ready-made mapping action for [`DateRange`]: `start`/`finish` child
/// elements holding [`DATE_TIME_FORMAT`] text.
#[derive(Debug, Clone, Default)]
pub struct DateRangeMapper {
    bounds: DateBounds,
}

impl DateRangeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply custom clamp bounds to deserialized ranges.
    pub fn with_bounds(bounds: DateBounds) -> Self {
        Self { bounds }
    }

    fn read_endpoint(&self, context: &ReadContext<'_>, field: &str) -> Result<NaiveDateTime> {
        let text: String = context.required(field, field)?;
        NaiveDateTime::parse_from_str(&text, DATE_TIME_FORMAT).map_err(|_| {
            MappingError::ValueFormat {
                field: field.to_string(),
                value: text,
                expected: "date-time".to_string(),
            }
        })
    }
}

impl ToXml<DateRange> for DateRangeMapper {
    fn to_xml(&self, value: &DateRange, context: &mut WriteContext<'_>) -> Result<()> {
        context.element("start", &value.start().format(DATE_TIME_FORMAT))?;
        context.element("finish", &value.finish().format(DATE_TIME_FORMAT))
    }
}

impl FromXml<DateRange> for DateRangeMapper {
    fn from_xml(&self, context: &ReadContext<'_>) -> Result<DateRange> {
        let start = self.read_endpoint(context, "start")?;
        let finish = self.read_endpoint(context, "finish")?;
        Ok(DateRange::with_bounds(start, finish, &self.bounds))
    }
}
