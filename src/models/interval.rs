//! Date interval model.
//!
//! # Boundary Convention
//! Intervals are inclusive-start, exclusive-end for overlap purposes:
//! a phase ending on day N and another starting on day N are adjacent,
//! not overlapping. An unbounded end extends to positive infinity.
//!
//! Day counts follow calendar convention instead: [`Interval::duration_days`]
//! is `end - start + 1`, so an interval with `start == end` lasts one day.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A date range `[start, end)`, or `[start, ∞)` when `end` is `None`.
///
/// Constructed only through [`Interval::new`], [`Interval::bounded`],
/// [`Interval::open_ended`] or [`Interval::day`], so `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    start: NaiveDate,
    end: Option<NaiveDate>,
}

impl Interval {
    /// Creates an interval, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self> {
        if let Some(end) = end {
            if start > end {
                return Err(EngineError::InvalidInterval { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Creates a bounded interval.
    pub fn bounded(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(start, Some(end))
    }

    /// Creates an ongoing interval with no end.
    pub fn open_ended(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    /// The one-day interval `[date, date + 1)`.
    ///
    /// Overlaps exactly the intervals active on `date`.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date.checked_add_days(Days::new(1)),
        }
    }

    /// Builds an interval from endpoints already known to be ordered.
    pub(crate) fn from_ordered(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        debug_assert!(end.map_or(true, |end| start <= end));
        Self { start, end }
    }

    /// Interval start (inclusive).
    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Interval end (exclusive), `None` if ongoing.
    #[inline]
    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Whether the interval has no end.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.end.is_none()
    }

    /// Returns a copy ending on `end`.
    pub fn with_end(&self, end: NaiveDate) -> Result<Self> {
        Self::bounded(self.start, end)
    }

    /// Whether two intervals overlap.
    ///
    /// `a.start < b.end && b.start < a.end`, with unbounded ends treated as
    /// infinity. Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        before_end(self.start, other.end) && before_end(other.start, self.end)
    }

    /// Whether `date` lies in `[start, end)`.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && before_end(date, self.end)
    }

    /// Inclusive calendar-day count: `end - start + 1`.
    ///
    /// Fails for unbounded intervals.
    pub fn duration_days(&self) -> Result<i64> {
        match self.end {
            Some(end) => Ok((end - self.start).num_days() + 1),
            None => Err(EngineError::UnboundedDuration { start: self.start }),
        }
    }

    /// Common part of two overlapping intervals.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let start = self.start.max(other.start);
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };
        Some(Self { start, end })
    }
}

/// `date < end`, where `None` is infinity.
#[inline]
fn before_end(date: NaiveDate, end: Option<NaiveDate>) -> bool {
    end.map_or(true, |end| date < end)
}

/// Overlap predicate as a free function.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.overlaps(b)
}

/// Inclusive day count as a free function.
pub fn duration_days(interval: &Interval) -> Result<i64> {
    interval.duration_days()
}

// Deserialization re-checks the start <= end invariant.
impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            start: NaiveDate,
            #[serde(default)]
            end: Option<NaiveDate>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Interval::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
