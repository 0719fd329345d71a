//! TimeBound - an interval end point on the time axis
//!
//! Effective and asserted intervals are half-open `[start, until)`. Either
//! end may be open: a migrated document is effective from the beginning of
//! time and a freshly written revision holds until the end of time.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A point on the time axis extended with both infinities.
///
/// Variant order gives the total order `NegInfinity < At(_) < PosInfinity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeBound {
    NegInfinity,
    At(DateTime<Utc>),
    PosInfinity,
}

impl TimeBound {
    /// Bound at a concrete instant
    pub fn at(instant: DateTime<Utc>) -> Self {
        TimeBound::At(instant)
    }

    /// The concrete instant, if this bound is finite
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            TimeBound::At(instant) => Some(*instant),
            _ => None,
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        matches!(self, TimeBound::At(_))
    }

    /// True if `[start, until)` contains `point`.
    #[inline]
    pub fn interval_contains(start: TimeBound, until: TimeBound, point: TimeBound) -> bool {
        start <= point && point < until
    }

    /// Width of `[start, until)`, or `None` when either end is open.
    pub fn span(start: TimeBound, until: TimeBound) -> Option<Duration> {
        match (start, until) {
            (TimeBound::At(s), TimeBound::At(u)) => Some(u - s),
            _ => None,
        }
    }
}

impl From<DateTime<Utc>> for TimeBound {
    fn from(instant: DateTime<Utc>) -> Self {
        TimeBound::At(instant)
    }
}

impl fmt::Display for TimeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBound::NegInfinity => write!(f, "-inf"),
            TimeBound::At(instant) => write!(f, "{}", instant.to_rfc3339()),
            TimeBound::PosInfinity => write!(f, "+inf"),
        }
    }
}
