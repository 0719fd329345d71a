//! Request Context
//!
//! Carries the request's notion of "now" and the effective/as-of dates
//! explicitly through every write and read.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::temporal::TimeBound;

/// Context carried through one temporal request
#[derive(Debug, Clone)]
pub struct TemporalContext {
    /// Request ID for tracing
    pub request_id: Uuid,

    /// The instant the request is evaluated at
    pub now: DateTime<Utc>,

    /// Effective date for writes. Overridden by a date requested in the
    /// written document's metadata.
    pub effective: Option<TimeBound>,

    /// Effective date reads are resolved at. Defaults to `now`.
    pub as_of: Option<TimeBound>,
}

impl TemporalContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            now,
            effective: None,
            as_of: None,
        }
    }

    pub fn with_effective(mut self, effective: impl Into<TimeBound>) -> Self {
        self.effective = Some(effective.into());
        self
    }

    pub fn with_as_of(mut self, as_of: impl Into<TimeBound>) -> Self {
        self.as_of = Some(as_of.into());
        self
    }

    #[inline]
    pub fn now_bound(&self) -> TimeBound {
        TimeBound::at(self.now)
    }

    /// The date a read resolves at
    pub fn as_of_or_now(&self) -> TimeBound {
        self.as_of.unwrap_or_else(|| self.now_bound())
    }
}
