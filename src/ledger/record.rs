//! RevisionRecord - one entry of a ledger

use serde::{Deserialize, Serialize};

use crate::temporal::{TemporalMetadata, TemporalStatus, TimeBound};

/// A single date-ranged revision of an entity.
///
/// Intervals are half-open: the record's content is true over
/// `[effective_start, effective_until)` and was believed over
/// `[asserted_start, asserted_until)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RevisionRecord {
    /// Per-entity sequence number, never reused
    pub sequence: u64,
    pub status: TemporalStatus,
    pub deleted: bool,
    pub pending: bool,
    pub effective_start: TimeBound,
    pub effective_until: TimeBound,
    pub asserted_start: TimeBound,
    pub asserted_until: TimeBound,
}

impl RevisionRecord {
    /// Not an artifact
    #[inline]
    pub fn is_live(&self) -> bool {
        self.status != TemporalStatus::Artifact
    }

    #[inline]
    pub fn contains(&self, point: TimeBound) -> bool {
        TimeBound::interval_contains(self.effective_start, self.effective_until, point)
    }

    /// Sort key preferring the narrowest interval, then the most recently
    /// asserted record. Smaller is better.
    pub(crate) fn narrowness_key(&self) -> (bool, Option<chrono::Duration>, std::cmp::Reverse<u64>) {
        let span = TimeBound::span(self.effective_start, self.effective_until);
        (span.is_none(), span, std::cmp::Reverse(self.sequence))
    }

    /// Metadata stamped on the revision document mirroring this record
    pub fn to_metadata(&self) -> TemporalMetadata {
        TemporalMetadata {
            status: self.status,
            revision_number: Some(self.sequence),
            deleted: self.deleted,
            pending: self.pending,
            effective_start: Some(self.effective_start),
            effective_until: Some(self.effective_until),
            asserted_start: Some(self.asserted_start),
            asserted_until: Some(self.asserted_until),
            requested_effective: None,
        }
    }

    /// Metadata for the Current Document materialized from this record
    pub fn to_current_metadata(&self) -> TemporalMetadata {
        TemporalMetadata {
            status: TemporalStatus::Current,
            deleted: false,
            pending: false,
            ..self.to_metadata()
        }
    }
}
