//! Bitemporal metadata stamped on temporal documents

use serde::{Deserialize, Serialize};

use super::{TemporalStatus, TimeBound};

/// The temporal fields of a document's metadata.
///
/// Every field is optional on the wire: a document written before tracking
/// was enabled carries none of them and reads back as `NonTemporal`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemporalMetadata {
    #[serde(default)]
    pub status: TemporalStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_number: Option<u64>,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub pending: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_start: Option<TimeBound>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_until: Option<TimeBound>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asserted_start: Option<TimeBound>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asserted_until: Option<TimeBound>,

    /// Effective date requested by a writer. Consumed by the revision
    /// engine, never persisted.
    #[serde(skip)]
    pub requested_effective: Option<TimeBound>,
}

impl TemporalMetadata {
    /// Metadata with an effective date requested for the next write
    pub fn effective_at(effective: impl Into<TimeBound>) -> Self {
        Self {
            requested_effective: Some(effective.into()),
            ..Self::default()
        }
    }

    /// True if the stored effective interval contains `point`.
    ///
    /// Documents without a recorded interval contain nothing.
    pub fn effective_contains(&self, point: TimeBound) -> bool {
        match (self.effective_start, self.effective_until) {
            (Some(start), Some(until)) => TimeBound::interval_contains(start, until, point),
            _ => false,
        }
    }

    pub fn is_non_temporal(&self) -> bool {
        self.status == TemporalStatus::NonTemporal
    }
}
