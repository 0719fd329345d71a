//! Ledger - ordered revision history of one entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RevisionRecord;
use crate::temporal::{revision_key, TimeBound};

/// The authoritative history of one entity.
///
/// Records are kept ordered by `(effective_start, sequence)`. Artifacts stay
/// in the ledger for audit and are skipped by every query helper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ledger {
    pub entity_id: String,

    /// Entity name the versioning configuration was resolved against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(default)]
    revisions: Vec<RevisionRecord>,
}

impl Ledger {
    /// Empty ledger for an entity
    pub fn new(entity_id: impl Into<String>, entity_name: Option<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_name,
            revisions: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// All records, artifacts included, ordered by effective start.
    #[inline]
    pub fn records(&self) -> &[RevisionRecord] {
        &self.revisions
    }

    /// Next unused sequence number.
    ///
    /// Records are never removed, so this equals `len() + 1` for any ledger
    /// built through the revision engine.
    pub fn next_sequence(&self) -> u64 {
        self.revisions
            .iter()
            .map(|r| r.sequence)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Key of the revision document backing `sequence`
    pub fn revision_key(&self, sequence: u64) -> String {
        revision_key(&self.entity_id, sequence)
    }

    /// Insert a record, keeping effective-start order.
    pub fn push(&mut self, record: RevisionRecord) {
        let idx = self.revisions.partition_point(|r| {
            (r.effective_start, r.sequence) <= (record.effective_start, record.sequence)
        });
        self.revisions.insert(idx, record);
    }

    pub fn record(&self, sequence: u64) -> Option<&RevisionRecord> {
        self.revisions.iter().find(|r| r.sequence == sequence)
    }

    pub fn record_mut(&mut self, sequence: u64) -> Option<&mut RevisionRecord> {
        self.revisions.iter_mut().find(|r| r.sequence == sequence)
    }

    /// Non-artifact records
    pub fn live(&self) -> impl Iterator<Item = &RevisionRecord> {
        self.revisions.iter().filter(|r| r.is_live())
    }

    /// The servable record whose effective interval contains `as_of`.
    ///
    /// When an in-flight write leaves overlapping candidates, the narrowest
    /// interval wins and ties go to the highest sequence number.
    pub fn revision_effective_at(&self, as_of: TimeBound) -> Option<&RevisionRecord> {
        self.live()
            .filter(|r| r.contains(as_of))
            .min_by_key(|r| r.narrowness_key())
    }

    /// Live records starting on or after `start`, in effective order
    pub fn revisions_from(&self, start: TimeBound) -> Vec<&RevisionRecord> {
        self.live().filter(|r| r.effective_start >= start).collect()
    }

    /// The live record with the greatest effective start strictly before `date`
    pub fn last_before(&self, date: TimeBound) -> Option<&RevisionRecord> {
        self.live()
            .filter(|r| r.effective_start < date)
            .max_by_key(|r| (r.effective_start, r.sequence))
    }

    /// Pending live records that have become due at `now`, in effective order
    pub fn pending_due(&self, now: DateTime<Utc>) -> Vec<&RevisionRecord> {
        let now = TimeBound::at(now);
        self.live()
            .filter(|r| r.pending && r.effective_start <= now)
            .collect()
    }

    /// Earliest effective start among pending live records
    pub fn next_pending(&self) -> Option<TimeBound> {
        self.live()
            .filter(|r| r.pending)
            .map(|r| r.effective_start)
            .min()
    }
}
