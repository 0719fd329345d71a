//! Revision insertion
//!
//! Inserting a revision effective at `E`:
//! 1. every live record starting at or after `E` becomes an artifact
//! 2. the live record with the greatest start before `E` is closed at `E`
//! 3. the new record spans `[E, +∞)`
//!
//! Pure ledger mutation. Persisting the ledger and projecting it onto
//! revision documents is the revision engine's job.

use chrono::{DateTime, Utc};

use super::{Ledger, RevisionRecord};
use crate::temporal::{TemporalStatus, TimeBound};

/// What an insertion changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Sequence number of the new record
    pub sequence: u64,
    /// Records demoted to artifacts, in effective order
    pub artifacted: Vec<u64>,
    /// Predecessor whose interval was closed at the new record's start
    pub closed: Option<u64>,
}

impl Insertion {
    /// Every pre-existing record whose stored metadata changed
    pub fn touched(&self) -> impl Iterator<Item = u64> + '_ {
        self.artifacted.iter().copied().chain(self.closed)
    }
}

impl Ledger {
    /// Insert a revision effective at `effective`, asserted at `now`.
    pub fn insert_revision(
        &mut self,
        effective: TimeBound,
        now: DateTime<Utc>,
        deleted: bool,
    ) -> Insertion {
        let asserted = TimeBound::at(now);
        let sequence = self.next_sequence();

        let artifacted: Vec<u64> = self
            .revisions_from(effective)
            .iter()
            .map(|r| r.sequence)
            .collect();
        for seq in &artifacted {
            if let Some(record) = self.record_mut(*seq) {
                record.status = TemporalStatus::Artifact;
                record.asserted_until = asserted;
            }
        }

        let closed = self.last_before(effective).map(|r| r.sequence);
        if let Some(seq) = closed {
            if let Some(record) = self.record_mut(seq) {
                record.effective_until = effective;
                record.asserted_until = asserted;
            }
        }

        self.push(RevisionRecord {
            sequence,
            status: TemporalStatus::Revision,
            deleted,
            pending: effective > asserted,
            effective_start: effective,
            effective_until: TimeBound::PosInfinity,
            asserted_start: asserted,
            asserted_until: TimeBound::PosInfinity,
        });

        Insertion {
            sequence,
            artifacted,
            closed,
        }
    }
}
