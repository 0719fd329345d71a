//! Activator - promotes pending revisions that have come due
//!
//! Per record, in order:
//! 1. re-derive the Current Document, which materializes the record or
//!    removes the document for a tombstone
//! 2. clear `pending` in the ledger (CAS, retried)
//! 3. mirror the record onto its revision document
//!
//! A record stays pending until step 1 has succeeded, so the next pass
//! retries it. Records are independent: one failure is reported and the
//! pass goes on.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::engine::RevisionEngine;
use crate::errors::{TemporalError, TemporalResult};
use crate::ledger::Mutation;
use crate::observability::{Event, MetricsRegistry};
use crate::temporal::TimeBound;

/// A record that could not be promoted
#[derive(Debug, Clone)]
pub struct ActivationFailure {
    pub entity_id: String,
    pub sequence: u64,
    pub error: TemporalError,
}

/// Outcome of one activation pass
#[derive(Debug, Clone, Default)]
pub struct ActivationReport {
    /// `(entity, sequence)` of every promoted record
    pub activated: Vec<(String, u64)>,
    pub failed: Vec<ActivationFailure>,
}

impl ActivationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Activator {
    engine: Arc<RevisionEngine>,
    metrics: Arc<MetricsRegistry>,
}

impl Activator {
    pub fn new(engine: Arc<RevisionEngine>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { engine, metrics }
    }

    /// Promote every pending record whose effective start is at or before `now`.
    pub fn activate_pending(&self, now: DateTime<Utc>) -> TemporalResult<ActivationReport> {
        let mut report = ActivationReport::default();

        for snapshot in self.engine.ledgers().scan_all()? {
            let entity_id = snapshot.ledger.entity_id.clone();
            let due: Vec<u64> = snapshot
                .ledger
                .pending_due(now)
                .iter()
                .map(|r| r.sequence)
                .collect();

            for sequence in due {
                match self.activate(&entity_id, sequence, now) {
                    Ok(true) => {
                        self.metrics.increment_activations();
                        info!(
                            event = Event::RevisionActivated.as_str(),
                            entity = %entity_id,
                            sequence,
                            "pending revision activated"
                        );
                        report.activated.push((entity_id.clone(), sequence));
                    }
                    Ok(false) => {}
                    Err(error) => {
                        self.metrics.increment_activation_failures();
                        warn!(
                            event = Event::RevisionActivationFailed.as_str(),
                            entity = %entity_id,
                            sequence,
                            error = %error,
                            "pending revision not activated"
                        );
                        report.failed.push(ActivationFailure {
                            entity_id: entity_id.clone(),
                            sequence,
                            error,
                        });
                    }
                }
            }
        }

        Ok(report)
    }

    /// Earliest effective start among pending records of every entity, or
    /// +∞ when nothing is pending.
    pub fn next_activation_date(&self) -> TemporalResult<TimeBound> {
        Ok(self
            .engine
            .ledgers()
            .scan_all()?
            .iter()
            .filter_map(|snapshot| snapshot.ledger.next_pending())
            .min()
            .unwrap_or(TimeBound::PosInfinity))
    }

    /// Returns false when another writer already promoted or artifacted the record.
    fn activate(&self, entity_id: &str, sequence: u64, now: DateTime<Utc>) -> TemporalResult<bool> {
        self.engine.refresh_current(now, entity_id)?;

        let (changed, _) = self.engine.ledgers().update(entity_id, |ledger| {
            match ledger.record_mut(sequence) {
                Some(record) if record.pending && record.is_live() => {
                    record.pending = false;
                    Ok(Mutation::Commit(true))
                }
                _ => Ok(Mutation::Skip(false)),
            }
        })?;
        if !changed {
            return Ok(false);
        }

        self.engine.mirror_record(entity_id, sequence)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::WakeSignal;
    use crate::config::TemporalSettings;
    use crate::engine::TemporalContext;
    use crate::store::{DocumentMetadata, DocumentStore, ExpectedVersion, InMemoryStore};
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn date(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, m, d, 0, 0, 0).unwrap()
    }

    fn setup() -> (Arc<InMemoryStore>, Arc<RevisionEngine>, Activator) {
        let store = Arc::new(InMemoryStore::new());
        let metrics = Arc::new(MetricsRegistry::new());
        let engine = Arc::new(RevisionEngine::new(
            store.clone() as Arc<dyn DocumentStore>,
            Arc::new(TemporalSettings::default()),
            metrics.clone(),
            Arc::new(WakeSignal::new(Duration::hours(1))),
        ));
        let activator = Activator::new(engine.clone(), metrics);
        (store, engine, activator)
    }

    fn put_at(engine: &RevisionEngine, key: &str, now: DateTime<Utc>, effective: DateTime<Utc>) {
        engine
            .put_revision(
                &TemporalContext::new(now),
                key,
                json!({ "key": key }),
                DocumentMetadata::for_entity("Employees").with_effective(effective),
            )
            .unwrap();
    }

    #[test]
    fn test_next_activation_date() {
        let (_, engine, activator) = setup();
        assert_eq!(activator.next_activation_date().unwrap(), TimeBound::PosInfinity);

        put_at(&engine, "employees/1", date(1, 1), date(3, 1));
        put_at(&engine, "employees/2", date(1, 1), date(2, 1));
        assert_eq!(
            activator.next_activation_date().unwrap(),
            TimeBound::at(date(2, 1))
        );
    }

    #[test]
    fn test_activates_only_due_records() {
        let (store, engine, activator) = setup();
        put_at(&engine, "employees/1", date(1, 1), date(2, 1));
        put_at(&engine, "employees/2", date(1, 1), date(4, 1));
        assert!(store.get("employees/1").unwrap().is_none());

        let report = activator.activate_pending(date(3, 1)).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.activated, vec![("employees/1".to_string(), 1)]);

        let current = store.get("employees/1").unwrap().unwrap();
        assert_eq!(current.metadata.temporal.revision_number, Some(1));
        assert!(!current.metadata.temporal.pending);
        let rev = store.get("employees/1/temporalrevisions/1").unwrap().unwrap();
        assert!(!rev.metadata.temporal.pending);

        assert!(store.get("employees/2").unwrap().is_none());
        assert_eq!(
            activator.next_activation_date().unwrap(),
            TimeBound::at(date(4, 1))
        );
    }

    #[test]
    fn test_activation_is_idempotent() {
        let (_, engine, activator) = setup();
        put_at(&engine, "employees/1", date(1, 1), date(2, 1));
        assert_eq!(activator.activate_pending(date(3, 1)).unwrap().activated.len(), 1);
        assert!(activator.activate_pending(date(3, 1)).unwrap().activated.is_empty());
    }

    #[test]
    fn test_pending_tombstone_removes_current() {
        let (store, engine, activator) = setup();
        put_at(&engine, "employees/1", date(1, 1), date(1, 1));
        engine
            .delete(
                &TemporalContext::new(date(1, 1)),
                "employees/1",
                DocumentMetadata::for_entity("Employees").with_effective(date(2, 1)),
            )
            .unwrap();
        assert!(store.get("employees/1").unwrap().is_some());

        activator.activate_pending(date(2, 1)).unwrap();
        assert!(store.get("employees/1").unwrap().is_none());
    }

    #[test]
    fn test_failures_are_isolated() {
        let (store, engine, activator) = setup();
        put_at(&engine, "employees/1", date(1, 1), date(2, 1));
        put_at(&engine, "employees/2", date(1, 1), date(2, 1));
        store.fail_writes_to("employees/1");

        let report = activator.activate_pending(date(3, 1)).unwrap();
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].entity_id, "employees/1");
        assert_eq!(report.activated, vec![("employees/2".to_string(), 1)]);

        // Still pending, so the next pass picks it up
        store.clear_failures();
        let report = activator.activate_pending(date(3, 1)).unwrap();
        assert_eq!(report.activated, vec![("employees/1".to_string(), 1)]);
        assert!(store.get("employees/1").unwrap().is_some());
    }

    #[test]
    fn test_undecodable_ledger_does_not_stall_pass() {
        let (store, engine, activator) = setup();
        store
            .put(
                "legacy/temporalhistory",
                ExpectedVersion::Any,
                json!("garbage"),
                DocumentMetadata::default(),
            )
            .unwrap();
        put_at(&engine, "employees/2", date(1, 1), date(2, 1));

        assert_eq!(
            activator.next_activation_date().unwrap(),
            TimeBound::at(date(2, 1))
        );
        let report = activator.activate_pending(date(3, 1)).unwrap();
        assert_eq!(report.activated, vec![("employees/2".to_string(), 1)]);
        assert!(store.get("employees/2").unwrap().is_some());
    }
}
