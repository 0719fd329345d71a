//! RevisionEngine - the temporal write path
//!
//! Write order for every revision:
//! 1. insert into the ledger under CAS (reserves the sequence number)
//! 2. write the revision document at `entity + SEP + sequence`
//! 3. mirror the ledger onto revision documents it changed
//! 4. re-derive the Current Document from the ledger
//!
//! The ledger is authoritative. Revision document metadata and the Current
//! Document are projections that readers tolerate being briefly stale.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::TemporalContext;
use crate::activation::WakeSignal;
use crate::config::TemporalSettings;
use crate::errors::{TemporalError, TemporalResult};
use crate::ledger::{Ledger, LedgerRepository, Mutation, RevisionRecord};
use crate::observability::{Event, MetricsRegistry};
use crate::store::{Document, DocumentMetadata, DocumentStore, ExpectedVersion, StoreError};
use crate::temporal::{
    parse_revision_key, reject_internal_key, revision_key, revision_prefix, TimeBound,
};

/// What happened to the Current Document after a ledger change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentChange {
    Unchanged,
    /// Rewritten from the revision with this sequence number
    Materialized(u64),
    Removed,
}

/// Result of a successful revision write
#[derive(Debug, Clone)]
pub struct StoredRevision {
    pub entity_id: String,
    /// The new record as committed to the ledger
    pub record: RevisionRecord,
    /// Records demoted to artifacts by this write
    pub artifacted: Vec<u64>,
    /// Predecessor closed at the new record's start
    pub closed: Option<u64>,
    pub current: CurrentChange,
}

impl StoredRevision {
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.record.sequence
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.record.pending
    }
}

/// Creates revisions, closes and artifacts their neighbours, and keeps the
/// Current Document in step with the ledger.
///
/// Callers decide whether a key is tracked; the engine assumes it is.
pub struct RevisionEngine {
    store: Arc<dyn DocumentStore>,
    ledgers: LedgerRepository,
    settings: Arc<TemporalSettings>,
    metrics: Arc<MetricsRegistry>,
    wake: Arc<WakeSignal>,
}

impl RevisionEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        settings: Arc<TemporalSettings>,
        metrics: Arc<MetricsRegistry>,
        wake: Arc<WakeSignal>,
    ) -> Self {
        let ledgers = LedgerRepository::new(
            Arc::clone(&store),
            Arc::clone(&metrics),
            settings.max_conflict_retries,
        );
        Self {
            store,
            ledgers,
            settings,
            metrics,
            wake,
        }
    }

    pub fn ledgers(&self) -> &LedgerRepository {
        &self.ledgers
    }

    /// Current ledger of `entity_id` (empty if never written)
    pub fn ledger(&self, entity_id: &str) -> TemporalResult<Ledger> {
        Ok(self.ledgers.load(entity_id)?.ledger)
    }

    /// Store `content` as a new revision of `entity_id`.
    ///
    /// The effective date is the one requested in `metadata`, else the
    /// context's, else `ctx.now`.
    pub fn put_revision(
        &self,
        ctx: &TemporalContext,
        entity_id: &str,
        content: Value,
        metadata: DocumentMetadata,
    ) -> TemporalResult<StoredRevision> {
        reject_internal_key(entity_id)?;

        let effective = metadata
            .temporal
            .requested_effective
            .or(ctx.effective)
            .unwrap_or_else(|| ctx.now_bound());

        self.migrate(ctx, entity_id)?;
        self.store_revision(ctx, entity_id, content, metadata, effective, false)
    }

    /// Store a tombstone revision of `entity_id`.
    ///
    /// Requires an effective date, from `metadata` or the context.
    pub fn delete(
        &self,
        ctx: &TemporalContext,
        entity_id: &str,
        metadata: DocumentMetadata,
    ) -> TemporalResult<StoredRevision> {
        reject_internal_key(entity_id)?;

        let effective = metadata
            .temporal
            .requested_effective
            .or(ctx.effective)
            .ok_or_else(|| {
                TemporalError::validation(format!(
                    "Delete of {} requires an effective date",
                    entity_id
                ))
            })?;

        self.migrate(ctx, entity_id)?;

        let (content, mut tombstone_meta) = self.tombstone_source(entity_id)?;
        if metadata.entity_name.is_some() {
            tombstone_meta.entity_name = metadata.entity_name;
        }
        self.store_revision(ctx, entity_id, content, tombstone_meta, effective, true)
    }

    /// Turn a pre-existing non-temporal Current Document into revision 1,
    /// effective from the beginning of time.
    ///
    /// Returns the new record, or `None` if there was nothing to migrate or
    /// another writer migrated first.
    pub fn migrate(
        &self,
        ctx: &TemporalContext,
        entity_id: &str,
    ) -> TemporalResult<Option<RevisionRecord>> {
        let current = match self.store.get(entity_id)? {
            Some(doc) if doc.metadata.temporal.is_non_temporal() => doc,
            _ => return Ok(None),
        };
        if !self.ledgers.load(entity_id)?.ledger.is_empty() {
            return Ok(None);
        }

        let mut ledger = Ledger::new(entity_id, current.metadata.entity_name.clone());
        let insertion = ledger.insert_revision(TimeBound::NegInfinity, ctx.now, false);
        match self.ledgers.save(&ledger, None) {
            Ok(_) => {}
            Err(e) if e.is_store_conflict() => return Ok(None),
            Err(e) => return Err(e),
        }

        let record = committed(&ledger, insertion.sequence)?;
        self.write_revision_document(
            entity_id,
            &record,
            ledger.entity_name.clone(),
            current.content,
            current.metadata.attributes,
        )?;
        self.mirror_record(entity_id, record.sequence)?;
        self.refresh_current(ctx.now, entity_id)?;

        self.metrics.increment_migrations();
        info!(
            event = Event::MigrationPerformed.as_str(),
            request_id = %ctx.request_id,
            entity = entity_id,
            "non-temporal document migrated to revision 1"
        );
        Ok(Some(record))
    }

    /// Delete the Current Document, every revision document and the ledger.
    ///
    /// Returns the number of documents removed.
    pub fn purge(&self, ctx: &TemporalContext, entity_id: &str) -> TemporalResult<usize> {
        reject_internal_key(entity_id)?;

        let mut removed = 0;
        for doc in self.store.scan_by_prefix(&revision_prefix(entity_id))? {
            if self.store.delete(&doc.key, ExpectedVersion::Any)? {
                removed += 1;
            }
        }
        if self.store.delete(entity_id, ExpectedVersion::Any)? {
            removed += 1;
        }
        if self.ledgers.delete(entity_id)? {
            removed += 1;
        }

        info!(
            event = Event::EntityPurged.as_str(),
            request_id = %ctx.request_id,
            entity = entity_id,
            removed,
            "entity purged"
        );
        Ok(removed)
    }

    /// Page through the revision documents of `entity_id` in sequence order.
    ///
    /// Metadata is overlaid from the ledger, so artifacts read as artifacts
    /// even if their documents have not been mirrored yet.
    pub fn revisions_for(
        &self,
        entity_id: &str,
        start: usize,
        page_size: usize,
    ) -> TemporalResult<Vec<Document>> {
        let ledger = self.ledger(entity_id)?;

        let mut revisions: Vec<(u64, Document)> = self
            .store
            .scan_by_prefix(&revision_prefix(entity_id))?
            .into_iter()
            .filter_map(|doc| match parse_revision_key(&doc.key) {
                Some((entity, sequence)) if entity == entity_id => Some((sequence, doc)),
                _ => None,
            })
            .collect();
        revisions.sort_by_key(|(sequence, _)| *sequence);

        Ok(revisions
            .into_iter()
            .skip(start)
            .take(page_size)
            .map(|(sequence, mut doc)| {
                if let Some(record) = ledger.record(sequence) {
                    doc.metadata.temporal = record.to_metadata();
                }
                doc
            })
            .collect())
    }

    /// The full ledger of `entity_id`, artifacts included.
    pub fn history_for(&self, entity_id: &str) -> TemporalResult<Ledger> {
        reject_internal_key(entity_id)?;
        if entity_id.starts_with(&self.settings.system_prefix) {
            return Err(TemporalError::validation(format!(
                "System document {} has no temporal history",
                entity_id
            )));
        }
        self.ledger(entity_id)
    }

    fn store_revision(
        &self,
        ctx: &TemporalContext,
        entity_id: &str,
        content: Value,
        metadata: DocumentMetadata,
        effective: TimeBound,
        deleted: bool,
    ) -> TemporalResult<StoredRevision> {
        let entity_name = metadata.entity_name.clone();
        let (insertion, ledger) = self.ledgers.update(entity_id, |ledger| {
            if ledger.entity_name.is_none() {
                ledger.entity_name = entity_name.clone();
            }
            Ok(Mutation::Commit(ledger.insert_revision(
                effective, ctx.now, deleted,
            )))
        })?;

        let record = committed(&ledger, insertion.sequence)?;
        self.write_revision_document(
            entity_id,
            &record,
            ledger.entity_name.clone(),
            content,
            metadata.attributes,
        )?;

        for sequence in &insertion.artifacted {
            debug!(
                event = Event::RevisionArtifacted.as_str(),
                request_id = %ctx.request_id,
                entity = entity_id,
                sequence,
                superseded_by = insertion.sequence,
                "revision demoted to artifact"
            );
        }
        if let Some(sequence) = insertion.closed {
            debug!(
                event = Event::IntervalClosed.as_str(),
                request_id = %ctx.request_id,
                entity = entity_id,
                sequence,
                until = %effective,
                "predecessor interval closed"
            );
        }
        // The new record too: a concurrent insert may have demoted it
        // between the ledger save and the document write
        for sequence in insertion.touched().chain([insertion.sequence]) {
            self.mirror_record(entity_id, sequence)?;
        }

        let current = self.refresh_current(ctx.now, entity_id)?;

        if record.pending {
            self.wake.reset(record.effective_start, ctx.now);
        }

        self.metrics.add_artifacts(insertion.artifacted.len() as u64);
        let event = if deleted {
            self.metrics.increment_tombstones_stored();
            Event::TombstoneStored
        } else {
            self.metrics.increment_revisions_stored();
            Event::RevisionStored
        };
        info!(
            event = event.as_str(),
            request_id = %ctx.request_id,
            entity = entity_id,
            sequence = record.sequence,
            effective = %record.effective_start,
            pending = record.pending,
            artifacted = insertion.artifacted.len(),
            "revision stored"
        );

        Ok(StoredRevision {
            entity_id: entity_id.to_string(),
            record,
            artifacted: insertion.artifacted,
            closed: insertion.closed,
            current,
        })
    }

    /// Content and metadata a tombstone carries: the Current Document if
    /// present, else the most recently asserted live revision.
    fn tombstone_source(&self, entity_id: &str) -> TemporalResult<(Value, DocumentMetadata)> {
        if let Some(current) = self.store.get(entity_id)? {
            let metadata = DocumentMetadata {
                entity_name: current.metadata.entity_name,
                temporal: Default::default(),
                attributes: current.metadata.attributes,
            };
            return Ok((current.content, metadata));
        }

        let ledger = self.ledger(entity_id)?;
        let latest = ledger.live().max_by_key(|r| r.sequence).map(|r| r.sequence);
        if let Some(sequence) = latest {
            if let Some(doc) = self.store.get(&ledger.revision_key(sequence))? {
                let metadata = DocumentMetadata {
                    entity_name: ledger.entity_name.clone().or(doc.metadata.entity_name),
                    temporal: Default::default(),
                    attributes: doc.metadata.attributes,
                };
                return Ok((doc.content, metadata));
            }
        }

        Ok((
            Value::Null,
            DocumentMetadata {
                entity_name: ledger.entity_name,
                ..DocumentMetadata::default()
            },
        ))
    }

    fn write_revision_document(
        &self,
        entity_id: &str,
        record: &RevisionRecord,
        entity_name: Option<String>,
        content: Value,
        attributes: std::collections::BTreeMap<String, Value>,
    ) -> TemporalResult<()> {
        let metadata = DocumentMetadata {
            entity_name,
            temporal: record.to_metadata(),
            attributes,
        };
        // The sequence number was reserved by the ledger save, so the key is fresh
        self.store.put(
            &revision_key(entity_id, record.sequence),
            ExpectedVersion::Absent,
            content,
            metadata,
        )?;
        Ok(())
    }

    /// Copy the ledger's view of record `sequence` onto its revision document.
    pub(crate) fn mirror_record(&self, entity_id: &str, sequence: u64) -> TemporalResult<()> {
        let key = revision_key(entity_id, sequence);

        for _ in 0..self.settings.max_conflict_retries {
            // Document before ledger, so a stale ledger read loses the CAS
            let doc = match self.store.get(&key)? {
                Some(doc) => doc,
                None => {
                    warn!(
                        event = Event::RevisionDocumentMissing.as_str(),
                        entity = entity_id,
                        sequence,
                        "revision document missing, metadata not mirrored"
                    );
                    return Ok(());
                }
            };
            let record = match self.ledger(entity_id)?.record(sequence) {
                Some(record) => record.clone(),
                None => return Ok(()),
            };

            let temporal = record.to_metadata();
            if doc.metadata.temporal == temporal {
                return Ok(());
            }
            let metadata = DocumentMetadata {
                temporal,
                ..doc.metadata
            };
            match self
                .store
                .put(&key, ExpectedVersion::Exactly(doc.version), doc.content, metadata)
            {
                Ok(_) => return Ok(()),
                Err(StoreError::Conflict { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(TemporalError::Conflict {
            key,
            attempts: self.settings.max_conflict_retries,
        })
    }

    /// Re-derive the Current Document from the ledger as of `now`.
    ///
    /// The document is rewritten when the effective revision or its interval
    /// changed, and removed when nothing (or a tombstone) is effective.
    pub(crate) fn refresh_current(
        &self,
        now: DateTime<Utc>,
        entity_id: &str,
    ) -> TemporalResult<CurrentChange> {
        for _ in 0..self.settings.max_conflict_retries {
            let current = self.store.get(entity_id)?;
            let ledger = self.ledger(entity_id)?;
            if ledger.is_empty() {
                return Ok(CurrentChange::Unchanged);
            }
            let target = ledger
                .revision_effective_at(TimeBound::at(now))
                .filter(|r| !r.deleted)
                .cloned();

            let attempt = match (target, current) {
                (None, None) => return Ok(CurrentChange::Unchanged),
                (None, Some(doc)) => self
                    .store
                    .delete(entity_id, ExpectedVersion::Exactly(doc.version))
                    .map(|_| CurrentChange::Removed),
                (Some(record), current) => {
                    let temporal = record.to_current_metadata();
                    if matches!(&current, Some(doc) if doc.metadata.temporal == temporal) {
                        return Ok(CurrentChange::Unchanged);
                    }
                    let source = match self.store.get(&ledger.revision_key(record.sequence))? {
                        Some(source) => source,
                        None => {
                            warn!(
                                event = Event::RevisionDocumentMissing.as_str(),
                                entity = entity_id,
                                sequence = record.sequence,
                                "revision document missing, current document left as is"
                            );
                            return Ok(CurrentChange::Unchanged);
                        }
                    };
                    let metadata = DocumentMetadata {
                        entity_name: ledger.entity_name.clone().or(source.metadata.entity_name),
                        temporal,
                        attributes: source.metadata.attributes,
                    };
                    let expected =
                        ExpectedVersion::from_observed(current.as_ref().map(|d| d.version));
                    self.store
                        .put(entity_id, expected, source.content, metadata)
                        .map(|_| CurrentChange::Materialized(record.sequence))
                }
            };

            match attempt {
                Ok(change) => {
                    match change {
                        CurrentChange::Materialized(sequence) => debug!(
                            event = Event::CurrentMaterialized.as_str(),
                            entity = entity_id,
                            sequence,
                            "current document materialized"
                        ),
                        CurrentChange::Removed => debug!(
                            event = Event::CurrentRemoved.as_str(),
                            entity = entity_id,
                            "current document removed"
                        ),
                        CurrentChange::Unchanged => {}
                    }
                    return Ok(change);
                }
                Err(StoreError::Conflict { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(TemporalError::Conflict {
            key: entity_id.to_string(),
            attempts: self.settings.max_conflict_retries,
        })
    }
}

fn committed(ledger: &Ledger, sequence: u64) -> TemporalResult<RevisionRecord> {
    ledger.record(sequence).cloned().ok_or_else(|| {
        TemporalError::internal(format!(
            "revision {} of {} missing from committed ledger",
            sequence, ledger.entity_id
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::temporal::TemporalStatus;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn date(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, m, d, 0, 0, 0).unwrap()
    }

    fn at(m: u32, d: u32) -> TimeBound {
        TimeBound::at(date(m, d))
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        wake: Arc<WakeSignal>,
        metrics: Arc<MetricsRegistry>,
        engine: RevisionEngine,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let wake = Arc::new(WakeSignal::new(Duration::hours(1)));
        let metrics = Arc::new(MetricsRegistry::new());
        let engine = RevisionEngine::new(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Arc::new(TemporalSettings::default()),
            Arc::clone(&metrics),
            Arc::clone(&wake),
        );
        Fixture {
            store,
            wake,
            metrics,
            engine,
        }
    }

    fn meta(effective: TimeBound) -> DocumentMetadata {
        DocumentMetadata::for_entity("Employees").with_effective(effective)
    }

    fn ctx() -> TemporalContext {
        TemporalContext::new(date(6, 1))
    }

    #[test]
    fn test_single_edit() {
        let f = fixture();
        f.engine
            .put_revision(&ctx(), "employees/1", json!({"v": 1}), meta(at(1, 1)))
            .unwrap();
        let second = f
            .engine
            .put_revision(&ctx(), "employees/1", json!({"v": 2}), meta(at(2, 1)))
            .unwrap();

        assert_eq!(second.sequence(), 2);
        assert_eq!(second.closed, Some(1));
        assert_eq!(second.current, CurrentChange::Materialized(2));

        let ledger = f.engine.ledger("employees/1").unwrap();
        assert_eq!(ledger.record(1).unwrap().effective_until, at(2, 1));
        assert_eq!(ledger.record(2).unwrap().effective_until, TimeBound::PosInfinity);

        let current = f.store.get("employees/1").unwrap().unwrap();
        assert_eq!(current.content, json!({"v": 2}));
        assert_eq!(current.metadata.temporal.status, TemporalStatus::Current);
        assert_eq!(current.metadata.temporal.revision_number, Some(2));

        // Revision 1's document mirrors the closed interval
        let rev1 = f.store.get("employees/1/temporalrevisions/1").unwrap().unwrap();
        assert_eq!(rev1.metadata.temporal.effective_until, Some(at(2, 1)));
        assert_eq!(rev1.content, json!({"v": 1}));
    }

    #[test]
    fn test_out_of_order_edit() {
        let f = fixture();
        for (v, effective) in [(1, at(1, 1)), (2, at(2, 1)), (3, at(1, 15))] {
            f.engine
                .put_revision(&ctx(), "employees/1", json!({ "v": v }), meta(effective))
                .unwrap();
        }

        let rev2 = f.store.get("employees/1/temporalrevisions/2").unwrap().unwrap();
        assert_eq!(rev2.metadata.temporal.status, TemporalStatus::Artifact);

        let current = f.store.get("employees/1").unwrap().unwrap();
        assert_eq!(current.content, json!({"v": 3}));
        assert_eq!(f.metrics.snapshot().artifacts_created, 1);
    }

    #[test]
    fn test_future_edit_is_pending() {
        let f = fixture();
        let now = ctx().now;
        let stored = f
            .engine
            .put_revision(
                &ctx(),
                "employees/1",
                json!({"v": 1}),
                meta(TimeBound::at(now + Duration::days(365))),
            )
            .unwrap();

        assert!(stored.is_pending());
        assert_eq!(stored.current, CurrentChange::Unchanged);
        assert!(f.store.get("employees/1").unwrap().is_none());
        // Clamped to the one-hour ceiling
        assert_eq!(f.wake.next_wake(), Some(now + Duration::hours(1)));
    }

    #[test]
    fn test_future_edit_closes_current_interval() {
        let f = fixture();
        f.engine
            .put_revision(&ctx(), "employees/1", json!({"v": 1}), meta(at(1, 1)))
            .unwrap();
        f.engine
            .put_revision(&ctx(), "employees/1", json!({"v": 2}), meta(at(9, 1)))
            .unwrap();

        let current = f.store.get("employees/1").unwrap().unwrap();
        assert_eq!(current.content, json!({"v": 1}));
        assert_eq!(current.metadata.temporal.effective_until, Some(at(9, 1)));
    }

    #[test]
    fn test_delete_requires_effective_date() {
        let f = fixture();
        let err = f
            .engine
            .delete(&ctx(), "employees/1", DocumentMetadata::for_entity("Employees"))
            .unwrap_err();
        assert_eq!(err.code(), "TEMPORAL_VALIDATION");
    }

    #[test]
    fn test_delete_stores_tombstone() {
        let f = fixture();
        f.engine
            .put_revision(&ctx(), "employees/1", json!({"v": 1}), meta(at(1, 1)))
            .unwrap();
        let tomb = f
            .engine
            .delete(&ctx(), "employees/1", meta(at(2, 1)))
            .unwrap();

        assert!(tomb.record.deleted);
        assert_eq!(tomb.current, CurrentChange::Removed);
        assert!(f.store.get("employees/1").unwrap().is_none());

        let doc = f.store.get("employees/1/temporalrevisions/2").unwrap().unwrap();
        assert!(doc.metadata.temporal.deleted);
        assert_eq!(doc.content, json!({"v": 1}));
        assert_eq!(f.metrics.snapshot().tombstones_stored, 1);
    }

    #[test]
    fn test_direct_revision_writes_rejected() {
        let f = fixture();
        for key in ["employees/1/temporalrevisions/1", "employees/1/temporalhistory"] {
            let err = f
                .engine
                .put_revision(&ctx(), key, json!({}), meta(at(1, 1)))
                .unwrap_err();
            assert_eq!(err.code(), "TEMPORAL_VALIDATION");
        }
    }

    #[test]
    fn test_migration_is_idempotent() {
        let f = fixture();
        f.store
            .put(
                "employees/1",
                ExpectedVersion::Any,
                json!({"v": 0}),
                DocumentMetadata::for_entity("Employees"),
            )
            .unwrap();

        let first = f.engine.migrate(&ctx(), "employees/1").unwrap().unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(first.effective_start, TimeBound::NegInfinity);
        assert!(f.engine.migrate(&ctx(), "employees/1").unwrap().is_none());

        let current = f.store.get("employees/1").unwrap().unwrap();
        assert_eq!(current.metadata.temporal.status, TemporalStatus::Current);
        assert_eq!(current.metadata.temporal.revision_number, Some(1));
        assert_eq!(f.engine.ledger("employees/1").unwrap().len(), 1);
    }

    #[test]
    fn test_put_migrates_existing_document_first() {
        let f = fixture();
        f.store
            .put(
                "employees/1",
                ExpectedVersion::Any,
                json!({"v": 0}),
                DocumentMetadata::for_entity("Employees"),
            )
            .unwrap();

        let stored = f
            .engine
            .put_revision(&ctx(), "employees/1", json!({"v": 1}), meta(at(3, 1)))
            .unwrap();
        assert_eq!(stored.sequence(), 2);
        assert_eq!(stored.closed, Some(1));
    }

    #[test]
    fn test_revisions_for_pages_in_sequence_order() {
        let f = fixture();
        for month in 1..=11 {
            f.engine
                .put_revision(&ctx(), "employees/1", json!({ "m": month }), meta(at(month, 1)))
                .unwrap();
        }

        let page = f.engine.revisions_for("employees/1", 8, 5).unwrap();
        let sequences: Vec<_> = page
            .iter()
            .map(|d| d.metadata.temporal.revision_number.unwrap())
            .collect();
        assert_eq!(sequences, vec![9, 10, 11]);
    }

    #[test]
    fn test_history_for_rejects_system_keys() {
        let f = fixture();
        assert!(f.engine.history_for("sys/whatever").is_err());
        assert!(f.engine.history_for("employees/1").unwrap().is_empty());
    }

    #[test]
    fn test_purge_removes_everything() {
        let f = fixture();
        f.engine
            .put_revision(&ctx(), "employees/1", json!({"v": 1}), meta(at(1, 1)))
            .unwrap();
        f.engine
            .put_revision(&ctx(), "employees/1", json!({"v": 2}), meta(at(2, 1)))
            .unwrap();

        assert_eq!(f.engine.purge(&ctx(), "employees/1").unwrap(), 4);
        assert!(f.store.is_empty());
    }
}
