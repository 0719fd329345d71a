//! TimeTravelResolver
//!
//! Resolution order for a tracked entity:
//! 1. migrate a non-temporal Current Document into revision 1 (once)
//! 2. serve the Current Document if its interval contains the as-of date
//! 3. otherwise serve the ledger's narrowest live record containing it
//!
//! Artifacts are never served. A revision key read directly is served as
//! stored, with the ledger's view of its metadata.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{Resolution, ResolvedDocument, ServedFrom};
use crate::config::VersioningPolicy;
use crate::engine::{RevisionEngine, TemporalContext};
use crate::errors::TemporalResult;
use crate::observability::{Event, MetricsRegistry};
use crate::store::{Document, DocumentMetadata, DocumentStore};
use crate::temporal::{is_history_key, parse_revision_key, TemporalStatus};

pub struct TimeTravelResolver {
    store: Arc<dyn DocumentStore>,
    policy: Arc<VersioningPolicy>,
    engine: Arc<RevisionEngine>,
    metrics: Arc<MetricsRegistry>,
}

impl TimeTravelResolver {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        policy: Arc<VersioningPolicy>,
        engine: Arc<RevisionEngine>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            store,
            policy,
            engine,
            metrics,
        }
    }

    /// Resolve `key` as of `ctx.as_of` (default `ctx.now`).
    pub fn resolve(&self, ctx: &TemporalContext, key: &str) -> TemporalResult<Resolution> {
        if let Some((entity_id, sequence)) = parse_revision_key(key) {
            return self.resolve_revision_key(key, entity_id, sequence);
        }
        if is_history_key(key) || self.policy.is_system_key(key) {
            return Ok(Resolution::NotTracked(self.store.get(key)?));
        }

        let mut current = self.store.get(key)?;
        let mut ledger = self.engine.ledger(key)?;

        let lookup = DocumentMetadata {
            entity_name: current
                .as_ref()
                .and_then(|doc| doc.metadata.entity_name.clone())
                .or_else(|| ledger.entity_name.clone()),
            ..DocumentMetadata::default()
        };
        if !self.policy.is_tracked(key, &lookup)? {
            return Ok(Resolution::NotTracked(current));
        }

        let needs_migration = ledger.is_empty()
            && matches!(&current, Some(doc) if doc.metadata.temporal.is_non_temporal());
        if needs_migration {
            self.engine.migrate(ctx, key)?;
            current = self.store.get(key)?;
            ledger = self.engine.ledger(key)?;
        }

        let as_of = ctx.as_of_or_now();

        if let Some(doc) = current {
            let temporal = &doc.metadata.temporal;
            if temporal.status == TemporalStatus::Current && temporal.effective_contains(as_of) {
                let revision = temporal.revision_number.unwrap_or_default();
                self.metrics.increment_revisions_served();
                return Ok(Resolution::Found(ResolvedDocument {
                    key: doc.key,
                    content: doc.content,
                    metadata: doc.metadata,
                    revision,
                    served_from: ServedFrom::Current,
                }));
            }
        }

        let record = match ledger.revision_effective_at(as_of) {
            Some(record) => record,
            None => return Ok(Resolution::NotFound),
        };
        if record.deleted {
            return Ok(Resolution::Absent);
        }

        let revision_doc = match self.store.get(&ledger.revision_key(record.sequence))? {
            Some(doc) => doc,
            None => {
                warn!(
                    event = Event::RevisionDocumentMissing.as_str(),
                    request_id = %ctx.request_id,
                    entity = key,
                    sequence = record.sequence,
                    "ledger names a revision with no document"
                );
                return Ok(Resolution::NotFound);
            }
        };

        self.metrics.increment_revisions_served();
        debug!(
            event = Event::RevisionServed.as_str(),
            request_id = %ctx.request_id,
            entity = key,
            sequence = record.sequence,
            as_of = %as_of,
            "historical revision served"
        );

        Ok(Resolution::Found(ResolvedDocument {
            key: key.to_string(),
            content: revision_doc.content,
            metadata: DocumentMetadata {
                temporal: record.to_metadata(),
                ..revision_doc.metadata
            },
            revision: record.sequence,
            served_from: ServedFrom::Revision,
        }))
    }

    /// Filter one query result.
    ///
    /// Revision documents are kept only if they are live, not deleted and
    /// effective at `ctx.as_of`; kept ones are served under their entity
    /// key. Every other document passes through.
    pub fn filter_query_result(&self, ctx: &TemporalContext, doc: Document) -> Option<Document> {
        let (entity_id, sequence) = match parse_revision_key(&doc.key) {
            Some((entity_id, sequence)) => (entity_id.to_string(), sequence),
            None => return Some(doc),
        };

        let temporal = &doc.metadata.temporal;
        if temporal.status != TemporalStatus::Revision
            || temporal.deleted
            || !temporal.effective_contains(ctx.as_of_or_now())
        {
            return None;
        }

        let mut doc = doc;
        doc.key = entity_id;
        doc.metadata.temporal.revision_number = Some(sequence);
        Some(doc)
    }

    fn resolve_revision_key(
        &self,
        key: &str,
        entity_id: &str,
        sequence: u64,
    ) -> TemporalResult<Resolution> {
        let doc = match self.store.get(key)? {
            Some(doc) => doc,
            None => return Ok(Resolution::NotFound),
        };
        if !self.policy.is_tracked(entity_id, &doc.metadata)? {
            return Ok(Resolution::NotTracked(Some(doc)));
        }

        let mut metadata = doc.metadata;
        if let Some(record) = self.engine.ledger(entity_id)?.record(sequence) {
            metadata.temporal = record.to_metadata();
        }
        metadata.temporal.revision_number = Some(sequence);

        self.metrics.increment_revisions_served();
        Ok(Resolution::Found(ResolvedDocument {
            key: doc.key,
            content: doc.content,
            metadata,
            revision: sequence,
            served_from: ServedFrom::Revision,
        }))
    }
}
