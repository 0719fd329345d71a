//! TemporalHooks - the hook table bound to one `TemporalVersioning`

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use super::Hookpoint;
use crate::engine::{CurrentChange, StoredRevision, TemporalContext};
use crate::errors::TemporalResult;
use crate::observability::Event;
use crate::resolver::Resolution;
use crate::store::{Document, DocumentMetadata};
use crate::temporal::{is_internal_key, reject_internal_key};
use crate::versioning::TemporalVersioning;

/// What the host should do after a before-hook returned
#[derive(Debug, Clone)]
pub enum HookOutcome {
    /// Versioned. Every store effect is done; the host must skip its own.
    Handled(StoredRevision),
    /// Not temporal; the host proceeds normally
    PassThrough,
}

impl HookOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, HookOutcome::Handled(_))
    }
}

pub struct TemporalHooks {
    versioning: Arc<TemporalVersioning>,
}

impl TemporalHooks {
    pub fn new(versioning: Arc<TemporalVersioning>) -> Self {
        Self { versioning }
    }

    /// Names of every hook this table serves
    pub fn hookpoints(&self) -> &'static [Hookpoint] {
        &Hookpoint::ALL
    }

    pub fn versioning(&self) -> &Arc<TemporalVersioning> {
        &self.versioning
    }

    /// `on_before_write`: version writes of tracked entities.
    pub fn on_before_write(
        &self,
        ctx: &TemporalContext,
        key: &str,
        content: &Value,
        metadata: &DocumentMetadata,
    ) -> TemporalResult<HookOutcome> {
        let policy = self.versioning.policy();
        if policy.is_configuration_key(key) {
            policy.check_configuration_write(key)?;
            return Ok(HookOutcome::PassThrough);
        }
        reject_internal_key(key)?;
        if !policy.is_tracked(key, metadata)? {
            return Ok(HookOutcome::PassThrough);
        }

        let stored =
            self.versioning
                .engine()
                .put_revision(ctx, key, content.clone(), metadata.clone())?;
        Ok(HookOutcome::Handled(stored))
    }

    /// `on_after_write`: a configuration change invalidates cached flags.
    pub fn on_after_write(&self, key: &str) {
        if self.versioning.policy().is_configuration_key(key) {
            self.versioning.policy().cache().invalidate();
        }
    }

    /// `on_before_delete`: turn deletes of tracked entities into tombstones.
    ///
    /// When the tombstone is future-dated the Current Document survives. A
    /// host that deletes it anyway gets it back from
    /// [`TemporalHooks::on_after_delete`].
    pub fn on_before_delete(
        &self,
        ctx: &TemporalContext,
        key: &str,
        metadata: &DocumentMetadata,
    ) -> TemporalResult<HookOutcome> {
        let policy = self.versioning.policy();
        if policy.is_configuration_key(key) {
            return Ok(HookOutcome::PassThrough);
        }
        reject_internal_key(key)?;

        let store = self.versioning.store();
        let mut request = metadata.clone();
        if request.entity_name.is_none() {
            request.entity_name = match store.get(key)? {
                Some(doc) => doc.metadata.entity_name,
                None => self.versioning.engine().ledger(key)?.entity_name,
            };
        }
        if !policy.is_tracked(key, &request)? {
            return Ok(HookOutcome::PassThrough);
        }

        let stored = self.versioning.engine().delete(ctx, key, request)?;
        Ok(HookOutcome::Handled(stored))
    }

    /// `on_after_delete`: undo a host delete the ledger does not agree with.
    ///
    /// The Current Document is re-derived from the ledger as of `ctx.now`,
    /// so it comes back only while a live revision is still effective.
    /// Returns true if a document was written back.
    pub fn on_after_delete(&self, ctx: &TemporalContext, key: &str) -> TemporalResult<bool> {
        let policy = self.versioning.policy();
        if policy.is_configuration_key(key) {
            policy.cache().invalidate();
            return Ok(false);
        }
        if is_internal_key(key) {
            return Ok(false);
        }

        let engine = self.versioning.engine();
        let ledger = engine.ledger(key)?;
        if ledger.is_empty() {
            return Ok(false);
        }
        let tracked = DocumentMetadata {
            entity_name: ledger.entity_name,
            ..DocumentMetadata::default()
        };
        if !policy.is_tracked(key, &tracked)? {
            return Ok(false);
        }

        match engine.refresh_current(ctx.now, key)? {
            CurrentChange::Materialized(sequence) => {
                info!(
                    event = Event::CurrentRestored.as_str(),
                    request_id = %ctx.request_id,
                    entity = key,
                    sequence,
                    "current document restored after host delete"
                );
                Ok(true)
            }
            CurrentChange::Unchanged | CurrentChange::Removed => Ok(false),
        }
    }

    /// `on_after_read`: resolve the document as of `ctx.as_of`.
    pub fn on_after_read(&self, ctx: &TemporalContext, key: &str) -> TemporalResult<Resolution> {
        self.versioning.resolver().resolve(ctx, key)
    }

    /// `on_query_result`: drop revisions not effective at `ctx.as_of`.
    pub fn on_query_result(&self, ctx: &TemporalContext, doc: Document) -> Option<Document> {
        self.versioning.resolver().filter_query_result(ctx, doc)
    }

    /// `on_startup`: start the activation scheduler.
    pub fn on_startup(&self) -> TemporalResult<()> {
        self.versioning.scheduler().start()
    }

    /// `on_shutdown`: stop the activation scheduler.
    pub async fn on_shutdown(&self) {
        self.versioning.scheduler().stop().await
    }
}
