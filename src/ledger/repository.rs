//! LedgerRepository - ledger persistence under optimistic concurrency
//!
//! The whole ledger document is replaced on every mutation, guarded by the
//! version observed at load time. Callers go through [`LedgerRepository::update`],
//! which re-runs their mutation against a fresh ledger after every lost race.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::Ledger;
use crate::errors::{TemporalError, TemporalResult};
use crate::observability::{Event, MetricsRegistry};
use crate::store::{DocumentMetadata, DocumentStore, ExpectedVersion, Version};
use crate::temporal::{entity_of_history_key, history_key};

/// A ledger together with the concurrency token it was loaded under
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub ledger: Ledger,
    /// `None` when no ledger document exists yet
    pub version: Option<Version>,
}

/// Outcome of a ledger mutation closure
#[derive(Debug)]
pub enum Mutation<T> {
    /// Persist the mutated ledger
    Commit(T),
    /// Nothing changed; do not write
    Skip(T),
}

/// Loads and saves ledgers through the document store
pub struct LedgerRepository {
    store: Arc<dyn DocumentStore>,
    metrics: Arc<MetricsRegistry>,
    max_attempts: u32,
}

impl LedgerRepository {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        metrics: Arc<MetricsRegistry>,
        max_attempts: u32,
    ) -> Self {
        Self {
            store,
            metrics,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Load the ledger of `entity_id`, or an empty one if none exists.
    pub fn load(&self, entity_id: &str) -> TemporalResult<LedgerSnapshot> {
        match self.store.get(&history_key(entity_id))? {
            Some(doc) => {
                let ledger: Ledger = serde_json::from_value(doc.content)?;
                Ok(LedgerSnapshot {
                    ledger,
                    version: Some(doc.version),
                })
            }
            None => Ok(LedgerSnapshot {
                ledger: Ledger::new(entity_id, None),
                version: None,
            }),
        }
    }

    /// Replace the ledger document if it is still at `expected`.
    ///
    /// A lost race surfaces as a store conflict; see [`LedgerRepository::update`].
    pub fn save(&self, ledger: &Ledger, expected: Option<Version>) -> TemporalResult<Version> {
        let content: Value = serde_json::to_value(ledger)?;
        let version = self.store.put(
            &history_key(&ledger.entity_id),
            ExpectedVersion::from_observed(expected),
            content,
            DocumentMetadata::default(),
        )?;
        Ok(version)
    }

    /// Run `mutate` against the freshest ledger until a save succeeds.
    ///
    /// Returns the closure's value and the ledger as saved (or as loaded,
    /// when the closure skipped the write).
    pub fn update<T, F>(&self, entity_id: &str, mut mutate: F) -> TemporalResult<(T, Ledger)>
    where
        F: FnMut(&mut Ledger) -> TemporalResult<Mutation<T>>,
    {
        for attempt in 1..=self.max_attempts {
            let LedgerSnapshot {
                mut ledger,
                version,
            } = self.load(entity_id)?;

            match mutate(&mut ledger)? {
                Mutation::Skip(value) => return Ok((value, ledger)),
                Mutation::Commit(value) => match self.save(&ledger, version) {
                    Ok(_) => return Ok((value, ledger)),
                    Err(e) if e.is_store_conflict() => {
                        self.metrics.increment_ledger_conflicts();
                        debug!(
                            event = Event::LedgerConflictRetry.as_str(),
                            entity = entity_id,
                            attempt,
                            "ledger changed underneath, retrying"
                        );
                    }
                    Err(e) => return Err(e),
                },
            }
        }

        Err(TemporalError::Conflict {
            key: history_key(entity_id),
            attempts: self.max_attempts,
        })
    }

    /// Every decodable ledger in the store.
    ///
    /// A ledger document that does not decode is logged, counted and
    /// skipped so one bad entity cannot stall the rest.
    pub fn scan_all(&self) -> TemporalResult<Vec<LedgerSnapshot>> {
        let mut snapshots = Vec::new();
        for doc in self.store.scan_by_prefix("")? {
            if entity_of_history_key(&doc.key).is_none() {
                continue;
            }
            match serde_json::from_value::<Ledger>(doc.content) {
                Ok(ledger) => snapshots.push(LedgerSnapshot {
                    ledger,
                    version: Some(doc.version),
                }),
                Err(e) => {
                    self.metrics.increment_undecodable_ledgers();
                    warn!(
                        event = Event::LedgerUndecodable.as_str(),
                        key = %doc.key,
                        error = %e,
                        "ledger document undecodable, skipped"
                    );
                }
            }
        }
        Ok(snapshots)
    }

    /// Remove the ledger document. Only used by whole-entity purge.
    pub fn delete(&self, entity_id: &str) -> TemporalResult<bool> {
        Ok(self
            .store
            .delete(&history_key(entity_id), ExpectedVersion::Any)?)
    }
}
