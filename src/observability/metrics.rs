//! Metrics registry for the temporal layer
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters.
///
/// Relaxed ordering throughout; exact cross-counter consistency is not needed.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    revisions_stored: AtomicU64,
    tombstones_stored: AtomicU64,
    artifacts_created: AtomicU64,
    migrations: AtomicU64,
    ledger_conflicts: AtomicU64,
    revisions_served: AtomicU64,
    activation_passes: AtomicU64,
    activations: AtomicU64,
    activation_failures: AtomicU64,
    dropped_wakes: AtomicU64,
    undecodable_ledgers: AtomicU64,
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub revisions_stored: u64,
    pub tombstones_stored: u64,
    pub artifacts_created: u64,
    pub migrations: u64,
    pub ledger_conflicts: u64,
    pub revisions_served: u64,
    pub activation_passes: u64,
    pub activations: u64,
    pub activation_failures: u64,
    pub dropped_wakes: u64,
    pub undecodable_ledgers: u64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_revisions_stored(&self) {
        self.revisions_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tombstones_stored(&self) {
        self.tombstones_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_artifacts(&self, count: u64) {
        self.artifacts_created.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_migrations(&self) {
        self.migrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_ledger_conflicts(&self) {
        self.ledger_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_revisions_served(&self) {
        self.revisions_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_activation_passes(&self) {
        self.activation_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_activations(&self) {
        self.activations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_activation_failures(&self) {
        self.activation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dropped_wakes(&self) {
        self.dropped_wakes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_undecodable_ledgers(&self) {
        self.undecodable_ledgers.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            revisions_stored: self.revisions_stored.load(Ordering::Relaxed),
            tombstones_stored: self.tombstones_stored.load(Ordering::Relaxed),
            artifacts_created: self.artifacts_created.load(Ordering::Relaxed),
            migrations: self.migrations.load(Ordering::Relaxed),
            ledger_conflicts: self.ledger_conflicts.load(Ordering::Relaxed),
            revisions_served: self.revisions_served.load(Ordering::Relaxed),
            activation_passes: self.activation_passes.load(Ordering::Relaxed),
            activations: self.activations.load(Ordering::Relaxed),
            activation_failures: self.activation_failures.load(Ordering::Relaxed),
            dropped_wakes: self.dropped_wakes.load(Ordering::Relaxed),
            undecodable_ledgers: self.undecodable_ledgers.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_zero() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_increment() {
        let metrics = MetricsRegistry::new();
        metrics.increment_revisions_stored();
        metrics.increment_revisions_stored();
        metrics.add_artifacts(3);
        metrics.increment_dropped_wakes();

        let snap = metrics.snapshot();
        assert_eq!(snap.revisions_stored, 2);
        assert_eq!(snap.artifacts_created, 3);
        assert_eq!(snap.dropped_wakes, 1);
        assert_eq!(snap.activations, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = MetricsRegistry::new();
        metrics.increment_migrations();
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["migrations"], 1);
    }
}
