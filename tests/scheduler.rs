//! Activation Scheduler Tests
//!
//! Runs the background task against wall-clock time. Delays are short and
//! every wait is bounded, so a scheduler that never fires fails the test
//! instead of hanging it.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use serde_json::json;

use temporal_versioning::config::TemporalSettings;
use temporal_versioning::hooks::TemporalHooks;
use temporal_versioning::store::{DocumentMetadata, DocumentStore, InMemoryStore};
use temporal_versioning::temporal::TemporalStatus;
use temporal_versioning::TemporalVersioning;

const KEY: &str = "employees/1";

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (Arc<InMemoryStore>, TemporalHooks) {
    let store = Arc::new(InMemoryStore::new());
    let versioning = TemporalVersioning::new(store.clone(), TemporalSettings::default()).unwrap();
    versioning.configure("Employees", true).unwrap();
    (store, TemporalHooks::new(Arc::new(versioning)))
}

fn write_in(hooks: &TemporalHooks, delay: Duration) {
    let versioning = hooks.versioning();
    let ctx = versioning.context();
    let meta = DocumentMetadata::for_entity("Employees").with_effective(ctx.now + delay);
    let stored = versioning
        .engine()
        .put_revision(&ctx, KEY, json!({"v": 1}), meta)
        .unwrap();
    assert!(stored.is_pending());
}

/// Poll until the Current Document appears or five seconds pass
async fn wait_for_current(store: &InMemoryStore) -> bool {
    let deadline = tokio::time::Instant::now() + StdDuration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if store.get(KEY).unwrap().is_some() {
            return true;
        }
        tokio::time::sleep(StdDuration::from_millis(25)).await;
    }
    false
}

// =============================================================================
// Background activation
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pending_revision_written_before_start_activates() {
    let (store, hooks) = setup();
    write_in(&hooks, Duration::milliseconds(300));
    assert!(store.get(KEY).unwrap().is_none());

    hooks.on_startup().unwrap();
    assert!(wait_for_current(&store).await, "revision never activated");

    let current = store.get(KEY).unwrap().unwrap();
    assert_eq!(current.metadata.temporal.status, TemporalStatus::Current);
    let revision = store.get("employees/1/temporalrevisions/1").unwrap().unwrap();
    assert!(!revision.metadata.temporal.pending);

    hooks.on_shutdown().await;
    assert!(!hooks.versioning().scheduler().is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_write_after_start_lowers_wake() {
    let (store, hooks) = setup();
    hooks.on_startup().unwrap();

    // Nothing pending: no wake is scheduled at all
    let wake = hooks.versioning().scheduler().wake().clone();
    assert_eq!(wake.next_wake(), None);

    write_in(&hooks, Duration::milliseconds(200));
    assert!(wake.next_wake().unwrap() < Utc::now() + Duration::seconds(5));

    assert!(wait_for_current(&store).await, "revision never activated");
    assert!(hooks.versioning().metrics().snapshot().activations >= 1);

    hooks.on_shutdown().await;
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_start_twice_and_stop_twice() {
    let (_, hooks) = setup();
    hooks.on_startup().unwrap();
    hooks.on_startup().unwrap();
    assert!(hooks.versioning().scheduler().is_running());

    hooks.on_shutdown().await;
    hooks.on_shutdown().await;
    assert!(!hooks.versioning().scheduler().is_running());

    // Restartable after a stop
    hooks.on_startup().unwrap();
    assert!(hooks.versioning().scheduler().is_running());
    hooks.on_shutdown().await;
}

#[test]
fn test_start_outside_runtime_fails() {
    let (_, hooks) = setup();
    let err = hooks.on_startup().unwrap_err();
    assert_eq!(err.code(), "TEMPORAL_INTERNAL");
    assert!(!hooks.versioning().scheduler().is_running());
}
