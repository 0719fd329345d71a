//! Observable events of the temporal layer
//!
//! Events are explicit and typed. The string form is the value of the
//! `event` field on the corresponding log line.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Write path
    /// New revision recorded in a ledger
    RevisionStored,
    /// Tombstone revision recorded
    TombstoneStored,
    /// Existing revision demoted to artifact
    RevisionArtifacted,
    /// Predecessor interval closed at the new effective date
    IntervalClosed,
    /// Current Document rewritten from a revision
    CurrentMaterialized,
    /// Current Document removed by an effective tombstone
    CurrentRemoved,
    /// Ledger save lost an optimistic concurrency race
    LedgerConflictRetry,
    /// Whole entity history removed
    EntityPurged,
    /// Ledger names a revision whose document does not exist
    RevisionDocumentMissing,
    /// Current Document re-derived after a host delete the ledger overrides
    CurrentRestored,
    /// Ledger document could not be decoded and was skipped
    LedgerUndecodable,

    // Read path
    /// Read served from a historical revision
    RevisionServed,
    /// Pre-existing document rewritten as revision 1
    MigrationPerformed,

    // Configuration
    /// Versioning configuration cache cleared
    ConfigInvalidated,

    // Activation
    /// Scheduler task started
    SchedulerStarted,
    /// Scheduler task stopped
    SchedulerStopped,
    /// Activation pass begins
    ActivationPassStart,
    /// Activation pass complete
    ActivationPassComplete,
    /// Activation pass raised an error
    ActivationPassFailed,
    /// Wake fired while a pass was running
    ActivationWakeDropped,
    /// Pending revision promoted
    RevisionActivated,
    /// Promoting one revision failed
    RevisionActivationFailed,
    /// Wake watermark lowered
    WakeRescheduled,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RevisionStored => "TEMPORAL_REVISION_STORED",
            Event::TombstoneStored => "TEMPORAL_TOMBSTONE_STORED",
            Event::RevisionArtifacted => "TEMPORAL_REVISION_ARTIFACTED",
            Event::IntervalClosed => "TEMPORAL_INTERVAL_CLOSED",
            Event::CurrentMaterialized => "TEMPORAL_CURRENT_MATERIALIZED",
            Event::CurrentRemoved => "TEMPORAL_CURRENT_REMOVED",
            Event::LedgerConflictRetry => "TEMPORAL_LEDGER_CONFLICT_RETRY",
            Event::EntityPurged => "TEMPORAL_ENTITY_PURGED",
            Event::RevisionDocumentMissing => "TEMPORAL_REVISION_DOCUMENT_MISSING",
            Event::CurrentRestored => "TEMPORAL_CURRENT_RESTORED",
            Event::LedgerUndecodable => "TEMPORAL_LEDGER_UNDECODABLE",

            Event::RevisionServed => "TEMPORAL_REVISION_SERVED",
            Event::MigrationPerformed => "TEMPORAL_MIGRATION_PERFORMED",

            Event::ConfigInvalidated => "TEMPORAL_CONFIG_INVALIDATED",

            Event::SchedulerStarted => "TEMPORAL_SCHEDULER_STARTED",
            Event::SchedulerStopped => "TEMPORAL_SCHEDULER_STOPPED",
            Event::ActivationPassStart => "TEMPORAL_ACTIVATION_PASS_START",
            Event::ActivationPassComplete => "TEMPORAL_ACTIVATION_PASS_COMPLETE",
            Event::ActivationPassFailed => "TEMPORAL_ACTIVATION_PASS_FAILED",
            Event::ActivationWakeDropped => "TEMPORAL_ACTIVATION_WAKE_DROPPED",
            Event::RevisionActivated => "TEMPORAL_REVISION_ACTIVATED",
            Event::RevisionActivationFailed => "TEMPORAL_REVISION_ACTIVATION_FAILED",
            Event::WakeRescheduled => "TEMPORAL_WAKE_RESCHEDULED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::ActivationPassFailed
                | Event::RevisionActivationFailed
                | Event::RevisionDocumentMissing
                | Event::LedgerUndecodable
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_codes_are_prefixed() {
        for event in [
            Event::RevisionStored,
            Event::MigrationPerformed,
            Event::ActivationPassFailed,
            Event::WakeRescheduled,
        ] {
            assert!(event.as_str().starts_with("TEMPORAL_"));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::ActivationPassFailed.is_failure());
        assert!(Event::RevisionActivationFailed.is_failure());
        assert!(Event::LedgerUndecodable.is_failure());
        assert!(!Event::RevisionActivated.is_failure());
    }
}
