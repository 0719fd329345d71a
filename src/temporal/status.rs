//! Temporal status of a stored document

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a temporal document.
///
/// `NonTemporal` marks documents written before tracking was enabled for
/// their entity; they are migrated on first read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemporalStatus {
    #[default]
    NonTemporal,
    /// Denormalized projection of the revision effective now
    Current,
    /// A date-ranged historical (or pending) version
    Revision,
    /// A revision invalidated by a later, earlier-effective edit
    Artifact,
}

impl TemporalStatus {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalStatus::NonTemporal => "NonTemporal",
            TemporalStatus::Current => "Current",
            TemporalStatus::Revision => "Revision",
            TemporalStatus::Artifact => "Artifact",
        }
    }

    /// Artifacts are retained for audit only and never served by reads.
    pub fn is_servable(&self) -> bool {
        !matches!(self, TemporalStatus::Artifact)
    }
}

impl fmt::Display for TemporalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_non_temporal() {
        assert_eq!(TemporalStatus::default(), TemporalStatus::NonTemporal);
    }

    #[test]
    fn test_artifact_not_servable() {
        assert!(TemporalStatus::Revision.is_servable());
        assert!(TemporalStatus::Current.is_servable());
        assert!(!TemporalStatus::Artifact.is_servable());
    }

    #[test]
    fn test_serde_uses_variant_names() {
        let json = serde_json::to_string(&TemporalStatus::Artifact).unwrap();
        assert_eq!(json, "\"Artifact\"");
        let back: TemporalStatus = serde_json::from_str("\"Current\"").unwrap();
        assert_eq!(back, TemporalStatus::Current);
    }
}
