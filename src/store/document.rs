//! Stored document shape and concurrency tokens

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::temporal::TemporalMetadata;

/// Opaque concurrency token assigned by the store on every write.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    #[inline]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Precondition attached to a write or delete
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExpectedVersion {
    /// Unconditional
    Any,
    /// The key must not exist yet
    Absent,
    /// The stored version must match exactly
    Exactly(Version),
}

impl ExpectedVersion {
    /// Precondition matching a previously observed version, or absence
    pub fn from_observed(observed: Option<Version>) -> Self {
        match observed {
            Some(version) => ExpectedVersion::Exactly(version),
            None => ExpectedVersion::Absent,
        }
    }

    /// Check this precondition against the version currently stored
    pub fn matches(&self, stored: Option<Version>) -> bool {
        match (self, stored) {
            (ExpectedVersion::Any, _) => true,
            (ExpectedVersion::Absent, None) => true,
            (ExpectedVersion::Exactly(v), Some(s)) => *v == s,
            _ => false,
        }
    }
}

impl fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedVersion::Any => write!(f, "any"),
            ExpectedVersion::Absent => write!(f, "absent"),
            ExpectedVersion::Exactly(v) => write!(f, "{}", v),
        }
    }
}

/// Side-channel metadata of a stored document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Entity (collection) name used to look up versioning configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(default)]
    pub temporal: TemporalMetadata,

    /// Host-defined metadata carried through untouched
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl DocumentMetadata {
    pub fn for_entity(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: Some(entity_name.into()),
            ..Self::default()
        }
    }

    /// Builder-style effective date for the next write
    pub fn with_effective(mut self, effective: impl Into<crate::temporal::TimeBound>) -> Self {
        self.temporal.requested_effective = Some(effective.into());
        self
    }
}

/// A document as returned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub content: Value,
    pub metadata: DocumentMetadata,
    pub version: Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_version_matching() {
        let v = Version::new(3);
        assert!(ExpectedVersion::Any.matches(None));
        assert!(ExpectedVersion::Any.matches(Some(v)));
        assert!(ExpectedVersion::Absent.matches(None));
        assert!(!ExpectedVersion::Absent.matches(Some(v)));
        assert!(ExpectedVersion::Exactly(v).matches(Some(v)));
        assert!(!ExpectedVersion::Exactly(v).matches(Some(Version::new(4))));
        assert!(!ExpectedVersion::Exactly(v).matches(None));
    }

    #[test]
    fn test_from_observed() {
        assert_eq!(ExpectedVersion::from_observed(None), ExpectedVersion::Absent);
        assert_eq!(
            ExpectedVersion::from_observed(Some(Version::new(9))),
            ExpectedVersion::Exactly(Version::new(9))
        );
    }

    #[test]
    fn test_metadata_builder() {
        let meta = DocumentMetadata::for_entity("Employees");
        assert_eq!(meta.entity_name.as_deref(), Some("Employees"));
        assert!(meta.temporal.is_non_temporal());
    }
}
