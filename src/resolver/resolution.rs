//! Read outcomes

use serde_json::Value;

use crate::store::{Document, DocumentMetadata};

/// Where a resolved document was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    /// The materialized Current Document (fast path)
    Current,
    /// A revision document located through the ledger
    Revision,
}

/// A document as of some effective date
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    /// Key the document is served under
    pub key: String,
    pub content: Value,
    /// Temporal fields reflect the served revision
    pub metadata: DocumentMetadata,
    pub revision: u64,
    pub served_from: ServedFrom,
}

/// Outcome of a time-travel read.
///
/// `Absent` and `NotFound` are normal answers, not errors: `Absent` means
/// the entity is known not to exist at that date, `NotFound` that nothing
/// was ever recorded for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(ResolvedDocument),
    /// A tombstone covers the requested date
    Absent,
    /// No revision covers the requested date
    NotFound,
    /// The key is not temporally tracked; the stored document, unmodified
    NotTracked(Option<Document>),
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// The served content, for found or untracked documents
    pub fn content(&self) -> Option<&Value> {
        match self {
            Resolution::Found(doc) => Some(&doc.content),
            Resolution::NotTracked(Some(doc)) => Some(&doc.content),
            _ => None,
        }
    }

    /// Revision number of a found document
    pub fn revision(&self) -> Option<u64> {
        match self {
            Resolution::Found(doc) => Some(doc.revision),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Version;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let found = Resolution::Found(ResolvedDocument {
            key: "employees/1".into(),
            content: json!({"v": 1}),
            metadata: DocumentMetadata::default(),
            revision: 3,
            served_from: ServedFrom::Revision,
        });
        assert!(found.is_found());
        assert_eq!(found.revision(), Some(3));
        assert_eq!(found.content(), Some(&json!({"v": 1})));

        let untracked = Resolution::NotTracked(Some(Document {
            key: "invoices/1".into(),
            content: json!(7),
            metadata: DocumentMetadata::default(),
            version: Version::new(1),
        }));
        assert_eq!(untracked.content(), Some(&json!(7)));
        assert_eq!(untracked.revision(), None);

        assert_eq!(Resolution::Absent.content(), None);
        assert!(!Resolution::NotFound.is_found());
    }
}
