//! # Document Store Adapter
//!
//! The only external collaborator of the temporal core. A host storage
//! engine implements [`DocumentStore`]; the temporal layer never touches
//! physical storage any other way.
//!
//! The host must provide atomic per-key compare-and-set through
//! [`ExpectedVersion`] and key-ordered prefix scans.

mod document;
mod errors;
mod memory;

pub use document::{Document, DocumentMetadata, ExpectedVersion, Version};
pub use errors::{StoreError, StoreResult};
pub use memory::InMemoryStore;

use serde_json::Value;

/// Storage primitives required by the temporal layer
pub trait DocumentStore: Send + Sync {
    /// Read a document by key
    fn get(&self, key: &str) -> StoreResult<Option<Document>>;

    /// Write a document, failing with `StoreError::Conflict` when the stored
    /// version does not match `expected`
    fn put(
        &self,
        key: &str,
        expected: ExpectedVersion,
        content: Value,
        metadata: DocumentMetadata,
    ) -> StoreResult<Version>;

    /// Delete a document. Returns whether a document was removed.
    fn delete(&self, key: &str, expected: ExpectedVersion) -> StoreResult<bool>;

    /// All documents whose key starts with `prefix`, in key order
    fn scan_by_prefix(&self, prefix: &str) -> StoreResult<Vec<Document>>;
}
