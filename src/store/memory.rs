//! In-memory document store
//!
//! Reference [`DocumentStore`] used by tests and embedders that keep their
//! documents in process. Versions come from a single store-wide counter, so
//! a version is never reused even after a delete.

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use serde_json::Value;

use super::{
    Document, DocumentMetadata, DocumentStore, ExpectedVersion, StoreError, StoreResult, Version,
};

#[derive(Debug, Clone)]
struct StoredEntry {
    content: Value,
    metadata: DocumentMetadata,
    version: Version,
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, StoredEntry>,
    last_version: u64,
}

/// Thread-safe in-memory [`DocumentStore`]
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
    /// Keys whose writes fail with a backend error (fault injection)
    failing_keys: RwLock<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent write or delete of `key` fail.
    pub fn fail_writes_to(&self, key: impl Into<String>) {
        if let Ok(mut failing) = self.failing_keys.write() {
            failing.insert(key.into());
        }
    }

    /// Undo [`InMemoryStore::fail_writes_to`] for every key.
    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing_keys.write() {
            failing.clear();
        }
    }

    fn check_failure(&self, key: &str) -> StoreResult<()> {
        let failing = self
            .failing_keys
            .read()
            .map_err(|_| StoreError::backend("Lock poisoned"))?;
        if failing.contains(key) {
            return Err(StoreError::backend(format!("injected write failure for {}", key)));
        }
        Ok(())
    }

    fn conflict(key: &str, expected: ExpectedVersion, stored: Option<Version>) -> StoreError {
        StoreError::Conflict {
            key: key.to_string(),
            expected: expected.to_string(),
            actual: stored
                .map(|v| v.to_string())
                .unwrap_or_else(|| "absent".to_string()),
        }
    }
}

impl DocumentStore for InMemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Document>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::backend("Lock poisoned"))?;

        Ok(inner.entries.get(key).map(|entry| Document {
            key: key.to_string(),
            content: entry.content.clone(),
            metadata: entry.metadata.clone(),
            version: entry.version,
        }))
    }

    fn put(
        &self,
        key: &str,
        expected: ExpectedVersion,
        content: Value,
        metadata: DocumentMetadata,
    ) -> StoreResult<Version> {
        self.check_failure(key)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::backend("Lock poisoned"))?;

        let stored = inner.entries.get(key).map(|e| e.version);
        if !expected.matches(stored) {
            return Err(Self::conflict(key, expected, stored));
        }

        inner.last_version += 1;
        let version = Version::new(inner.last_version);
        inner.entries.insert(
            key.to_string(),
            StoredEntry {
                content,
                metadata,
                version,
            },
        );

        Ok(version)
    }

    fn delete(&self, key: &str, expected: ExpectedVersion) -> StoreResult<bool> {
        self.check_failure(key)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::backend("Lock poisoned"))?;

        let stored = inner.entries.get(key).map(|e| e.version);
        if !expected.matches(stored) {
            return Err(Self::conflict(key, expected, stored));
        }

        Ok(inner.entries.remove(key).is_some())
    }

    fn scan_by_prefix(&self, prefix: &str) -> StoreResult<Vec<Document>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::backend("Lock poisoned"))?;

        Ok(inner
            .entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, entry)| Document {
                key: k.clone(),
                content: entry.content.clone(),
                metadata: entry.metadata.clone(),
                version: entry.version,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta() -> DocumentMetadata {
        DocumentMetadata::for_entity("Employees")
    }

    #[test]
    fn test_put_get() {
        let store = InMemoryStore::new();
        let v = store
            .put("employees/1", ExpectedVersion::Any, json!({"name": "John"}), meta())
            .unwrap();

        let doc = store.get("employees/1").unwrap().unwrap();
        assert_eq!(doc.content["name"], "John");
        assert_eq!(doc.version, v);
        assert!(store.get("employees/2").unwrap().is_none());
    }

    #[test]
    fn test_versions_strictly_increase() {
        let store = InMemoryStore::new();
        let v1 = store.put("a", ExpectedVersion::Any, json!(1), meta()).unwrap();
        let v2 = store.put("a", ExpectedVersion::Any, json!(2), meta()).unwrap();
        store.delete("a", ExpectedVersion::Any).unwrap();
        let v3 = store.put("a", ExpectedVersion::Any, json!(3), meta()).unwrap();
        assert!(v1 < v2 && v2 < v3);
    }

    #[test]
    fn test_conditional_put() {
        let store = InMemoryStore::new();
        let v1 = store
            .put("a", ExpectedVersion::Absent, json!(1), meta())
            .unwrap();

        let err = store
            .put("a", ExpectedVersion::Absent, json!(2), meta())
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        store
            .put("a", ExpectedVersion::Exactly(v1), json!(2), meta())
            .unwrap();
        let err = store
            .put("a", ExpectedVersion::Exactly(v1), json!(3), meta())
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[test]
    fn test_scan_by_prefix_is_key_ordered() {
        let store = InMemoryStore::new();
        for key in ["b/2", "a/1", "b/1", "c/1", "b"] {
            store.put(key, ExpectedVersion::Any, json!(key), meta()).unwrap();
        }

        let keys: Vec<_> = store
            .scan_by_prefix("b/")
            .unwrap()
            .into_iter()
            .map(|d| d.key)
            .collect();
        assert_eq!(keys, vec!["b/1", "b/2"]);
        assert_eq!(store.scan_by_prefix("").unwrap().len(), 5);
    }

    #[test]
    fn test_injected_failure() {
        let store = InMemoryStore::new();
        store.fail_writes_to("x");
        assert!(matches!(
            store.put("x", ExpectedVersion::Any, json!(1), meta()),
            Err(StoreError::Backend(_))
        ));
        store.clear_failures();
        assert!(store.put("x", ExpectedVersion::Any, json!(1), meta()).is_ok());
    }
}
