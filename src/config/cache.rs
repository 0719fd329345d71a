//! Cache of resolved per-entity enablement flags

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::observability::Event;

/// Entity name → versioning enabled.
///
/// Owned by whatever composes the revision engine; the host calls
/// [`ConfigCache::invalidate`] when configuration documents change.
#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: RwLock<HashMap<String, bool>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity_name: &str) -> Option<bool> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(entity_name).copied())
    }

    pub fn insert(&self, entity_name: &str, enabled: bool) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(entity_name.to_string(), enabled);
        }
    }

    /// Drop every cached flag
    pub fn invalidate(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
        debug!(event = Event::ConfigInvalidated.as_str(), "versioning configuration cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
