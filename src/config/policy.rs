//! Versioning policy
//!
//! A key is temporally tracked iff:
//! 1. it is not under the system prefix
//! 2. its metadata names an entity
//! 3. that entity's configuration document (or the default one) is enabled

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ConfigCache, TemporalSettings};
use crate::errors::{TemporalError, TemporalResult};
use crate::store::{DocumentMetadata, DocumentStore, ExpectedVersion};
use crate::temporal::is_history_key;

/// Name of the configuration document applying to unconfigured entities
pub const DEFAULT_CONFIGURATION: &str = "DefaultConfiguration";

/// Per-entity enablement document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersioningConfiguration {
    pub id: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Resolves whether keys are tracked, caching per-entity answers
pub struct VersioningPolicy {
    store: Arc<dyn DocumentStore>,
    settings: Arc<TemporalSettings>,
    cache: ConfigCache,
}

impl VersioningPolicy {
    pub fn new(store: Arc<dyn DocumentStore>, settings: Arc<TemporalSettings>) -> Self {
        Self {
            store,
            settings,
            cache: ConfigCache::new(),
        }
    }

    pub fn cache(&self) -> &ConfigCache {
        &self.cache
    }

    /// Key of the configuration document for `entity_name`
    pub fn configuration_key(&self, entity_name: &str) -> String {
        format!("{}{}", self.settings.configuration_prefix, entity_name)
    }

    pub fn is_configuration_key(&self, key: &str) -> bool {
        key.starts_with(&self.settings.configuration_prefix)
    }

    pub fn is_system_key(&self, key: &str) -> bool {
        key.starts_with(&self.settings.system_prefix)
    }

    /// Reject configuration documents that would version system documents.
    pub fn check_configuration_write(&self, key: &str) -> TemporalResult<()> {
        if let Some(entity) = key.strip_prefix(&self.settings.configuration_prefix) {
            if entity.starts_with(&self.settings.system_prefix) {
                return Err(TemporalError::validation(format!(
                    "Cannot version system documents ({})",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Whether versioning is enabled for `entity_name`.
    pub fn is_entity_enabled(&self, entity_name: &str) -> TemporalResult<bool> {
        if let Some(enabled) = self.cache.get(entity_name) {
            return Ok(enabled);
        }

        let configuration = match self.read_configuration(entity_name)? {
            Some(config) => Some(config),
            None => self.read_configuration(DEFAULT_CONFIGURATION)?,
        };
        let enabled = configuration.map(|c| c.enabled).unwrap_or(false);

        self.cache.insert(entity_name, enabled);
        Ok(enabled)
    }

    /// Whether a document at `key` with `metadata` is temporally tracked.
    pub fn is_tracked(&self, key: &str, metadata: &DocumentMetadata) -> TemporalResult<bool> {
        if key.is_empty() || self.is_system_key(key) || is_history_key(key) {
            return Ok(false);
        }
        match metadata.entity_name.as_deref() {
            Some(entity_name) => self.is_entity_enabled(entity_name),
            None => Ok(false),
        }
    }

    /// Write the configuration document for `entity_name`.
    pub fn configure(&self, entity_name: &str, enabled: bool) -> TemporalResult<()> {
        let key = self.configuration_key(entity_name);
        self.check_configuration_write(&key)?;

        let config = VersioningConfiguration {
            id: key.clone(),
            enabled,
        };
        self.store.put(
            &key,
            ExpectedVersion::Any,
            serde_json::to_value(&config)?,
            DocumentMetadata::default(),
        )?;
        self.cache.invalidate();
        Ok(())
    }

    /// Write the configuration applying to every unconfigured entity.
    pub fn configure_default(&self, enabled: bool) -> TemporalResult<()> {
        self.configure(DEFAULT_CONFIGURATION, enabled)
    }

    fn read_configuration(&self, entity_name: &str) -> TemporalResult<Option<VersioningConfiguration>> {
        match self.store.get(&self.configuration_key(entity_name))? {
            Some(doc) => Ok(Some(serde_json::from_value(doc.content)?)),
            None => Ok(None),
        }
    }
}
