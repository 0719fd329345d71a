//! Persisted key layout
//!
//! - Current Document: `<entity>`
//! - Revision:         `<entity>/temporalrevisions/<n>`
//! - Ledger:           `<entity>/temporalhistory`

use crate::errors::{TemporalError, TemporalResult};

/// Reserved separator between an entity id and a revision number
pub const REVISION_SEPARATOR: &str = "/temporalrevisions/";

/// Suffix of the per-entity ledger document
pub const HISTORY_SUFFIX: &str = "/temporalhistory";

/// Key of revision `sequence` of `entity_id`
pub fn revision_key(entity_id: &str, sequence: u64) -> String {
    format!("{}{}{}", entity_id, REVISION_SEPARATOR, sequence)
}

/// Prefix shared by every revision of `entity_id`
pub fn revision_prefix(entity_id: &str) -> String {
    format!("{}{}", entity_id, REVISION_SEPARATOR)
}

/// Key of the ledger document of `entity_id`
pub fn history_key(entity_id: &str) -> String {
    format!("{}{}", entity_id, HISTORY_SUFFIX)
}

pub fn is_revision_key(key: &str) -> bool {
    key.contains(REVISION_SEPARATOR)
}

pub fn is_history_key(key: &str) -> bool {
    key.ends_with(HISTORY_SUFFIX)
}

/// Revision and ledger documents are owned by the engine
pub fn is_internal_key(key: &str) -> bool {
    is_revision_key(key) || is_history_key(key)
}

/// Refuse writes and deletes that address an internal document directly.
pub(crate) fn reject_internal_key(key: &str) -> TemporalResult<()> {
    if is_internal_key(key) {
        return Err(TemporalError::validation(format!(
            "Cannot modify temporal revision or history document {} directly",
            key
        )));
    }
    Ok(())
}

/// Split a revision key into its entity id and sequence number.
pub fn parse_revision_key(key: &str) -> Option<(&str, u64)> {
    let idx = key.find(REVISION_SEPARATOR)?;
    let entity = &key[..idx];
    let sequence = key[idx + REVISION_SEPARATOR.len()..].parse().ok()?;
    Some((entity, sequence))
}

/// Entity id owning a ledger key
pub fn entity_of_history_key(key: &str) -> Option<&str> {
    key.strip_suffix(HISTORY_SUFFIX)
}
