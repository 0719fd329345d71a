//! # Temporal Data Model
//!
//! Value types carried in a document's side-channel metadata:
//! - `TemporalStatus` - lifecycle of a document or revision
//! - `TimeBound` - an instant, or one of the two open ends of time
//! - `TemporalMetadata` - the bitemporal fields stamped on every temporal document
//! - key layout for current documents, revisions and ledgers
//!
//! No behavior lives here beyond interval arithmetic.

mod bound;
pub mod keys;
mod metadata;
mod status;

pub use bound::TimeBound;
pub use keys::{
    entity_of_history_key, history_key, is_history_key, is_internal_key, is_revision_key,
    parse_revision_key, revision_key, revision_prefix, HISTORY_SUFFIX, REVISION_SEPARATOR,
};
pub(crate) use keys::reject_internal_key;
pub use metadata::TemporalMetadata;
pub use status::TemporalStatus;
