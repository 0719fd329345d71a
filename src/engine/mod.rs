//! # Revision Engine
//!
//! The temporal write path: every write or delete of a tracked entity
//! becomes a new date-ranged revision in the entity's ledger.

mod context;
mod revision;

pub use context::TemporalContext;
pub use revision::{CurrentChange, RevisionEngine, StoredRevision};
