//! # Revision Ledger
//!
//! Per-entity ordered history of revision records. The ledger is the
//! source of truth for interval invariants; revision documents and the
//! Current Document are projections of it.
//!
//! This module provides:
//! - `RevisionRecord` - one date-ranged revision
//! - `Ledger` - the ordered history with pure query helpers
//! - `Insertion` - outcome of inserting a revision into a ledger
//! - `LedgerRepository` - load/save under optimistic concurrency

mod history;
mod insertion;
mod record;
mod repository;

pub use history::Ledger;
pub use insertion::Insertion;
pub use record::RevisionRecord;
pub use repository::{LedgerRepository, LedgerSnapshot, Mutation};
