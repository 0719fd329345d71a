//! temporal-versioning - Bitemporal revision tracking for a document store
//!
//! Every write to a tracked entity becomes an immutable, date-ranged
//! revision. Reads resolve "as of" any effective date, and future-dated
//! revisions are promoted by a background scheduler when they come due.

pub mod activation;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod hooks;
pub mod ledger;
pub mod observability;
pub mod resolver;
pub mod store;
pub mod temporal;
pub mod versioning;

pub use errors::{TemporalError, TemporalResult};
pub use versioning::TemporalVersioning;
