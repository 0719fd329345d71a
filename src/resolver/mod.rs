//! # Time-Travel Resolver
//!
//! The temporal read path: maps `(entity, as-of date)` to the revision in
//! effect at that date, migrating pre-existing documents on first read.

mod resolution;
mod time_travel;

pub use resolution::{Resolution, ResolvedDocument, ServedFrom};
pub use time_travel::TimeTravelResolver;
