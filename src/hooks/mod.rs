//! # Host Hooks
//!
//! The table of named hookpoints a host wires into its read, write, delete
//! and query pipeline. Each hook either handles the operation itself (all
//! store effects already performed) or tells the host to carry on as if
//! versioning did not exist.

mod hookpoint;
mod table;

pub use hookpoint::Hookpoint;
pub use table::{HookOutcome, TemporalHooks};
