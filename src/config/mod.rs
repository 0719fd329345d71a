//! # Configuration
//!
//! - `TemporalSettings` - runtime settings of the temporal layer
//! - `VersioningConfiguration` - per-entity enablement documents stored in the host
//! - `ConfigCache` - explicit cache of resolved enablement flags
//! - `VersioningPolicy` - decides whether a key is temporally tracked

mod cache;
mod policy;
mod settings;

pub use cache::ConfigCache;
pub use policy::{VersioningConfiguration, VersioningPolicy, DEFAULT_CONFIGURATION};
pub use settings::TemporalSettings;
