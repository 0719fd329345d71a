//! # Activation
//!
//! Promotes future-dated revisions when their effective date arrives.
//!
//! - `WakeSignal` - shared next-wake watermark, lowered by writers
//! - `Activator` - one activation pass over every ledger
//! - `ActivationScheduler` - tokio task sleeping until the watermark

mod activator;
mod scheduler;
mod watermark;

pub use activator::{ActivationFailure, ActivationReport, Activator};
pub use scheduler::ActivationScheduler;
pub use watermark::WakeSignal;
