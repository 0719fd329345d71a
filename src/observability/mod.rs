//! Observability for the temporal layer
//!
//! - `Event` - stable codes attached to every log line as the `event` field
//! - `MetricsRegistry` - monotonic counters
//!
//! Log lines are emitted through `tracing`; this crate never installs a
//! subscriber.

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{MetricsRegistry, MetricsSnapshot};
