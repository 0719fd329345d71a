//! TemporalVersioning - composition root
//!
//! Owns one instance of every component over a single document store:
//! the versioning policy and its configuration cache, the revision engine,
//! the resolver, and the activation scheduler sharing the engine's wake
//! watermark.

use std::sync::Arc;

use crate::activation::{ActivationScheduler, Activator, WakeSignal};
use crate::clock::{Clock, SystemClock};
use crate::config::{TemporalSettings, VersioningPolicy};
use crate::engine::{RevisionEngine, TemporalContext};
use crate::errors::TemporalResult;
use crate::observability::MetricsRegistry;
use crate::resolver::TimeTravelResolver;
use crate::store::DocumentStore;

pub struct TemporalVersioning {
    store: Arc<dyn DocumentStore>,
    settings: Arc<TemporalSettings>,
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricsRegistry>,
    policy: Arc<VersioningPolicy>,
    engine: Arc<RevisionEngine>,
    resolver: TimeTravelResolver,
    activator: Arc<Activator>,
    scheduler: Arc<ActivationScheduler>,
}

impl TemporalVersioning {
    /// Compose over `store` using wall-clock time
    pub fn new(store: Arc<dyn DocumentStore>, settings: TemporalSettings) -> TemporalResult<Self> {
        Self::with_clock(store, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn DocumentStore>,
        settings: TemporalSettings,
        clock: Arc<dyn Clock>,
    ) -> TemporalResult<Self> {
        settings.validate()?;
        let settings = Arc::new(settings);
        let metrics = Arc::new(MetricsRegistry::new());
        let wake = Arc::new(WakeSignal::new(settings.max_wake_interval()));

        let policy = Arc::new(VersioningPolicy::new(
            Arc::clone(&store),
            Arc::clone(&settings),
        ));
        let engine = Arc::new(RevisionEngine::new(
            Arc::clone(&store),
            Arc::clone(&settings),
            Arc::clone(&metrics),
            Arc::clone(&wake),
        ));
        let resolver = TimeTravelResolver::new(
            Arc::clone(&store),
            Arc::clone(&policy),
            Arc::clone(&engine),
            Arc::clone(&metrics),
        );
        let activator = Arc::new(Activator::new(Arc::clone(&engine), Arc::clone(&metrics)));
        let scheduler = Arc::new(ActivationScheduler::new(
            Arc::clone(&activator),
            wake,
            Arc::clone(&clock),
            Arc::clone(&metrics),
        ));

        Ok(Self {
            store,
            settings,
            clock,
            metrics,
            policy,
            engine,
            resolver,
            activator,
            scheduler,
        })
    }

    /// Fresh request context evaluated at the clock's current instant
    pub fn context(&self) -> TemporalContext {
        TemporalContext::new(self.clock.now())
    }

    /// Enable or disable versioning for one entity
    pub fn configure(&self, entity_name: &str, enabled: bool) -> TemporalResult<()> {
        self.policy.configure(entity_name, enabled)
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn settings(&self) -> &TemporalSettings {
        &self.settings
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn policy(&self) -> &VersioningPolicy {
        &self.policy
    }

    pub fn engine(&self) -> &RevisionEngine {
        &self.engine
    }

    pub fn resolver(&self) -> &TimeTravelResolver {
        &self.resolver
    }

    pub fn activator(&self) -> &Activator {
        &self.activator
    }

    pub fn scheduler(&self) -> &Arc<ActivationScheduler> {
        &self.scheduler
    }
}
