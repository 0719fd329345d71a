//! ActivationScheduler - background task driving activation passes
//!
//! State machine: `Idle(next_wake) → Executing → Idle(recomputed)`.
//!
//! The task sleeps until the watermark, or until a writer lowers it. A pass
//! is single-flight: a wake that arrives while one runs is dropped, and the
//! recompute at the end of the running pass catches up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{ActivationReport, Activator, WakeSignal};
use crate::clock::Clock;
use crate::errors::{TemporalError, TemporalResult};
use crate::observability::{Event, MetricsRegistry};
use crate::temporal::TimeBound;

/// Floor on the next wake after a pass with failures, so a record that
/// keeps failing is not retried in a tight loop
fn failure_backoff() -> Duration {
    Duration::seconds(1)
}

struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct ActivationScheduler {
    activator: Arc<Activator>,
    wake: Arc<WakeSignal>,
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricsRegistry>,
    /// Single-flight guard for passes
    executing: AtomicBool,
    running: Mutex<Option<Running>>,
}

impl ActivationScheduler {
    pub fn new(
        activator: Arc<Activator>,
        wake: Arc<WakeSignal>,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            activator,
            wake,
            clock,
            metrics,
            executing: AtomicBool::new(false),
            running: Mutex::new(None),
        }
    }

    pub fn wake(&self) -> &Arc<WakeSignal> {
        &self.wake
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().map(|r| r.is_some()).unwrap_or(false)
    }

    /// Recompute the watermark from the ledgers and spawn the background
    /// task on the current tokio runtime. Starting twice is a no-op.
    pub fn start(self: &Arc<Self>) -> TemporalResult<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TemporalError::internal(format!("no tokio runtime: {}", e)))?;

        let mut running = self
            .running
            .lock()
            .map_err(|_| TemporalError::internal("Lock poisoned"))?;
        if running.is_some() {
            return Ok(());
        }

        // Never trust a watermark left over from an earlier run
        self.wake.clear();
        let next = self.activator.next_activation_date()?;
        self.wake.reset(next, self.clock.now());

        let (shutdown, shutdown_rx) = watch::channel(false);
        let this = Arc::clone(self);
        let task = runtime.spawn(async move { this.run_loop(shutdown_rx).await });
        *running = Some(Running { shutdown, task });

        info!(
            event = Event::SchedulerStarted.as_str(),
            next_wake = ?self.wake.next_wake(),
            "activation scheduler started"
        );
        Ok(())
    }

    /// Cancel the pending sleep and wait for the task to exit.
    ///
    /// A pass in flight runs to completion first.
    pub async fn stop(&self) {
        let running = match self.running.lock() {
            Ok(mut running) => running.take(),
            Err(_) => None,
        };
        let Some(Running { shutdown, task }) = running else {
            return;
        };

        let _ = shutdown.send(true);
        if let Err(e) = task.await {
            error!(
                event = Event::SchedulerStopped.as_str(),
                error = %e,
                "activation scheduler task ended abnormally"
            );
        }
        info!(event = Event::SchedulerStopped.as_str(), "activation scheduler stopped");
    }

    /// Run one activation pass now.
    ///
    /// Returns `None` if a pass was already running or this one failed;
    /// failures are logged and counted, never propagated.
    pub async fn run_pass(&self) -> Option<ActivationReport> {
        if self
            .executing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.metrics.increment_dropped_wakes();
            debug!(
                event = Event::ActivationWakeDropped.as_str(),
                "activation pass already running, wake dropped"
            );
            return None;
        }

        // Writers lowering the watermark during the pass are kept
        self.wake.clear();
        self.metrics.increment_activation_passes();

        let now = self.clock.now();
        debug!(event = Event::ActivationPassStart.as_str(), now = %now, "activation pass starting");

        let activator = Arc::clone(&self.activator);
        let outcome = tokio::task::spawn_blocking(move || {
            let report = activator.activate_pending(now)?;
            let next = activator.next_activation_date()?;
            Ok::<_, TemporalError>((report, next))
        })
        .await;

        let after = self.clock.now();
        let (report, next) = match outcome {
            Ok(Ok((report, next))) => {
                info!(
                    event = Event::ActivationPassComplete.as_str(),
                    activated = report.activated.len(),
                    failed = report.failed.len(),
                    "activation pass complete"
                );
                let next = if report.is_clean() {
                    next
                } else {
                    next.max(TimeBound::at(after + failure_backoff()))
                };
                (Some(report), next)
            }
            Ok(Err(e)) => {
                error!(
                    event = Event::ActivationPassFailed.as_str(),
                    error = %e,
                    "activation pass failed"
                );
                (None, TimeBound::at(after + failure_backoff()))
            }
            Err(e) => {
                error!(
                    event = Event::ActivationPassFailed.as_str(),
                    error = %e,
                    "activation pass panicked"
                );
                (None, TimeBound::at(after + failure_backoff()))
            }
        };

        self.wake.reset(next, after);
        self.executing.store(false, Ordering::Release);
        report
    }

    async fn run_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            match self.time_until_wake() {
                // Nothing pending: only a writer lowering the watermark wakes us
                None => tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = self.wake.lowered() => continue,
                },
                Some(sleep_for) => tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = self.wake.lowered() => continue,
                    _ = tokio::time::sleep(sleep_for) => {
                        if self.is_due() {
                            self.run_pass().await;
                        }
                    }
                },
            }
        }
    }

    /// Time left until the watermark, `None` when no wake is scheduled
    fn time_until_wake(&self) -> Option<std::time::Duration> {
        let next = self.wake.next_wake()?;
        let wait = (next - self.clock.now()).min(self.wake.max_wait());
        Some(wait.to_std().unwrap_or(std::time::Duration::ZERO))
    }

    fn is_due(&self) -> bool {
        match self.wake.next_wake() {
            Some(next) => next <= self.clock.now(),
            None => false,
        }
    }
}
