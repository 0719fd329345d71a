//! WakeSignal - the scheduler's next-wake watermark
//!
//! A single atomic instant shared by every writer and the scheduler task.
//! Writers only ever lower it; the scheduler raises it to +∞ when a pass
//! starts and recomputes it when the pass ends.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Notify;
use tracing::debug;

use crate::observability::Event;
use crate::temporal::TimeBound;

/// Watermark value meaning "no wake scheduled"
const UNSET: i64 = i64::MAX;

/// Shared next-wake watermark plus the notifier that interrupts a sleep.
#[derive(Debug)]
pub struct WakeSignal {
    /// Milliseconds since the epoch, `UNSET` for +∞
    next_wake_ms: AtomicI64,
    notify: Notify,
    max_wait: Duration,
}

impl WakeSignal {
    pub fn new(max_wait: Duration) -> Self {
        Self {
            next_wake_ms: AtomicI64::new(UNSET),
            notify: Notify::new(),
            max_wait,
        }
    }

    /// Longest the scheduler sleeps without re-checking
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Current watermark; `None` means +∞.
    pub fn next_wake(&self) -> Option<DateTime<Utc>> {
        match self.next_wake_ms.load(Ordering::Acquire) {
            UNSET => None,
            ms => Utc.timestamp_millis_opt(ms).single(),
        }
    }

    /// Lower the watermark to `candidate` clamped to `[now, now + max_wait]`.
    ///
    /// Returns true if the watermark moved. A candidate later than the
    /// current watermark is a no-op, and so is +∞: nothing to wake for.
    pub fn reset(&self, candidate: TimeBound, now: DateTime<Utc>) -> bool {
        let ceiling = now + self.max_wait;
        let target = match candidate {
            TimeBound::NegInfinity => now,
            TimeBound::At(instant) => instant.clamp(now, ceiling),
            TimeBound::PosInfinity => return false,
        };
        let target_ms = ceil_millis(target);

        let mut observed = self.next_wake_ms.load(Ordering::Acquire);
        loop {
            if target_ms >= observed {
                return false;
            }
            match self.next_wake_ms.compare_exchange_weak(
                observed,
                target_ms,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => observed = actual,
            }
        }

        debug!(
            event = Event::WakeRescheduled.as_str(),
            next_wake = %target,
            "activation wake rescheduled"
        );
        self.notify.notify_one();
        true
    }

    /// Raise the watermark to +∞. Only the scheduler does this, when a
    /// pass begins or before recomputing from scratch.
    pub(crate) fn clear(&self) {
        self.next_wake_ms.store(UNSET, Ordering::Release);
    }

    /// Resolves after the next successful [`WakeSignal::reset`].
    pub(crate) async fn lowered(&self) {
        self.notify.notified().await
    }
}

/// Milliseconds since the epoch, rounded up so a wake never fires before
/// the instant it was scheduled for
fn ceil_millis(instant: DateTime<Utc>) -> i64 {
    let ms = instant.timestamp_millis();
    if instant.timestamp_subsec_nanos() % 1_000_000 == 0 {
        ms
    } else {
        ms + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_starts_unset() {
        let wake = WakeSignal::new(Duration::hours(1));
        assert_eq!(wake.next_wake(), None);
    }

    #[test]
    fn test_reset_only_lowers() {
        let wake = WakeSignal::new(Duration::hours(1));
        assert!(wake.reset(TimeBound::at(now() + Duration::minutes(30)), now()));
        assert!(!wake.reset(TimeBound::at(now() + Duration::minutes(45)), now()));
        assert_eq!(wake.next_wake(), Some(now() + Duration::minutes(30)));

        assert!(wake.reset(TimeBound::at(now() + Duration::minutes(10)), now()));
        assert_eq!(wake.next_wake(), Some(now() + Duration::minutes(10)));
    }

    #[test]
    fn test_reset_clamps() {
        let wake = WakeSignal::new(Duration::hours(1));
        wake.reset(TimeBound::at(now() + Duration::days(365)), now());
        assert_eq!(wake.next_wake(), Some(now() + Duration::hours(1)));

        wake.reset(TimeBound::at(now() - Duration::days(1)), now());
        assert_eq!(wake.next_wake(), Some(now()));
    }

    #[test]
    fn test_infinities() {
        let wake = WakeSignal::new(Duration::hours(1));
        assert!(!wake.reset(TimeBound::PosInfinity, now()));
        assert_eq!(wake.next_wake(), None);
        wake.reset(TimeBound::NegInfinity, now());
        assert_eq!(wake.next_wake(), Some(now()));
    }

    #[test]
    fn test_clear() {
        let wake = WakeSignal::new(Duration::hours(1));
        wake.reset(TimeBound::at(now()), now());
        wake.clear();
        assert_eq!(wake.next_wake(), None);
        assert!(wake.reset(TimeBound::at(now() + Duration::days(2)), now()));
        assert_eq!(wake.next_wake(), Some(now() + Duration::hours(1)));
    }

    #[test]
    fn test_sub_millisecond_rounds_up() {
        let wake = WakeSignal::new(Duration::hours(1));
        let candidate = now() + Duration::microseconds(1500);
        wake.reset(TimeBound::at(candidate), now());
        assert_eq!(wake.next_wake(), Some(now() + Duration::milliseconds(2)));
    }

    #[tokio::test]
    async fn test_reset_wakes_sleeper() {
        let wake = std::sync::Arc::new(WakeSignal::new(Duration::hours(1)));
        let sleeper = {
            let wake = std::sync::Arc::clone(&wake);
            tokio::spawn(async move { wake.lowered().await })
        };
        wake.reset(TimeBound::at(now()), now());
        tokio::time::timeout(std::time::Duration::from_secs(5), sleeper)
            .await
            .unwrap()
            .unwrap();
    }
}
