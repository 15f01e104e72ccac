//! Cancellable rest-timer countdown.
//!
//! The countdown is a cooperative background worker: it waits one second
//! per tick, checks its cancellation token, then decrements the remaining
//! counter. At most one run is alive at a time; starting a new countdown
//! always preempts the previous one. Callers only see start/adjust/skip
//! and the remaining seconds; no raw handle leaks out.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use uuid::Uuid;

/// Default rest duration between sets
pub const DEFAULT_REST_SECONDS: u32 = 90;

/// Minimum accepted duration; shorter requests are clamped up
pub const MIN_REST_SECONDS: u32 = 5;

/// One-second wait between countdown ticks.
///
/// Tests substitute an instant ticker so 90 simulated seconds elapse
/// without sleeping.
pub trait Ticker: Send + 'static {
    fn wait(&self);
}

/// Real wall-clock ticker
pub struct SecondTicker;

impl Ticker for SecondTicker {
    fn wait(&self) {
        std::thread::sleep(Duration::from_secs(1));
    }
}

/// Shared state for a single countdown run
struct Countdown {
    remaining: AtomicI64,
    cancelled: AtomicBool,
}

/// Single-owner rest timer.
///
/// `remaining_seconds()` is `None` whenever the timer is idle, whether it
/// ran out, was skipped, or was never started.
pub struct RestTimer {
    current: Option<Arc<Countdown>>,
    duration_seconds: u32,
    source_set_id: Option<Uuid>,
    worker: Option<JoinHandle<()>>,
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl RestTimer {
    pub fn new() -> Self {
        Self {
            current: None,
            duration_seconds: DEFAULT_REST_SECONDS,
            source_set_id: None,
            worker: None,
        }
    }

    /// Last configured duration, used when a set completion restarts the timer
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    /// Seconds left in the active countdown, or `None` when idle
    pub fn remaining_seconds(&self) -> Option<u32> {
        let run = self.current.as_ref()?;
        if run.cancelled.load(Ordering::SeqCst) {
            return None;
        }
        let left = run.remaining.load(Ordering::SeqCst);
        (left > 0).then_some(left as u32)
    }

    pub fn is_active(&self) -> bool {
        self.remaining_seconds().is_some()
    }

    /// Which set's completion triggered the active run, for cancel
    /// correlation. `None` when idle.
    pub fn source_set_id(&self) -> Option<Uuid> {
        if self.is_active() {
            self.source_set_id
        } else {
            None
        }
    }

    /// Start a countdown, preempting any existing run.
    ///
    /// Durations below [`MIN_REST_SECONDS`] are clamped up.
    pub fn start(&mut self, duration_seconds: u32, source_set_id: Option<Uuid>) {
        self.start_with_ticker(duration_seconds, source_set_id, SecondTicker);
    }

    /// Start with an explicit ticker; the seam tests drive simulated time
    /// through.
    pub fn start_with_ticker<T: Ticker>(
        &mut self,
        duration_seconds: u32,
        source_set_id: Option<Uuid>,
        ticker: T,
    ) {
        self.cancel_current();

        let clamped = duration_seconds.max(MIN_REST_SECONDS);
        self.duration_seconds = clamped;
        self.source_set_id = source_set_id;

        let run = Arc::new(Countdown {
            remaining: AtomicI64::new(i64::from(clamped)),
            cancelled: AtomicBool::new(false),
        });
        self.current = Some(Arc::clone(&run));

        tracing::debug!("Rest timer started: {}s", clamped);

        self.worker = Some(std::thread::spawn(move || {
            loop {
                ticker.wait();
                if run.cancelled.load(Ordering::SeqCst) {
                    return;
                }
                let left = run.remaining.fetch_sub(1, Ordering::SeqCst) - 1;
                if left <= 0 {
                    // Ran out; remaining <= 0 reads as idle
                    return;
                }
            }
        }));
    }

    /// Add a signed delta to the remaining time.
    ///
    /// No-op while idle. A result at or below zero stops the timer
    /// immediately, the same as a user-driven skip.
    pub fn adjust(&mut self, delta_seconds: i64) {
        if !self.is_active() {
            return;
        }
        let Some(run) = &self.current else {
            return;
        };

        // Fold the delta into the counter atomically; a worker tick landing
        // between read and write still counts.
        let updated = run.remaining.fetch_add(delta_seconds, Ordering::SeqCst) + delta_seconds;
        if updated <= 0 {
            self.skip();
        }
    }

    /// Cancel the running countdown and clear all timer state.
    pub fn skip(&mut self) {
        self.cancel_current();
        self.current = None;
        self.source_set_id = None;
        tracing::debug!("Rest timer skipped");
    }

    fn cancel_current(&mut self) {
        if let Some(run) = &self.current {
            run.cancelled.store(true, Ordering::SeqCst);
        }
        // Detach the old worker; it observes the token on its next tick
        // and exits without touching the new run's state.
        self.worker.take();
    }

    #[cfg(test)]
    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RestTimer {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ticker that does not sleep, letting countdowns elapse instantly
    struct InstantTicker;

    impl Ticker for InstantTicker {
        fn wait(&self) {}
    }

    #[test]
    fn test_countdown_runs_out() {
        let mut timer = RestTimer::new();
        timer.start_with_ticker(90, None, InstantTicker);
        timer.join_worker();

        assert_eq!(timer.remaining_seconds(), None);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_duration_clamped_to_minimum() {
        let mut timer = RestTimer::new();
        timer.start_with_ticker(1, None, SecondTicker);

        assert_eq!(timer.duration_seconds(), MIN_REST_SECONDS);
        assert_eq!(timer.remaining_seconds(), Some(MIN_REST_SECONDS));
        timer.skip();
    }

    #[test]
    fn test_adjust_below_zero_deactivates() {
        let mut timer = RestTimer::new();
        timer.start_with_ticker(5, None, SecondTicker);
        timer.adjust(-10);

        assert!(!timer.is_active());
        assert_eq!(timer.remaining_seconds(), None);
    }

    #[test]
    fn test_adjust_extends_remaining() {
        let mut timer = RestTimer::new();
        timer.start_with_ticker(60, None, SecondTicker);
        timer.adjust(30);

        assert_eq!(timer.remaining_seconds(), Some(90));
        timer.skip();
    }

    #[test]
    fn test_adjust_while_idle_is_noop() {
        let mut timer = RestTimer::new();
        timer.adjust(30);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_skip_clears_source_correlation() {
        let mut timer = RestTimer::new();
        let source = Uuid::new_v4();
        timer.start_with_ticker(90, Some(source), SecondTicker);
        assert_eq!(timer.source_set_id(), Some(source));

        timer.skip();
        assert_eq!(timer.source_set_id(), None);
        assert_eq!(timer.remaining_seconds(), None);
    }

    #[test]
    fn test_start_preempts_previous_run() {
        let mut timer = RestTimer::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        timer.start_with_ticker(90, Some(first), SecondTicker);
        timer.start_with_ticker(120, Some(second), SecondTicker);

        assert_eq!(timer.remaining_seconds(), Some(120));
        assert_eq!(timer.source_set_id(), Some(second));
        timer.skip();
    }

    #[test]
    fn test_source_cleared_after_natural_finish() {
        let mut timer = RestTimer::new();
        timer.start_with_ticker(10, Some(Uuid::new_v4()), InstantTicker);
        timer.join_worker();

        assert_eq!(timer.source_set_id(), None);
    }
}
