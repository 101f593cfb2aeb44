//! Cancellable settle delay
//!
//! Background activity such as a timed checkpoint can only be observed
//! after at least one full scheduling interval. The caller picks the
//! interval; this timer just blocks for it. One timed wait, no polling of
//! the condition being waited for.

use ftest_core::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct TimerState {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Blocking sleep that another thread can cut short
///
/// Cancellation is sticky: once cancelled, every later `wait` returns
/// [`Error::Cancelled`] immediately.
#[derive(Clone, Default)]
pub struct SettleTimer {
    state: Arc<TimerState>,
}

/// Cancels every wait on the timer it came from
#[derive(Clone)]
pub struct CancelHandle {
    state: Arc<TimerState>,
}

impl SettleTimer {
    /// New, uncancelled timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that cancels this timer
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// True once cancelled
    pub fn is_cancelled(&self) -> bool {
        *self.state.cancelled.lock()
    }

    /// Block for `duration` unless cancelled first
    ///
    /// A delay too large to express as a deadline blocks until cancelled.
    pub fn wait(&self, duration: Duration) -> Result<()> {
        let mut cancelled = self.state.cancelled.lock();
        if *cancelled {
            return Err(Error::Cancelled);
        }
        match Instant::now().checked_add(duration) {
            Some(deadline) => {
                while !*cancelled {
                    if self
                        .state
                        .wake
                        .wait_until(&mut cancelled, deadline)
                        .timed_out()
                    {
                        return Ok(());
                    }
                }
            }
            None => {
                while !*cancelled {
                    self.state.wake.wait(&mut cancelled);
                }
            }
        }
        Err(Error::Cancelled)
    }
}

impl CancelHandle {
    /// Cancel the timer and wake any waiter
    pub fn cancel(&self) {
        *self.state.cancelled.lock() = true;
        self.state.wake.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_wait_elapses() {
        let timer = SettleTimer::new();
        let start = Instant::now();
        timer.wait(Duration::from_millis(30)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_zero_wait_returns_immediately() {
        SettleTimer::new().wait(Duration::ZERO).unwrap();
    }

    #[test]
    fn test_cancel_wakes_waiter() {
        let timer = SettleTimer::new();
        let handle = timer.cancel_handle();

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.cancel();
        });

        let start = Instant::now();
        let result = timer.wait(Duration::from_secs(30));
        canceller.join().unwrap();

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(30));
        assert!(timer.is_cancelled());
    }

    #[test]
    fn test_unrepresentable_deadline_returns_cancelled() {
        let timer = SettleTimer::new();
        timer.cancel_handle().cancel();
        assert!(matches!(timer.wait(Duration::MAX), Err(Error::Cancelled)));
    }

    #[test]
    fn test_unrepresentable_deadline_waits_for_cancel() {
        let timer = SettleTimer::new();
        let handle = timer.cancel_handle();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.cancel();
        });

        let result = timer.wait(Duration::MAX);
        canceller.join().unwrap();
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_cancellation_is_sticky() {
        let timer = SettleTimer::new();
        timer.cancel_handle().cancel();
        assert!(matches!(
            timer.wait(Duration::from_secs(30)),
            Err(Error::Cancelled)
        ));
    }
}
