//! Cancellable wait primitive for graceful shutdown.
//!
//! The sampler blocks the calling thread for a fixed delay when it retries
//! after a bad provider reading. That delay must be interruptible: a daemon
//! shutting down should not sit out a full delay window. `Shutdown` is a
//! sticky cancellation token built on `Mutex<bool>` + `Condvar`, so a wait
//! can be cut short and the cancelled state stays observable afterwards.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Sticky cancellation token shared between a signal handler and samplers.
///
/// Clones share the same underlying state. Once cancelled, the token stays
/// cancelled; every subsequent `wait_timeout` returns immediately.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl Shutdown {
    /// Creates a new token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled and wakes every thread blocked in
    /// `wait_timeout`.
    pub fn cancel(&self) {
        let mut cancelled = match self.inner.cancelled.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *cancelled = true;
        self.inner.condvar.notify_all();
    }

    /// Returns `true` if `cancel` has been called on any clone of this token.
    pub fn is_cancelled(&self) -> bool {
        match self.inner.cancelled.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Blocks the calling thread for up to `timeout`.
    ///
    /// Returns `true` if the wait was cut short by cancellation (or the token
    /// was already cancelled), `false` if the full timeout elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut cancelled = match self.inner.cancelled.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let deadline = std::time::Instant::now() + timeout;
        while !*cancelled {
            let now = std::time::Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, result) = match self.inner.condvar.wait_timeout(cancelled, deadline - now) {
                Ok(pair) => pair,
                Err(poisoned) => poisoned.into_inner(),
            };
            cancelled = guard;
            if result.timed_out() && !*cancelled {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_wait_timeout_elapses_when_not_cancelled() {
        let token = Shutdown::new();
        let start = Instant::now();
        let interrupted = token.wait_timeout(Duration::from_millis(20));
        assert!(!interrupted);
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_wait_returns_immediately_when_already_cancelled() {
        let token = Shutdown::new();
        token.cancel();
        let start = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_cancel_wakes_waiting_thread() {
        let token = Shutdown::new();
        let waiter = token.clone();
        let handle = std::thread::spawn(move || waiter.wait_timeout(Duration::from_secs(30)));

        std::thread::sleep(Duration::from_millis(20));
        token.cancel();

        assert!(handle.join().unwrap());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancellation_is_sticky_across_clones() {
        let token = Shutdown::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(token.wait_timeout(Duration::from_secs(1)));
    }
}
