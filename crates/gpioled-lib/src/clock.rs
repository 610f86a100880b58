//! Monotonic time source used for blink scheduling.

use std::time::{Duration, Instant};

/// Monotonic clock plus the ability to block the calling thread.
pub trait Clock {
    /// Time elapsed since an arbitrary, fixed epoch.
    fn now(&self) -> Duration;
    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated clock for tests.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Manually driven clock. Clones share the same time, and `sleep`
    /// advances it instead of blocking.
    #[derive(Debug, Clone, Default)]
    pub struct ManualClock {
        now: Rc<Cell<Duration>>,
        /// Every duration passed to `sleep`, in order.
        pub sleeps: Rc<RefCell<Vec<Duration>>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }

        pub fn advance_ms(&self, ms: u64) {
            self.advance(Duration::from_millis(ms));
        }

        /// Jump to an absolute time; may move backwards.
        pub fn set(&self, at: Duration) {
            self.now.set(at);
        }

        /// Sum of all recorded sleeps.
        pub fn total_slept(&self) -> Duration {
            self.sleeps.borrow().iter().sum()
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Duration {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
            self.advance(duration);
        }
    }
}
