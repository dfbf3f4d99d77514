//! Wall-clock source for cache timestamps

use chrono::Utc;

/// Source of "now" in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Real clock backed by `chrono::Utc::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    use super::Clock;

    /// Clock that only moves when told to.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now: Arc<AtomicI64>,
    }

    impl ManualClock {
        pub fn new(start_millis: i64) -> Self {
            Self {
                now: Arc::new(AtomicI64::new(start_millis)),
            }
        }

        pub fn advance(&self, by: Duration) {
            self.now.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }
}
