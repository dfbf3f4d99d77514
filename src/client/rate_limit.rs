//! Client-side rate limiting for the AniList API
//!
//! A sliding-window log: every admission is timestamped, and a new request is
//! only admitted while fewer than `max_requests` timestamps fall inside the
//! trailing window. Callers are delayed, never rejected.
//!
//! The server can tighten the limit on the fly. A `Retry-After` header or a
//! low `X-RateLimit-Remaining` count puts a hold on the limiter that every
//! caller waits out before the window check.

use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// AniList allows 90 requests per minute
pub const DEFAULT_MAX_REQUESTS: usize = 90;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Remaining-quota count at or below which we back off
pub const DEFAULT_LOW_REMAINING: u32 = 2;

/// Admission timestamps inside the trailing window, plus any server hold.
#[derive(Debug, Default)]
struct RateWindow {
    timestamps: VecDeque<Instant>,
    hold_until: Option<Instant>,
}

impl RateWindow {
    /// Drop timestamps that have aged out of the window, and an elapsed hold.
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.duration_since(oldest) >= window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
        if self.hold_until.is_some_and(|until| until <= now) {
            self.hold_until = None;
        }
    }

    /// How long until the oldest slot frees up (a full window if none is taken).
    fn until_slot_frees(&self, now: Instant, window: Duration) -> Duration {
        match self.timestamps.front() {
            Some(&oldest) => window.saturating_sub(now.duration_since(oldest)),
            None => window,
        }
    }

    fn required_wait(&self, now: Instant, max_requests: usize, window: Duration) -> Option<Duration> {
        if let Some(until) = self.hold_until {
            return Some(until - now);
        }
        if self.timestamps.len() >= max_requests {
            return Some(self.until_slot_frees(now, window));
        }
        None
    }

    fn extend_hold(&mut self, until: Instant) {
        self.hold_until = Some(self.hold_until.map_or(until, |current| current.max(until)));
    }
}

/// Sliding-window rate limiter shared by every request a client makes.
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    low_remaining: u32,
    state: Mutex<RateWindow>,
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW, DEFAULT_LOW_REMAINING)
    }
}

impl SlidingWindowLimiter {
    /// Create a limiter admitting at most `max_requests` per `window`.
    pub fn new(max_requests: usize, window: Duration, low_remaining: u32) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            low_remaining,
            state: Mutex::new(RateWindow::default()),
        }
    }

    /// Wait until a request may be sent, then record it.
    ///
    /// The capacity check and the timestamp append happen under one lock with
    /// no await in between, so concurrent callers can never both take the
    /// last slot.
    pub async fn admit(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                state.prune(now, self.window);

                match state.required_wait(now, self.max_requests, self.window) {
                    None => {
                        state.timestamps.push_back(now);
                        return;
                    }
                    Some(wait) => wait,
                }
            };

            debug!("Rate limiter waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Hold all admissions for `wait` (server `Retry-After`).
    ///
    /// Never shortens an existing hold.
    pub async fn hold_for(&self, wait: Duration) {
        let mut state = self.state.lock().await;
        info!("Server asked us to wait {:?}", wait);
        state.extend_hold(Instant::now() + wait);
    }

    /// React to the server's remaining-quota count.
    ///
    /// At or below the low-water mark, admissions are held until the oldest
    /// recorded request leaves the window.
    pub async fn observe_remaining(&self, remaining: u32) {
        if remaining > self.low_remaining {
            return;
        }

        let mut state = self.state.lock().await;
        let now = Instant::now();
        state.prune(now, self.window);
        let wait = state.until_slot_frees(now, self.window);
        info!(
            "Server reports {} requests remaining, holding for {:?}",
            remaining, wait
        );
        state.extend_hold(now + wait);
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn assert_window_bound(admitted: &[Instant], max_requests: usize, window: Duration) {
        let mut sorted = admitted.to_vec();
        sorted.sort();
        for pair in sorted.windows(max_requests + 1) {
            let span = pair[max_requests].duration_since(pair[0]);
            assert!(
                span >= window,
                "{} admissions within {:?}",
                max_requests + 1,
                span
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_admits_immediately_under_limit() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(1), 0);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.admit().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_oldest_to_leave_window() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(10), 0);
        let start = Instant::now();

        limiter.admit().await;
        tokio::time::sleep(Duration::from_secs(4)).await;
        limiter.admit().await;
        limiter.admit().await;

        // Third admission waits for the first to age out at t=10s
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_never_exceeds_bound() {
        let max = 5;
        let window = Duration::from_millis(500);
        let limiter = SlidingWindowLimiter::new(max, window, 0);
        let mut admitted = Vec::new();

        for _ in 0..23 {
            limiter.admit().await;
            admitted.push(Instant::now());
        }

        assert_window_bound(&admitted, max, window);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_never_exceed_bound() {
        let max = 4;
        let window = Duration::from_secs(1);
        let limiter = Arc::new(SlidingWindowLimiter::new(max, window, 0));

        let tasks = (0..17).map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                limiter.admit().await;
                Instant::now()
            })
        });
        let admitted: Vec<Instant> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(admitted.len(), 17);
        assert_window_bound(&admitted, max, window);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_for_delays_next_admission() {
        let limiter = SlidingWindowLimiter::new(10, Duration::from_secs(60), 0);
        let start = Instant::now();

        limiter.hold_for(Duration::from_secs(5)).await;
        limiter.admit().await;

        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_is_never_shortened() {
        let limiter = SlidingWindowLimiter::new(10, Duration::from_secs(60), 0);
        let start = Instant::now();

        limiter.hold_for(Duration::from_secs(8)).await;
        limiter.hold_for(Duration::from_secs(2)).await;
        limiter.admit().await;

        assert_eq!(start.elapsed(), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_low_remaining_holds_until_slot_frees() {
        let limiter = SlidingWindowLimiter::new(90, Duration::from_secs(60), 2);
        let start = Instant::now();

        limiter.admit().await;
        tokio::time::sleep(Duration::from_secs(15)).await;
        limiter.observe_remaining(1).await;
        limiter.admit().await;

        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_remaining_is_ignored() {
        let limiter = SlidingWindowLimiter::new(90, Duration::from_secs(60), 2);
        let start = Instant::now();

        limiter.admit().await;
        limiter.observe_remaining(50).await;
        limiter.admit().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_zero_max_requests_is_clamped() {
        let limiter = SlidingWindowLimiter::new(0, Duration::from_secs(1), 0);
        assert_eq!(limiter.max_requests(), 1);
    }
}
