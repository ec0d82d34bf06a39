//! Request rate limiting

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Gate deciding whether an analysis may proceed
pub trait RateLimiter: Send + Sync {
    /// Take the given number of permits; false means over the limit
    fn try_consume(&self, permits: u32) -> bool;
}

/// Limiter that never refuses
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn try_consume(&self, _permits: u32) -> bool {
        true
    }
}

struct WindowState {
    window_start: Instant,
    used: u32,
}

/// Fixed-window limiter: N permits per window, counters reset when a
/// new window begins.
///
/// A capacity of zero disables limiting entirely.
pub struct FixedWindowLimiter {
    max_per_window: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

impl FixedWindowLimiter {
    /// Create a limiter allowing `max_per_window` permits per `window`
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
            state: Mutex::new(WindowState {
                window_start: Instant::now(),
                used: 0,
            }),
        }
    }

    /// Create a limiter allowing `max` permits per minute
    pub fn per_minute(max: u32) -> Self {
        Self::new(max, Duration::from_secs(60))
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn try_consume(&self, permits: u32) -> bool {
        if self.max_per_window == 0 {
            return true;
        }

        if let Ok(mut state) = self.state.lock() {
            let now = Instant::now();
            if now.duration_since(state.window_start) >= self.window {
                state.window_start = now;
                state.used = 0;
            }

            if state.used.saturating_add(permits) <= self.max_per_window {
                state.used += permits;
                return true;
            }
            return false;
        }

        // A poisoned lock fails closed
        false
    }
}
