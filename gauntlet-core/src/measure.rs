//! Wall-Clock Timing
//!
//! Each test invocation is timed from just before `Test::run` to just after
//! it returns, on the worker thread that executes it.

use std::time::{Duration, Instant};

/// Timer for a single test invocation
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time since start
    #[inline(always)]
    pub fn stop(&self) -> Duration {
        self.start.elapsed()
    }

    /// The instant the timer was started
    pub fn started_at(&self) -> Instant {
        self.start
    }
}

/// Convert a duration to fractional milliseconds
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(10));
        let elapsed = timer.stop();

        assert!(elapsed >= Duration::from_millis(5));
        assert!(timer.started_at() <= Instant::now());
    }

    #[test]
    fn test_as_millis() {
        assert!((as_millis_f64(Duration::from_micros(1500)) - 1.5).abs() < 1e-12);
        assert_eq!(as_millis_f64(Duration::ZERO), 0.0);
    }
}
