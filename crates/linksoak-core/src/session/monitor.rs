//! Shared error accounting
//!
//! Both workers report every cycle outcome here. A single mutex guards
//! the consecutive-failure streak and the rotation success counter; the
//! cumulative per-port counters live on the [`Link`](crate::protocol::Link)
//! objects and never trigger shutdown by themselves.

use std::sync::Mutex;

use tracing::error;

/// Outcome of a failure report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep going
    Continue,
    /// Consecutive-failure threshold reached; the session must stop
    Fatal,
}

struct Counters {
    consecutive_failures: u32,
    successes_since_rotation: u32,
    tripped: bool,
}

/// Tracks the session-wide failure streak and rotation progress
pub struct ErrorMonitor {
    counters: Mutex<Counters>,
    threshold: u32,
}

impl ErrorMonitor {
    /// Create a monitor that trips after `threshold` consecutive failures
    pub fn new(threshold: u32) -> Self {
        Self {
            counters: Mutex::new(Counters {
                consecutive_failures: 0,
                successes_since_rotation: 0,
                tripped: false,
            }),
            threshold,
        }
    }

    /// Record one cycle failure.
    ///
    /// Returns [`Verdict::Fatal`] exactly once, when the streak reaches
    /// the threshold.
    pub fn report_failure(&self) -> Verdict {
        let mut counters = self.counters.lock().unwrap();
        counters.consecutive_failures += 1;
        if counters.consecutive_failures >= self.threshold && !counters.tripped {
            counters.tripped = true;
            error!(
                streak = counters.consecutive_failures,
                limit = self.threshold,
                "consecutive error limit reached, shutting down"
            );
            return Verdict::Fatal;
        }
        Verdict::Continue
    }

    /// Record one cycle success, resetting the streak.
    ///
    /// Returns the number of successes accumulated since the last
    /// rotation, for the rotator's threshold check.
    pub fn report_success(&self) -> u32 {
        let mut counters = self.counters.lock().unwrap();
        counters.consecutive_failures = 0;
        counters.successes_since_rotation += 1;
        counters.successes_since_rotation
    }

    /// Reset the rotation success counter after a baud change
    pub fn reset_success_count(&self) {
        self.counters.lock().unwrap().successes_since_rotation = 0;
    }

    /// Current consecutive-failure streak
    pub fn consecutive_failures(&self) -> u32 {
        self.counters.lock().unwrap().consecutive_failures
    }

    /// Successes since the last rotation
    pub fn successes_since_rotation(&self) -> u32 {
        self.counters.lock().unwrap().successes_since_rotation
    }
}
