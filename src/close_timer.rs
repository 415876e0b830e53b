//! Debounced close on focus loss.
//!
//! Losing focus arms the timer; regaining focus disarms it.  The event loop
//! polls it with the current time and closes the window when it fires.
//! A fired timer disarms itself, so one focus-out yields at most one close.

use std::time::{Duration, Instant};

/// Default delay between focus-out and close.
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct CloseTimer {
    delay: Duration,
    armed_at: Option<Instant>,
}

impl Default for CloseTimer {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSE_DELAY)
    }
}

impl CloseTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            armed_at: None,
        }
    }

    /// Arm (or re-arm) the timer at `now`.
    pub fn focus_out(&mut self, now: Instant) {
        self.armed_at = Some(now);
    }

    /// Cancel a pending close.
    pub fn focus_in(&mut self) {
        self.armed_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Returns `true` exactly once when the delay has elapsed since the
    /// last focus-out.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.armed_at {
            Some(since) if now.saturating_duration_since(since) >= self.delay => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }
}
