//! Save debouncing and periodic backup timing.
//!
//! Both timers are plain state machines over `Instant`; the RPC server drives
//! them from a tokio interval through `App::tick`, and tests drive them with
//! synthetic instants.

use std::time::{Duration, Instant};

/// Coalesces bursts of edits into a single save once the library has been
/// quiet for `delay`.
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    delay: Duration,
    last_request: Option<Instant>,
}

impl SaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: None,
        }
    }

    /// Records an edit; restarts the quiet period.
    pub fn request(&mut self, now: Instant) {
        self.last_request = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_request.is_some()
    }

    /// True once a pending request has been quiet for the full delay.
    pub fn due(&self, now: Instant) -> bool {
        self.last_request
            .map_or(false, |t| now.saturating_duration_since(t) >= self.delay)
    }

    pub fn clear(&mut self) {
        self.last_request = None;
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }
}

/// Fires every `interval` measured from the last reset.
#[derive(Debug, Clone)]
pub struct BackupTimer {
    interval: Duration,
    last_run: Instant,
}

impl BackupTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_run: now,
        }
    }

    pub fn due(&self, now: Instant) -> bool {
        !self.interval.is_zero() && now.saturating_duration_since(self.last_run) >= self.interval
    }

    pub fn reset(&mut self, now: Instant) {
        self.last_run = now;
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }
}
