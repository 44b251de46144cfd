//! Rate limiting for progress notifications.

use std::time::{Duration, Instant};

/// Minimum spacing between progress events emitted by long-running operations.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Lets at most one update through per interval.
#[derive(Debug)]
pub(crate) struct ProgressThrottle {
    interval: Duration,
    last_emit: Option<Instant>,
}

impl ProgressThrottle {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
        }
    }

    /// Returns true when enough time has passed since the last accepted update.
    pub(crate) fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last_emit {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(PROGRESS_INTERVAL)
    }
}
