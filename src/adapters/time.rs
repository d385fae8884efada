//! Host clock adapter.
//!
//! Wall-clock seconds come from `SystemTime` (message age); uptime comes
//! from a monotonic `Instant` captured at construction.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::app::ports::ClockPort;

pub struct HostClock {
    start: Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl ClockPort for HostClock {
    /// A clock set before 1970 reads as zero.
    fn now_unix_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}
