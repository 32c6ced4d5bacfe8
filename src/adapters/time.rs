//! Monotonic time adapter.
//!
//! Milliseconds since the adapter was created, backed by
//! `std::time::Instant`. Implements [`Clock`] for the registry watchdog
//! and the simulated weather source.

use std::time::{Duration, Instant};

use crate::app::ports::Clock;

pub struct MonotonicClock {
    start: Instant,
    /// Added to every reading; lets a simulator start mid-cycle.
    offset_ms: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::with_offset(Duration::ZERO)
    }

    pub fn with_offset(offset: Duration) -> Self {
        Self {
            start: Instant::now(),
            offset_ms: offset.as_millis() as u64,
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.offset_ms + self.start.elapsed().as_millis() as u64
    }
}
