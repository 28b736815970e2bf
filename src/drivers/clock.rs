//! Monotonic clock and blocking delay

use std::time::{Duration, Instant};

/// Millisecond clock shared by every timed component
pub trait Clock: Send + Sync {
    /// Monotonic milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u64;

    /// Block the caller for `ms` milliseconds
    fn delay_ms(&self, ms: u64);
}

/// Wall-clock implementation backed by [`Instant`] and [`std::thread::sleep`]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Create a clock whose epoch is now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn delay_ms(&self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let before = clock.now_ms();
        clock.delay_ms(5);
        assert!(clock.now_ms() >= before + 5);
    }
}
