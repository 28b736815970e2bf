//! Simulated clock
//!
//! Time only moves when someone waits on it, so a full calibration run that
//! would block for over 40 s on hardware finishes instantly.

use crate::drivers::Clock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Manually advanced millisecond clock
#[derive(Debug, Default)]
pub struct SimClock {
    now_ms: AtomicU64,
}

impl SimClock {
    /// Clock starting at 0 ms
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Clock starting at `ms`
    pub fn starting_at(ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(ms),
        }
    }

    /// Current simulated time
    pub fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Acquire)
    }

    /// Move time forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::AcqRel);
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Acquire)
    }

    fn delay_ms(&self, ms: u64) {
        self.advance(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::SharedClock;
    use std::sync::Arc;

    #[test]
    fn test_delay_advances_shared_time() {
        let sim = Arc::new(SimClock::starting_at(1_000));
        let shared: SharedClock = sim.clone();

        shared.delay_ms(250);
        sim.advance(50);

        assert_eq!(sim.now_ms(), 1_300);
        assert_eq!(shared.now_ms(), 1_300);
    }
}
