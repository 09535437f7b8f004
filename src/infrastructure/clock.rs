//! # Clocks
//!
//! `SystemClock` reads wall time through chrono. `ManualClock` only moves when
//! told to, for tests and for replaying operator scenarios.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::traits::Clock;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // Pre-epoch system time reads as zero.
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new(10);
        let view = clock.clone();
        clock.advance(5);
        assert_eq!(view.now_ms(), 15);
        view.set(100);
        assert_eq!(clock.now_ms(), 100);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
