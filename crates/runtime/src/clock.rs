//! Time sources for the contest worker.
//!
//! `vault-core` never reads a clock; the worker stamps every command with
//! [`Clock::now`] before handing it to the engine.
use std::sync::atomic::{AtomicU64, Ordering};

use vault_core::Timestamp;

/// Seconds-since-epoch source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Clock that only moves when told to. Used by tests and the simulator.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock forward and returns the new time.
    pub fn advance(&self, seconds: u64) -> Timestamp {
        let previous = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(seconds))
            })
            .unwrap_or_else(|now| now);
        previous.saturating_add(seconds)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_and_saturates() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.advance(50), 150);
        assert_eq!(clock.now(), 150);

        clock.set(u64::MAX - 1);
        assert_eq!(clock.advance(10), u64::MAX);
    }

    #[test]
    fn system_clock_is_past_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
