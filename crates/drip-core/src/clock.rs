//! Stock [`Clock`] implementations.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::traits::Clock;
use crate::types::Timestamp;

/// Wall-clock time from the host.
///
/// Pre-epoch readings are reported as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually driven clock for simulations and tests.
///
/// Time only moves forward: [`set`](Self::set) ignores values earlier than
/// the current reading.
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

    /// Move the clock forward by `secs`, saturating at `u64::MAX`.
    /// Returns the new reading.
    pub fn advance(&self, secs: u64) -> Timestamp {
        let prev = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(secs))
            })
            .unwrap_or_else(|t| t);
        prev.saturating_add(secs)
    }

    /// Jump to `t` if it is not in the past. Returns the resulting reading.
    pub fn set(&self, t: Timestamp) -> Timestamp {
        self.now.fetch_max(t, Ordering::SeqCst).max(t)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
