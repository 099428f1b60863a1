// crates/admin-gate-core/src/core/time.rs
// ============================================================================
// Module: Clock
// Description: Unix-second clock abstraction for token issuance and expiry.
// Purpose: Keep token timing testable without sleeping.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Token issuance and verification read "now" through [`Clock`]. Production
//! code uses [`SystemClock`]; tests pin time with [`FixedClock`].

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Source of the current unix time in whole seconds.
pub trait Clock: Send + Sync {
    /// Returns seconds since the unix epoch.
    fn now_unix(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// Manually advanced clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    /// Current time in unix seconds.
    now: AtomicU64,
}

impl FixedClock {
    /// Creates a clock pinned at `now`.
    #[must_use]
    pub const fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Advances the clock by `seconds`.
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_unix(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
