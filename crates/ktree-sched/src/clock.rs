//! Sleep abstraction for dispatch pacing.
//!
//! The original firmware paced itself with a calibrated busy-wait loop.
//! Here the scheduler takes an injected [`Clock`] instead, so tests run
//! without wall-clock delay and can simulate arbitrary timing.

use std::time::Duration;

/// Injectable sleep source.
pub trait Clock: std::fmt::Debug {
    /// Sleep for `ms` milliseconds.
    fn sleep_ms(&self, ms: u64);
}

/// Wall-clock implementation backed by `std::thread::sleep`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep_ms(&self, ms: u64) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }
}

/// Clock that never sleeps. The default for tests.
#[derive(Debug, Default)]
pub struct NoopClock;

impl Clock for NoopClock {
    fn sleep_ms(&self, _ms: u64) {}
}
