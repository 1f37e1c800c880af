//! Monotonic timestamps used by the controller.
//!
//! A `Timestamp` is milliseconds since boot. Integer storage keeps the
//! guard-timer comparisons exact at whole-second boundaries.

use core::time::Duration;

use serde::Serialize;

/// Milliseconds since boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Timestamp {
    millis: u64,
}

impl Timestamp {
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self {
            millis: secs * 1000,
        }
    }

    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Seconds elapsed since `earlier`, or zero if `earlier` is in the future.
    ///
    /// `f64` keeps millisecond resolution over months of uptime.
    pub fn secs_since(&self, earlier: Timestamp) -> f64 {
        self.millis.saturating_sub(earlier.millis) as f64 / 1000.0
    }

    /// Whether at least `secs` whole seconds have passed since `earlier`.
    pub fn has_elapsed(&self, earlier: Timestamp, secs: u32) -> bool {
        self.millis.saturating_sub(earlier.millis) >= u64::from(secs) * 1000
    }

    /// This timestamp advanced by `d`.
    #[must_use]
    pub fn after(&self, d: Duration) -> Self {
        Self {
            millis: self.millis.saturating_add(d.as_millis() as u64),
        }
    }
}
