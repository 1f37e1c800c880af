//! ESP32 time adapter.
//!
//! Implements [`Clock`] for the control loop.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.
//!
//! Sleeping goes through `std::thread::sleep` on both targets; on ESP-IDF
//! that is a FreeRTOS delay and lets the idle task run.

use core::time::Duration;

use crate::app::ports::Clock;
use crate::timestamp::Timestamp;

/// Time adapter for the ESP32-S3 platform.
pub struct Esp32Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic, wraps at `u64::MAX`).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic, wraps at `u64::MAX`).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Clock for Esp32Clock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.uptime_us() / 1_000)
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
