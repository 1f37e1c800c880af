//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the board if the control loop stops feeding it, which leaves the
//! relay de-energised after reboot.  The timeout comes from
//! [`SystemConfig::watchdog_timeout_ms`](crate::config::SystemConfig), and
//! config validation keeps every loop sleep under half of it.
//!
//! The run loop feeds once per completed tick.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

pub struct Watchdog {
    timeout_ms: u32,
    subscribed: bool,
}

impl Watchdog {
    /// Reconfigure the TWDT to `timeout_ms` and subscribe the calling task.
    ///
    /// A failed subscription is logged and the watchdog stays inert; the
    /// loop still runs.
    pub fn new(timeout_ms: u32) -> Self {
        let subscribed = subscribe(timeout_ms);
        if subscribed {
            info!("Watchdog: armed ({}ms, panic on expiry)", timeout_ms);
        } else {
            warn!("Watchdog: not armed, loop runs unsupervised");
        }
        Self {
            timeout_ms,
            subscribed,
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Reset the countdown.
    pub fn feed(&self) {
        if self.subscribed {
            reset();
        }
    }
}

#[cfg(target_os = "espidf")]
fn subscribe(timeout_ms: u32) -> bool {
    let cfg = esp_task_wdt_config_t {
        timeout_ms,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: called once from the main task before the loop starts.
    unsafe {
        let ret = esp_task_wdt_reconfigure(&cfg);
        if ret != ESP_OK as i32 {
            warn!("TWDT reconfigure returned {}", ret);
        }
        let ret = esp_task_wdt_add(core::ptr::null_mut());
        if ret != ESP_OK as i32 {
            warn!("TWDT subscribe returned {}", ret);
        }
        ret == ESP_OK as i32
    }
}

#[cfg(target_os = "espidf")]
fn reset() {
    // SAFETY: the calling task is subscribed; see `subscribe`.
    unsafe {
        esp_task_wdt_reset();
    }
}

#[cfg(not(target_os = "espidf"))]
fn subscribe(_timeout_ms: u32) -> bool {
    true
}

#[cfg(not(target_os = "espidf"))]
fn reset() {}
