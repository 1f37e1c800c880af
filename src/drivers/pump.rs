//! Sump pump relay driver.
//!
//! Single digital output; HIGH energises the relay.  The driver is a dumb
//! actuator: run-time limits and guard timers live in the controller.
//!
//! The output goes through [`hw_init::gpio_write`], which drives the
//! simulated GPIO bank on the host.

use crate::drivers::hw_init;
use crate::error::ActuatorError;

pub struct PumpDriver {
    gpio: i32,
    on: bool,
}

impl PumpDriver {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, on: false }
    }

    /// Drive the relay.  The cached state only changes once the write
    /// succeeds.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        hw_init::gpio_write(self.gpio, on)?;
        self.on = on;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.on
    }
}
