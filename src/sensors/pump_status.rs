//! Pump running feedback input.
//!
//! Digital input with a pull-down; HIGH while the pump reports running.
//! Logged every tick, never used in the control decision.

use crate::drivers::hw_init;
use crate::error::SensorError;

pub struct PumpStatusInput {
    gpio: i32,
}

impl PumpStatusInput {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn read(&self) -> Result<bool, SensorError> {
        hw_init::gpio_read(self.gpio)
    }
}
