//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod i2c_scan;
pub mod pump;
pub mod watchdog;
