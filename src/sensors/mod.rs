//! Sensor subsystem — the level sender and the pump feedback input.

pub mod level;
pub mod pump_status;
