//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the sump controller:
//! the tick orchestration, usage accounting and the run loop.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod controller;
pub mod events;
pub mod ports;
