//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PumpController (domain)
//! ```
//!
//! Driven adapters (level sensor, pump relay, OLED, clock, event sinks)
//! implement these traits.  The [`PumpController`](super::controller::PumpController)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every tick can be driven from a test with fakes.

use core::time::Duration;

use crate::error::{ActuatorError, DisplayError, SensorError};
use crate::timestamp::Timestamp;

use super::events::{AppEvent, MetricsSnapshot};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Sample the level sensor once and return volts in `[0, full scale]`.
    /// No filtering or debouncing.
    fn read_voltage(&mut self) -> Result<f32, SensorError>;

    /// Read the external pump-status input. Informational only; the
    /// control decision never depends on it.
    fn read_pump_status(&mut self) -> Result<bool, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the pump.
pub trait ActuatorPort {
    /// Drive the pump output ON (`true`) or OFF (`false`).
    fn set_pump(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Last commanded pump output.
    fn is_pump_on(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → status panel)
// ───────────────────────────────────────────────────────────────

/// Status display.  Every call clears and redraws the full layout.
pub trait DisplayPort {
    fn render(&mut self, snapshot: &MetricsSnapshot) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source and blocking delay.
pub trait Clock {
    fn now(&self) -> Timestamp;

    fn sleep(&mut self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go (serial log, a test recorder, ...).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
