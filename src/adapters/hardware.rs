//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the level sensor, the pump feedback input and the pump relay,
//! exposing them through [`SensorPort`] and [`ActuatorPort`].  Together
//! with the OLED adapter this is the only code that touches actual
//! hardware.  On non-espidf targets, the underlying drivers use
//! cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::pump::PumpDriver;
use crate::error::{ActuatorError, SensorError};
use crate::sensors::level::LevelSensor;
use crate::sensors::pump_status::PumpStatusInput;

/// Concrete adapter that combines the pump I/O behind port traits.
pub struct HardwareAdapter {
    level: LevelSensor,
    status: PumpStatusInput,
    pump: PumpDriver,
}

impl HardwareAdapter {
    pub fn new(level: LevelSensor, status: PumpStatusInput, pump: PumpDriver) -> Self {
        Self {
            level,
            status,
            pump,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_voltage(&mut self) -> Result<f32, SensorError> {
        self.level.read_volts()
    }

    fn read_pump_status(&mut self) -> Result<bool, SensorError> {
        self.status.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_pump(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.pump.set(on)
    }

    fn is_pump_on(&self) -> bool {
        self.pump.is_running()
    }
}
