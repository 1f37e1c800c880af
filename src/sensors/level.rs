//! Analog level sensor.
//!
//! The sender produces a voltage that falls as the sump fills.  A single
//! ADC sample is taken per read and mapped linearly onto
//! `[0, full_scale]` volts over a 16-bit range.  No calibration,
//! debouncing or filtering.
//!
//! Samples come from ADC1 through [`hw_init::adc1_read`] (simulated on
//! the host) and the 12-bit result is widened to 16 bits.

use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::pins;

/// Raw counts at full scale.
pub const RAW_FULL_SCALE: u16 = u16::MAX;

/// Map a 16-bit raw sample onto volts.
pub fn raw_to_volts(raw: u16, full_scale_volts: f32) -> f32 {
    raw as f32 / RAW_FULL_SCALE as f32 * full_scale_volts
}

/// Stretch a 12-bit conversion onto the 16-bit range so 4095 maps to 65535.
pub fn widen_12bit(raw: u16) -> u16 {
    let raw = raw & 0x0FFF;
    (raw << 4) | (raw >> 8)
}

pub struct LevelSensor {
    full_scale_volts: f32,
}

impl LevelSensor {
    pub fn new(full_scale_volts: f32) -> Self {
        Self {
            full_scale_volts,
        }
    }

    /// Sample once and return volts.
    pub fn read_volts(&self) -> Result<f32, SensorError> {
        let raw = self.read_raw()?;
        Ok(raw_to_volts(raw, self.full_scale_volts))
    }

    fn read_raw(&self) -> Result<u16, SensorError> {
        hw_init::adc1_read(pins::LEVEL_ADC_CHANNEL).map(widen_12bit)
    }
}
