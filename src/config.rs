//! System configuration parameters
//!
//! All tunable parameters for the pump controller. Defaults reproduce the
//! bench-tuned constants; a JSON override can be baked in at build time
//! through `SUMPCTL_CONFIG_JSON`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
/// Missing JSON fields take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Pump ---
    /// Nominal pump delivery in litres per minute
    pub pump_rate_litres_per_min: f32,
    /// Hard cap on a single run (seconds); the pump is cut off regardless of level
    pub max_pump_duration_secs: u32,
    /// Minimum time a run must last before a level recovery may stop it (seconds)
    pub min_run_time_secs: u32,
    /// Minimum gap between a stop and the next start (seconds)
    pub pause_between_runs_secs: u32,
    /// Length of a rest period once entered (seconds)
    pub rest_duration_secs: u32,

    // --- Level sensing ---
    /// Sensor voltage below which the sump is considered full and the pump starts
    pub low_voltage_threshold: f32,
    /// ADC reference: a full-scale reading maps to this voltage
    pub adc_full_scale_volts: f32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Loop interval while resting (milliseconds)
    pub rest_loop_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
    /// Task watchdog timeout (milliseconds). Both loop intervals must fit
    /// into half of it.
    pub watchdog_timeout_ms: u32,

    // --- Display bus ---
    /// 7-bit I2C address of the OLED panel
    pub display_i2c_address: u8,
    /// I2C bus clock (Hz)
    pub i2c_frequency_hz: u32,
    /// Log every responding I2C address once at boot
    pub scan_bus_on_boot: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Pump
            pump_rate_litres_per_min: 6.4,
            max_pump_duration_secs: 10 * 60,
            min_run_time_secs: 10,
            pause_between_runs_secs: 10,
            rest_duration_secs: 60,

            // Level sensing
            low_voltage_threshold: 2.1,
            adc_full_scale_volts: 3.3,

            // Timing
            control_loop_interval_ms: 100, // 10 Hz
            rest_loop_interval_ms: 1000,   // 1 Hz
            telemetry_interval_secs: 60,   // 1/min
            watchdog_timeout_ms: 10_000,

            // Display bus
            display_i2c_address: 0x3C,
            i2c_frequency_hz: 400_000,
            scan_bus_on_boot: true,
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Bad values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pump_rate_litres_per_min > 0.0 && self.pump_rate_litres_per_min.is_finite()) {
            return Err(ConfigError::ValidationFailed(
                "pump_rate_litres_per_min must be positive",
            ));
        }
        if !(self.adc_full_scale_volts > 0.0 && self.adc_full_scale_volts.is_finite()) {
            return Err(ConfigError::ValidationFailed(
                "adc_full_scale_volts must be positive",
            ));
        }
        if !(self.low_voltage_threshold > 0.0
            && self.low_voltage_threshold < self.adc_full_scale_volts)
        {
            return Err(ConfigError::ValidationFailed(
                "low_voltage_threshold must lie inside the ADC range",
            ));
        }
        if self.max_pump_duration_secs < self.min_run_time_secs {
            return Err(ConfigError::ValidationFailed(
                "max_pump_duration_secs must not be shorter than min_run_time_secs",
            ));
        }
        if self.control_loop_interval_ms == 0 || self.rest_loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("loop intervals must be non-zero"));
        }
        let longest_sleep = self.control_loop_interval_ms.max(self.rest_loop_interval_ms);
        if longest_sleep.saturating_mul(2) > self.watchdog_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "loop intervals must stay under half the watchdog timeout",
            ));
        }
        if self.display_i2c_address > 0x7F {
            return Err(ConfigError::ValidationFailed(
                "display_i2c_address must be a 7-bit address",
            ));
        }
        Ok(())
    }

    /// Parse a JSON override and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, replaced by `json` when it is present and valid.
    pub fn with_override(json: Option<&str>) -> Self {
        let Some(json) = json else {
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(config) => {
                log::info!("Config override applied");
                config
            }
            Err(e) => {
                log::warn!("Config override rejected ({}), using defaults", e);
                Self::default()
            }
        }
    }
}
