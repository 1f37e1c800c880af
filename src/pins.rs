//! GPIO / peripheral pin assignments for the sump controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Level sensor — Analog (ADC1)
// ---------------------------------------------------------------------------

/// Float / pressure sender voltage.  ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const LEVEL_ADC_GPIO: i32 = 4;
/// ADC1 channel number for [`LEVEL_ADC_GPIO`].
pub const LEVEL_ADC_CHANNEL: u32 = 3;

// ---------------------------------------------------------------------------
// Pump relay
// ---------------------------------------------------------------------------

/// Digital output: HIGH = pump relay energised.
pub const PUMP_CONTROL_GPIO: i32 = 15;

/// Digital input: pump running feedback, pulled down.  HIGH = running.
pub const PUMP_STATUS_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 status OLED)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 16;
pub const I2C_SCL_GPIO: i32 = 17;
