//! One-shot hardware peripheral initialization.
//!
//! Configures the level ADC channel and the pump GPIOs using raw ESP-IDF
//! sys calls. Called once from `main()` before the control loop starts.
//!
//! The read/write helpers are the only register access the sensors and the
//! relay driver make.  On the host they act on a simulated ADC1 sample and
//! GPIO bank instead, which tests set through the `sim_*` functions.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use crate::error::{ActuatorError, SensorError};

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_input()?;
        init_gpio_output()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

/// Full-scale count of the 12-bit ADC1 conversion.
pub const ADC_MAX_12BIT: u16 = 4095;

/// Reject conversions the 12-bit ADC cannot produce.
fn checked_adc_raw(raw: i32) -> Result<u16, SensorError> {
    if (0..=i32::from(ADC_MAX_12BIT)).contains(&raw) {
        Ok(raw as u16)
    } else {
        Err(SensorError::OutOfRange)
    }
}

/// Bit for `pin` in a 64-bit GPIO mask, if the number is usable.
fn pin_bit(pin: i32) -> Option<u64> {
    u32::try_from(pin).ok().filter(|p| *p < 64).map(|p| 1u64 << p)
}

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the control loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 12 dB attenuation spans roughly 0 – 3.1 V.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), pins::LEVEL_ADC_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!(
        "hw_init: ADC1 configured (CH{} on GPIO{} = level)",
        pins::LEVEL_ADC_CHANNEL,
        pins::LEVEL_ADC_GPIO
    );
    Ok(())
}

/// One 12-bit conversion on an ADC1 channel.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, SensorError> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(SensorError::AdcReadFailed);
    }
    checked_adc_raw(raw)
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> Result<u16, SensorError> {
    checked_adc_raw(sim::ADC1_RAW.load(Ordering::Relaxed))
}

// ── GPIO Input ────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_input() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::PUMP_STATUS_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }

    info!("hw_init: pump status input configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> Result<bool, SensorError> {
    if pin_bit(pin).is_none() {
        return Err(SensorError::GpioReadFailed);
    }
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    Ok((unsafe { gpio_get_level(pin) }) != 0)
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> Result<bool, SensorError> {
    let bit = pin_bit(pin).ok_or(SensorError::GpioReadFailed)?;
    Ok(sim::GPIO_LEVELS.load(Ordering::Relaxed) & bit != 0)
}

// ── GPIO Output ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_output() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::PUMP_CONTROL_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    // Relay starts de-energised.
    unsafe { gpio_set_level(pins::PUMP_CONTROL_GPIO, 0) };

    info!("hw_init: pump output configured (LOW)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), ActuatorError> {
    if pin_bit(pin).is_none() {
        return Err(ActuatorError::GpioWriteFailed);
    }
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_output(). Main-loop only.
    let ret = unsafe { gpio_set_level(pin, if high { 1 } else { 0 }) };
    if ret != ESP_OK as i32 {
        return Err(ActuatorError::GpioWriteFailed);
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), ActuatorError> {
    pin_bit(pin).ok_or(ActuatorError::GpioWriteFailed)?;
    sim_set_gpio(pin, high);
    Ok(())
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicI32, AtomicU64};

    use super::ADC_MAX_12BIT;

    /// Next ADC1 conversion.  Starts at full scale (sump empty).
    pub(super) static ADC1_RAW: AtomicI32 = AtomicI32::new(ADC_MAX_12BIT as i32);
    /// One bit per GPIO, shared by inputs and outputs.
    pub(super) static GPIO_LEVELS: AtomicU64 = AtomicU64::new(0);
}

/// Set the value the next simulated ADC1 conversion returns.  Values above
/// 4095 read back as [`SensorError::OutOfRange`].
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc1_raw(raw: i32) {
    sim::ADC1_RAW.store(raw, Ordering::Relaxed);
}

/// Drive a simulated GPIO level.  Out-of-range pins are ignored.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gpio(pin: i32, high: bool) {
    let Some(bit) = pin_bit(pin) else { return };
    if high {
        sim::GPIO_LEVELS.fetch_or(bit, Ordering::Relaxed);
    } else {
        sim::GPIO_LEVELS.fetch_and(!bit, Ordering::Relaxed);
    }
}
