//! Sump controller firmware — main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    OledDisplay    LogEventSink    Esp32Clock  │
//! │  (Sensor+Actuator)  (DisplayPort)  (EventSink)     (Clock)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            PumpController (pure logic)                 │    │
//! │  │  Safety · FSM · Metrics                                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;

use sumpctl::adapters::display::{OledDisplay, init_ssd1306};
use sumpctl::adapters::hardware::HardwareAdapter;
use sumpctl::adapters::log_sink::LogEventSink;
use sumpctl::adapters::time::Esp32Clock;
use sumpctl::app::controller::{PumpController, run};
use sumpctl::app::ports::Clock;
use sumpctl::config::SystemConfig;
use sumpctl::drivers::i2c_scan::{log_scan, scan_bus};
use sumpctl::drivers::pump::PumpDriver;
use sumpctl::drivers::watchdog::Watchdog;
use sumpctl::drivers::hw_init;
use sumpctl::pins;
use sumpctl::sensors::level::LevelSensor;
use sumpctl::sensors::pump_status::PumpStatusInput;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  sumpctl v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::with_override(option_env!("SUMPCTL_CONFIG_JSON"));
    info!(
        "Config: threshold={:.2}V min_run={}s pause={}s cap={}s rate={:.1}L/min wdt={}ms",
        config.low_voltage_threshold,
        config.min_run_time_secs,
        config.pause_between_runs_secs,
        config.max_pump_duration_secs,
        config.pump_rate_litres_per_min,
        config.watchdog_timeout_ms,
    );

    // ── 3. Initialise hardware peripherals ────────────────────
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical: log and halt.
        // The watchdog resets the device after its timeout.
        error!(
            "HAL init failed: {}, halting until the watchdog fires ({} ms)",
            e,
            watchdog.timeout_ms()
        );
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 4. I2C bus + OLED ─────────────────────────────────────
    let peripherals = Peripherals::take()?;
    // GPIO16 = SDA, GPIO17 = SCL (see pins::I2C_SDA_GPIO / I2C_SCL_GPIO).
    let i2c_cfg = I2cConfig::new().baudrate(Hertz(config.i2c_frequency_hz));
    let mut i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio16,
        peripherals.pins.gpio17,
        &i2c_cfg,
    )?;
    info!(
        "I2C0 up (SDA={}, SCL={}, {} Hz)",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        config.i2c_frequency_hz
    );

    if config.scan_bus_on_boot {
        log_scan(&scan_bus(&mut i2c));
    }

    let panel = init_ssd1306(i2c, config.display_i2c_address).map_err(sumpctl::error::Error::from)?;
    let mut display = OledDisplay::new(panel);

    // ── 5. Wire adapters ──────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        LevelSensor::new(config.adc_full_scale_volts),
        PumpStatusInput::new(pins::PUMP_STATUS_GPIO),
        PumpDriver::new(pins::PUMP_CONTROL_GPIO),
    );
    let mut clock = Esp32Clock::new();
    let mut sink = LogEventSink::new();

    let mut controller = PumpController::new(config, clock.now());
    controller.start(&mut sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    // Only returns on a fatal error, after the pump has been forced OFF.
    let fatal = run(
        &mut controller,
        &mut hw,
        &mut display,
        &mut clock,
        &mut sink,
        |_| watchdog.feed(),
    );
    Err(fatal.into())
}
