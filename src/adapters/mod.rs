//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                 |
//! |------------|--------------|-----------------------------|
//! | `hardware` | SensorPort   | ESP32 ADC1, GPIO input      |
//! |            | ActuatorPort | Pump relay GPIO             |
//! | `display`  | DisplayPort  | SSD1306 OLED over I2C       |
//! | `log_sink` | EventSink    | Serial log output           |
//! | `time`     | Clock        | ESP32 system timer          |

pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod time;
