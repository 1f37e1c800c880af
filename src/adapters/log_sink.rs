//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Telemetry snapshots are written as one JSON object per line so they
//! can be scraped off the serial console.

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Diagnostic {
                voltage,
                pump_status,
            } => {
                debug!("Voltage at level sensor: {:.2} V", voltage);
                debug!("Pump Status: {}", if *pump_status { "ON" } else { "OFF" });
            }
            AppEvent::Telemetry(snap) => match serde_json::to_string(snap) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | serialise failed: {}", e),
            },
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::PumpStarted { cycle, voltage } => {
                info!("PUMP | ON  cycle={} V={:.2}", cycle, voltage);
            }
            AppEvent::PumpStopped {
                run_secs,
                litres,
                reason,
            } => {
                info!(
                    "PUMP | OFF after {:.1}s, +{:.2} L ({:?})",
                    run_secs, litres, reason
                );
            }
            AppEvent::Resting { remaining_secs } => {
                info!("REST | Resting... {:.0}s left", remaining_secs);
            }
            AppEvent::FaultDetected(flags) => {
                warn!("FAULT | detected, flags=0b{:08b}", flags);
            }
            AppEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::Fatal(e) => {
                error!("FATAL | {} (pump forced OFF)", e);
            }
        }
    }
}
