//! Outbound application events.
//!
//! The [`PumpController`](super::controller::PumpController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them.

use serde::Serialize;

use crate::error::Error;
use crate::fsm::context::StopReason;
use crate::fsm::PumpState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The controller has started (carries initial state).
    Started(PumpState),

    /// The FSM transitioned between states.
    StateChanged { from: PumpState, to: PumpState },

    /// The pump was switched on.
    PumpStarted { cycle: u32, voltage: f32 },

    /// The pump was switched off and the run committed.
    PumpStopped {
        run_secs: f64,
        litres: f64,
        reason: StopReason,
    },

    /// A resting tick was skipped; sensor not evaluated.
    Resting { remaining_secs: f32 },

    /// One or more safety faults were raised.
    FaultDetected(u8),

    /// All safety faults have been cleared.
    FaultCleared,

    /// Per-tick sensor readout.
    Diagnostic { voltage: f32, pump_status: bool },

    /// Periodic telemetry snapshot.
    Telemetry(MetricsSnapshot),

    /// The loop hit an unrecoverable error; the pump has been forced off.
    Fatal(Error),
}

/// Point-in-time usage metrics, as shown on the display.
///
/// `active_secs` and `litres` include the run in progress, if any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub elapsed_secs: f32,
    pub active_secs: f32,
    pub duty_cycle_percent: f32,
    pub pump_cycles: u32,
    pub litres: f32,
    pub voltage: f32,
    pub state: PumpState,
}

impl MetricsSnapshot {
    pub fn new(
        elapsed_secs: f32,
        active_secs: f32,
        pump_cycles: u32,
        litres: f32,
        voltage: f32,
        state: PumpState,
    ) -> Self {
        Self {
            elapsed_secs,
            active_secs,
            duty_cycle_percent: duty_cycle(active_secs, elapsed_secs),
            pump_cycles,
            litres,
            voltage,
            state,
        }
    }
}

/// Percentage of `elapsed` spent pumping, in `[0, 100]`; zero before any
/// time has passed.
pub fn duty_cycle(active_secs: f32, elapsed_secs: f32) -> f32 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    (active_secs / elapsed_secs * 100.0).clamp(0.0, 100.0)
}
