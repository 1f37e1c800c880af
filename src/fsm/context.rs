//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard the state handlers read from and write
//! to: the sample taken this tick, the configuration, the safety fault
//! mask, and the [`ControllerState`] that carries the pump timers and the
//! committed usage accumulators.

use crate::config::SystemConfig;
use crate::safety::SafetyFault;
use crate::timestamp::Timestamp;

use super::PumpState;

// ---------------------------------------------------------------------------
// Controller state (timers + committed accumulators)
// ---------------------------------------------------------------------------

/// Pump timers and usage accumulators.
///
/// Created once at startup with every accumulator at zero. Only the FSM
/// enter/exit hooks mutate it. `litres_pumped` and `pump_active_time_secs`
/// change only when a run ends; they are `f64` so short runs still count
/// after months of accumulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub(crate) state: PumpState,
    pub(crate) litres_pumped: f64,
    pub(crate) pump_cycles: u32,
    pub(crate) pump_active_time_secs: f64,
    pub(crate) pump_start_time: Option<Timestamp>,
    pub(crate) rest_start_time: Option<Timestamp>,
    pub(crate) last_pump_stop_time: Option<Timestamp>,
    pub(crate) process_start_time: Timestamp,
    /// Most recent sensor voltage, shown while resting.
    pub(crate) last_voltage: f32,
}

impl ControllerState {
    pub fn new(process_start_time: Timestamp) -> Self {
        Self {
            state: PumpState::Idle,
            litres_pumped: 0.0,
            pump_cycles: 0,
            pump_active_time_secs: 0.0,
            pump_start_time: None,
            rest_start_time: None,
            last_pump_stop_time: None,
            process_start_time,
            last_voltage: 0.0,
        }
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn litres_pumped(&self) -> f64 {
        self.litres_pumped
    }

    pub fn pump_cycles(&self) -> u32 {
        self.pump_cycles
    }

    pub fn pump_active_time_secs(&self) -> f64 {
        self.pump_active_time_secs
    }

    pub fn pump_start_time(&self) -> Option<Timestamp> {
        self.pump_start_time
    }

    pub fn rest_start_time(&self) -> Option<Timestamp> {
        self.rest_start_time
    }

    pub fn last_pump_stop_time(&self) -> Option<Timestamp> {
        self.last_pump_stop_time
    }

    pub fn process_start_time(&self) -> Timestamp {
        self.process_start_time
    }

    pub fn last_voltage(&self) -> f32 {
        self.last_voltage
    }

    /// Active time and volume including the run in progress, for display.
    /// Never written back; the committed values only move at stop.
    pub fn live_totals(&self, now: Timestamp, rate_litres_per_min: f32) -> (f64, f64) {
        match (self.state, self.pump_start_time) {
            (PumpState::Running, Some(start)) => {
                let elapsed = now.secs_since(start);
                (
                    self.pump_active_time_secs + elapsed,
                    self.litres_pumped + f64::from(rate_litres_per_min) * (elapsed / 60.0),
                )
            }
            _ => (self.pump_active_time_secs, self.litres_pumped),
        }
    }
}

// ---------------------------------------------------------------------------
// Handler outputs
// ---------------------------------------------------------------------------

/// Pump output requested by a state handler. Applied by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpCommand {
    On,
    Off,
}

impl PumpCommand {
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Level recovered and the minimum run time was met.
    LevelRecovered,
    /// The run hit the maximum pump duration.
    SafetyCutoff,
    /// A rest period was requested while running.
    Rest,
    /// The control loop hit a fatal error.
    Fault,
}

/// Accounting for a run that has just been committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedRun {
    pub run_secs: f64,
    pub litres: f64,
    pub reason: StopReason,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    /// Timestamp of the current tick.
    pub now: Timestamp,
    /// Sensor voltage sampled this tick.
    pub voltage: f32,
    /// System configuration (tunable parameters).
    pub config: SystemConfig,
    /// Accumulated safety fault bitmask (see [`SafetyFault::mask`]).
    pub fault_flags: u8,
    /// Timers and accumulators.
    pub state: ControllerState,
    /// Pump command produced by a transition, consumed by the controller.
    pub command: Option<PumpCommand>,
    /// Reason to record for the next stop; defaults to level recovery.
    pub stop_reason: Option<StopReason>,
    /// Set when a run is committed, consumed by the controller.
    pub last_stop: Option<CompletedRun>,
}

impl FsmContext {
    pub fn new(config: SystemConfig, now: Timestamp) -> Self {
        Self {
            now,
            voltage: 0.0,
            config,
            fault_flags: 0,
            state: ControllerState::new(now),
            command: None,
            stop_reason: None,
            last_stop: None,
        }
    }

    /// Check whether a specific fault flag is set.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.fault_flags & fault.mask() != 0
    }
}
