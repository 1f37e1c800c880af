//! Safety supervisor.
//!
//! The supervisor runs **every tick before the FSM** and accumulates a
//! fault bitmask in `FsmContext.fault_flags`.  The `Running` handler checks
//! this mask and stops the pump when any cutoff fault is set, independent
//! of what the level sensor says.
//!
//! ## Fault lifecycle
//!
//! 1. A run reaches the maximum pump duration.
//! 2. The supervisor sets `RunTimeExceeded` in `fault_flags`.
//! 3. The FSM leaves `Running` on the same tick; the stop is committed
//!    like any other, so the pause gate still applies.
//! 4. Next tick the pump is no longer running and the bit clears.

use core::fmt;

use crate::fsm::context::ControllerState;
use crate::fsm::PumpState;
use crate::timestamp::Timestamp;
use log::{error, info};

// ---------------------------------------------------------------------------
// Fault flags
// ---------------------------------------------------------------------------

/// Individual safety faults, as bits in a `u8` mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// The pump has been running for the maximum allowed duration.
    RunTimeExceeded = 0b0000_0001,
}

impl SafetyFault {
    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunTimeExceeded => write!(f, "maximum pump run time exceeded"),
        }
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

/// Safety supervisor.
pub struct SafetySupervisor {
    max_run_secs: u32,
    /// Latched fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new(max_pump_duration_secs: u32) -> Self {
        Self {
            max_run_secs: max_pump_duration_secs,
            faults: 0,
        }
    }

    /// Evaluate all safety conditions against the controller state at `now`.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, state: &ControllerState, now: Timestamp) -> u8 {
        // ── Run time cap ──────────────────────────────────────────
        let over_cap = match (state.state(), state.pump_start_time()) {
            (PumpState::Running, Some(start)) => now.has_elapsed(start, self.max_run_secs),
            _ => false,
        };
        self.eval_fault(SafetyFault::RunTimeExceeded, over_cap);

        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// Check if a specific fault is active.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a fault bit based on a boolean condition.
    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SAFETY FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
