//! Concrete state handler functions and table builder.
//!
//! ```text
//!  IDLE ──[V < low threshold, pause elapsed]──▶ RUNNING
//!    ▲                                            │
//!    │        [V ≥ low threshold, min run met]    │
//!    └────────[or run time cap reached]───────────┘
//!
//!  RESTING ──[rest duration elapsed]──▶ IDLE
//! ```
//!
//! Resting is entered only on request; no handler transitions into it.

use super::context::{CompletedRun, FsmContext, PumpCommand, StopReason};
use super::{PumpState, StateDescriptor};
use crate::safety::SafetyFault;
use log::{debug, info, warn};

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; PumpState::COUNT] {
    [
        StateDescriptor {
            id: PumpState::Idle,
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: PumpState::Running,
            on_enter: Some(running_enter),
            on_exit: Some(running_exit),
            on_update: running_update,
        },
        StateDescriptor {
            id: PumpState::Resting,
            on_enter: Some(resting_enter),
            on_exit: Some(resting_exit),
            on_update: resting_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(_ctx: &mut FsmContext) {
    debug!("IDLE: pump off, watching level");
}

fn idle_update(ctx: &mut FsmContext) -> Option<PumpState> {
    if ctx.voltage < ctx.config.low_voltage_threshold && pause_elapsed(ctx) {
        return Some(PumpState::Running);
    }
    None
}

/// The start gate: no previous stop, or the pause since it has passed.
fn pause_elapsed(ctx: &FsmContext) -> bool {
    match ctx.state.last_pump_stop_time {
        None => true,
        Some(stop) => ctx.now.has_elapsed(stop, ctx.config.pause_between_runs_secs),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING
// ═══════════════════════════════════════════════════════════════════════════

fn running_enter(ctx: &mut FsmContext) {
    ctx.state.pump_start_time = Some(ctx.now);
    ctx.state.pump_cycles = ctx.state.pump_cycles.saturating_add(1);
    ctx.command = Some(PumpCommand::On);
    info!(
        "RUNNING: turning pump ON at {:.2} V (cycle {})",
        ctx.voltage, ctx.state.pump_cycles
    );
}

fn running_update(ctx: &mut FsmContext) -> Option<PumpState> {
    if ctx.has_fault(SafetyFault::RunTimeExceeded) {
        ctx.stop_reason = Some(StopReason::SafetyCutoff);
        return Some(PumpState::Idle);
    }

    let start = ctx.state.pump_start_time?;
    if ctx.voltage >= ctx.config.low_voltage_threshold
        && ctx.now.has_elapsed(start, ctx.config.min_run_time_secs)
    {
        return Some(PumpState::Idle);
    }

    // Below the minimum run time the pump keeps going even if the level
    // has already recovered.
    None
}

fn running_exit(ctx: &mut FsmContext) {
    let reason = ctx.stop_reason.take().unwrap_or(StopReason::LevelRecovered);
    let Some(start) = ctx.state.pump_start_time.take() else {
        warn!("RUNNING exit without a start time; nothing to commit");
        return;
    };

    let run_secs = ctx.now.secs_since(start);
    let litres = f64::from(ctx.config.pump_rate_litres_per_min) * (run_secs / 60.0);
    ctx.state.pump_active_time_secs += run_secs;
    ctx.state.litres_pumped += litres;
    ctx.state.last_pump_stop_time = Some(ctx.now);
    ctx.command = Some(PumpCommand::Off);
    ctx.last_stop = Some(CompletedRun {
        run_secs,
        litres,
        reason,
    });
    info!(
        "RUNNING: turning pump OFF after {:.1}s (+{:.2} L, {:?})",
        run_secs, litres, reason
    );
}

// ═══════════════════════════════════════════════════════════════════════════
//  RESTING
// ═══════════════════════════════════════════════════════════════════════════

fn resting_enter(ctx: &mut FsmContext) {
    ctx.state.rest_start_time = Some(ctx.now);
    info!("RESTING: pump locked out for {}s", ctx.config.rest_duration_secs);
}

fn resting_update(ctx: &mut FsmContext) -> Option<PumpState> {
    match ctx.state.rest_start_time {
        Some(start) if ctx.now.has_elapsed(start, ctx.config.rest_duration_secs) => {
            Some(PumpState::Idle)
        }
        Some(_) => None,
        None => Some(PumpState::Idle),
    }
}

fn resting_exit(ctx: &mut FsmContext) {
    ctx.state.rest_start_time = None;
    info!("Rest period over. Resuming normal operation.");
}
