//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌─────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ State   │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├─────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Idle    │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ Running │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Resting │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └─────────┴───────────┴──────────┴───────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The current state lives in [`ControllerState`](context::ControllerState),
//! not in the engine, so there is exactly one owner of it.  Each tick the
//! engine calls `on_update` for the current state.  If it returns
//! `Some(next)`, the engine runs `on_exit` for the current state, stores
//! the new state, then runs `on_enter` for it.  The enter/exit hooks are
//! where the timer fields are set and cleared and where the pump accounting
//! is committed, which keeps `pump_start_time` tied to `Running` and
//! `rest_start_time` tied to `Resting`.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;
use serde::Serialize;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Pump controller states. Exactly one holds at any time.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum PumpState {
    Idle = 0,
    Running = 1,
    Resting = 2,
}

impl PumpState {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 3;

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Resting => "Resting",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<PumpState>;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: PumpState,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

/// A completed state change, reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PumpState,
    pub to: PumpState,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine: a fixed table indexed by `PumpState`.
pub struct Fsm {
    table: [StateDescriptor; PumpState::COUNT],
}

impl Fsm {
    pub fn new(table: [StateDescriptor; PumpState::COUNT]) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id as usize == i),
            "state table out of order"
        );
        Self { table }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&self, ctx: &mut FsmContext) {
        let current = ctx.state.state;
        info!("FSM starting in state: {}", current.name());
        if let Some(enter) = self.table[current as usize].on_enter {
            enter(ctx);
        }
    }

    /// Evaluate the current state's update handler once and apply the
    /// transition it asks for, if any.
    pub fn tick(&self, ctx: &mut FsmContext) -> Option<Transition> {
        let current = ctx.state.state;
        let next = (self.table[current as usize].on_update)(ctx)?;
        if next == current {
            return None;
        }
        Some(self.transition(next, ctx))
    }

    /// Jump straight to `next`, running the exit and enter hooks.
    /// No-op when already there.
    pub fn force_transition(&self, next: PumpState, ctx: &mut FsmContext) -> Option<Transition> {
        if next == ctx.state.state {
            return None;
        }
        Some(self.transition(next, ctx))
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&self, next: PumpState, ctx: &mut FsmContext) -> Transition {
        let from = ctx.state.state;
        info!("FSM transition: {} -> {}", from.name(), next.name());

        if let Some(exit) = self.table[from as usize].on_exit {
            exit(ctx);
        }

        ctx.state.state = next;

        if let Some(enter) = self.table[next as usize].on_enter {
            enter(ctx);
        }

        Transition { from, to: next }
    }
}
