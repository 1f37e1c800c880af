//! Pump controller — the hexagonal core.
//!
//! [`PumpController`] owns the FSM, the safety supervisor and the shared
//! context.  All I/O flows through port traits injected at call sites,
//! making each tick testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                 │     PumpController       │
//! ActuatorPort ◀──│  Safety · FSM · Metrics  │ ──▶ DisplayPort
//!                 └─────────────────────────┘
//!                              ▲
//!                            Clock (run loop)
//! ```

use core::time::Duration;

use log::{error, info, warn};

use crate::config::SystemConfig;
use crate::error::{Error, Result};
use crate::fsm::context::{ControllerState, FsmContext, PumpCommand, StopReason};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, PumpState, Transition};
use crate::safety::SafetySupervisor;
use crate::timestamp::Timestamp;

use super::events::{AppEvent, MetricsSnapshot};
use super::ports::{ActuatorPort, Clock, DisplayPort, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// Tick result
// ───────────────────────────────────────────────────────────────

/// What one control tick did and how long the loop should wait next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// State after the tick.
    pub state: PumpState,
    /// Pump command applied this tick, if any.
    pub command: Option<PumpCommand>,
    /// State change made this tick, if any.
    pub transition: Option<Transition>,
    /// Metrics pushed to the display.
    pub snapshot: MetricsSnapshot,
    /// Delay before the next tick.
    pub sleep: Duration,
}

// ───────────────────────────────────────────────────────────────
// PumpController
// ───────────────────────────────────────────────────────────────

pub struct PumpController {
    fsm: Fsm,
    ctx: FsmContext,
    safety: SafetySupervisor,
    last_telemetry: Timestamp,
    tick_count: u64,
}

impl PumpController {
    /// Construct the controller with every accumulator at zero and the
    /// process start time fixed at `now`.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, now: Timestamp) -> Self {
        let safety = SafetySupervisor::new(config.max_pump_duration_secs);
        let ctx = FsmContext::new(config, now);
        let fsm = Fsm::new(build_state_table());

        Self {
            fsm,
            ctx,
            safety,
            last_telemetry: now,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its initial state (Idle).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.state()));
        info!("PumpController started in {:?}", self.state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle at `now`: rest gate → sensors → safety → FSM
    /// → pump → display.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.  Any port error is returned
    /// as-is; applying the fail-safe is up to the caller (see [`run_once`]).
    pub fn tick(
        &mut self,
        now: Timestamp,
        hw: &mut (impl SensorPort + ActuatorPort),
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Result<TickOutcome> {
        self.tick_count += 1;
        self.ctx.now = now;

        // 1. Resting: no sensor evaluation until the rest period ends.
        let mut transition = None;
        if self.state() == PumpState::Resting {
            transition = self.fsm.tick(&mut self.ctx);
            match transition {
                Some(t) => sink.emit(&AppEvent::StateChanged {
                    from: t.from,
                    to: t.to,
                }),
                None => return self.resting_tick(now, display, sink),
            }
        }

        // 2. Read sensors via SensorPort
        let voltage = hw.read_voltage()?;
        let pump_status = hw.read_pump_status()?;
        self.ctx.voltage = voltage;
        self.ctx.state.last_voltage = voltage;
        sink.emit(&AppEvent::Diagnostic {
            voltage,
            pump_status,
        });

        // 3. Safety evaluation
        let prev_faults = self.ctx.fault_flags;
        let faults = self.safety.evaluate(&self.ctx.state, now);
        self.ctx.fault_flags = faults;
        if faults != 0 && prev_faults == 0 {
            warn!("Safety fault! flags=0b{:08b}", faults);
            sink.emit(&AppEvent::FaultDetected(faults));
        } else if faults == 0 && prev_faults != 0 {
            sink.emit(&AppEvent::FaultCleared);
        }

        // 4. FSM tick (pure state logic)
        let fsm_transition = self.fsm.tick(&mut self.ctx);

        // 5. Apply the pump command via ActuatorPort
        let command = self.apply_outputs(hw, sink, fsm_transition)?;
        transition = fsm_transition.or(transition);

        // 6. Metrics to the display
        let snapshot = self.snapshot(now);
        display.render(&snapshot)?;

        // 7. Periodic telemetry
        if now.has_elapsed(self.last_telemetry, self.ctx.config.telemetry_interval_secs) {
            self.last_telemetry = now;
            sink.emit(&AppEvent::Telemetry(snapshot));
        }

        Ok(TickOutcome {
            state: self.state(),
            command,
            transition,
            snapshot,
            sleep: Duration::from_millis(u64::from(self.ctx.config.control_loop_interval_ms)),
        })
    }

    /// Stop any run in progress and lock the pump out for the configured
    /// rest duration.  No-op when already resting.
    pub fn enter_rest(
        &mut self,
        now: Timestamp,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if self.state() == PumpState::Resting {
            return Ok(());
        }
        self.ctx.now = now;
        if self.state() == PumpState::Running {
            self.ctx.stop_reason = Some(StopReason::Rest);
        }
        let transition = self.fsm.force_transition(PumpState::Resting, &mut self.ctx);
        self.apply_outputs(hw, sink, transition)?;
        Ok(())
    }

    /// Force the pump OFF after a fatal error.
    ///
    /// A run in progress is committed with [`StopReason::Fault`].  A failure
    /// to drive the output here is only logged; the original error is what
    /// the caller propagates.
    pub fn fail_safe(
        &mut self,
        now: Timestamp,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
        err: Error,
    ) {
        self.ctx.now = now;
        if self.state() == PumpState::Running {
            self.ctx.stop_reason = Some(StopReason::Fault);
            if let Some(t) = self.fsm.force_transition(PumpState::Idle, &mut self.ctx) {
                sink.emit(&AppEvent::StateChanged {
                    from: t.from,
                    to: t.to,
                });
            }
            self.ctx.command = None;
        }
        self.emit_stop(sink);

        if let Err(e) = hw.set_pump(false) {
            error!("fail-safe: could not force pump OFF: {e}");
        }
        sink.emit(&AppEvent::Fatal(err));
    }

    // ── Queries ───────────────────────────────────────────────

    /// Metrics at `now`, including the run in progress.
    pub fn snapshot(&self, now: Timestamp) -> MetricsSnapshot {
        let s = &self.ctx.state;
        let (active, litres) = s.live_totals(now, self.ctx.config.pump_rate_litres_per_min);
        MetricsSnapshot::new(
            now.secs_since(s.process_start_time()) as f32,
            active as f32,
            s.pump_cycles(),
            litres as f32,
            s.last_voltage(),
            s.state(),
        )
    }

    /// Current FSM state.
    pub fn state(&self) -> PumpState {
        self.ctx.state.state()
    }

    /// Timers and committed accumulators.
    pub fn controller_state(&self) -> &ControllerState {
        &self.ctx.state
    }

    /// Current active fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.ctx.fault_flags
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }


    // ── Internal ──────────────────────────────────────────────

    fn resting_tick(
        &mut self,
        now: Timestamp,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Result<TickOutcome> {
        let remaining_secs = match self.ctx.state.rest_start_time() {
            Some(start) => {
                (f64::from(self.ctx.config.rest_duration_secs) - now.secs_since(start)).max(0.0)
                    as f32
            }
            None => 0.0,
        };
        sink.emit(&AppEvent::Resting { remaining_secs });

        let snapshot = self.snapshot(now);
        display.render(&snapshot)?;

        Ok(TickOutcome {
            state: PumpState::Resting,
            command: None,
            transition: None,
            snapshot,
            sleep: Duration::from_millis(u64::from(self.ctx.config.rest_loop_interval_ms)),
        })
    }

    /// Translate the FSM's pump command into a port call and report what
    /// happened.
    ///
    /// The FSM has already moved by the time the output is written, so the
    /// stop and transition are reported even when the write fails.
    fn apply_outputs(
        &mut self,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
        transition: Option<Transition>,
    ) -> Result<Option<PumpCommand>> {
        let command = self.ctx.command.take();
        let written = match command {
            Some(cmd) => hw.set_pump(cmd.is_on()),
            None => Ok(()),
        };
        if written.is_ok() && command.is_some_and(PumpCommand::is_on) {
            sink.emit(&AppEvent::PumpStarted {
                cycle: self.ctx.state.pump_cycles(),
                voltage: self.ctx.voltage,
            });
        }
        self.emit_stop(sink);

        if let Some(t) = transition {
            sink.emit(&AppEvent::StateChanged {
                from: t.from,
                to: t.to,
            });
        }
        written?;
        Ok(command)
    }

    fn emit_stop(&mut self, sink: &mut impl EventSink) {
        if let Some(run) = self.ctx.last_stop.take() {
            sink.emit(&AppEvent::PumpStopped {
                run_secs: run.run_secs,
                litres: run.litres,
                reason: run.reason,
            });
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Run loop
// ───────────────────────────────────────────────────────────────

/// One loop iteration: tick at `clock.now()`, then sleep as requested.
///
/// Any error is fatal: the pump is forced OFF before the error is
/// returned.
pub fn run_once<H, D, C, E>(
    controller: &mut PumpController,
    hw: &mut H,
    display: &mut D,
    clock: &mut C,
    sink: &mut E,
) -> Result<TickOutcome>
where
    H: SensorPort + ActuatorPort,
    D: DisplayPort,
    C: Clock,
    E: EventSink,
{
    let now = clock.now();
    match controller.tick(now, hw, display, sink) {
        Ok(outcome) => {
            clock.sleep(outcome.sleep);
            Ok(outcome)
        }
        Err(e) => {
            error!(
                "control loop fault on tick {}: {e}; forcing pump OFF",
                controller.tick_count()
            );
            controller.fail_safe(now, hw, sink, e);
            Err(e)
        }
    }
}

/// Tick forever.  `after_tick` runs after every successful iteration
/// (e.g. to feed a watchdog).  Only returns on a fatal error.
pub fn run<H, D, C, E>(
    controller: &mut PumpController,
    hw: &mut H,
    display: &mut D,
    clock: &mut C,
    sink: &mut E,
    mut after_tick: impl FnMut(&TickOutcome),
) -> Error
where
    H: SensorPort + ActuatorPort,
    D: DisplayPort,
    C: Clock,
    E: EventSink,
{
    loop {
        match run_once(controller, hw, display, clock, sink) {
            Ok(outcome) => after_tick(&outcome),
            Err(e) => return e,
        }
    }
}
