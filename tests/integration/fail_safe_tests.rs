//! Fatal-error policy: the pump is forced OFF before any error propagates.

use crate::mock_hw::{ActuatorCall, FakeClock, MockHardware, RecordingDisplay, RecordingSink};

use sumpctl::app::controller::{PumpController, run, run_once};
use sumpctl::app::events::AppEvent;
use sumpctl::app::ports::ActuatorPort;
use sumpctl::config::SystemConfig;
use sumpctl::error::{ActuatorError, DisplayError, Error, SensorError};
use sumpctl::fsm::PumpState;
use sumpctl::fsm::context::StopReason;
use sumpctl::timestamp::Timestamp;

struct Rig {
    ctl: PumpController,
    hw: MockHardware,
    display: RecordingDisplay,
    clock: FakeClock,
    sink: RecordingSink,
}

impl Rig {
    fn new(voltage: f32) -> Self {
        let mut sink = RecordingSink::new();
        let mut ctl = PumpController::new(SystemConfig::default(), Timestamp::from_secs(0));
        ctl.start(&mut sink);
        Self {
            ctl,
            hw: MockHardware::new(voltage),
            display: RecordingDisplay::new(),
            clock: FakeClock::at(Timestamp::from_secs(0)),
            sink,
        }
    }

    fn step(&mut self) -> Result<PumpState, Error> {
        run_once(
            &mut self.ctl,
            &mut self.hw,
            &mut self.display,
            &mut self.clock,
            &mut self.sink,
        )
        .map(|o| o.state)
    }

    fn fatal(&self) -> Option<Error> {
        self.sink.events.iter().find_map(|e| match e {
            AppEvent::Fatal(err) => Some(*err),
            _ => None,
        })
    }
}

#[test]
fn sensor_failure_while_running_forces_pump_off() {
    let mut rig = Rig::new(1.0);
    assert_eq!(rig.step(), Ok(PumpState::Running));
    rig.step().unwrap();

    rig.hw.sensor_fault = Some(SensorError::AdcReadFailed);
    let sleeps_before = rig.clock.sleeps.len();
    let err = rig.step().unwrap_err();

    assert_eq!(err, Error::Sensor(SensorError::AdcReadFailed));
    assert_eq!(rig.hw.last_call(), Some(&ActuatorCall::SetPump(false)));
    assert_eq!(rig.ctl.state(), PumpState::Idle);
    assert_eq!(rig.sink.stop_reasons(), vec![StopReason::Fault]);
    assert_eq!(rig.fatal(), Some(err));
    assert_eq!(rig.clock.sleeps.len(), sleeps_before, "no sleep after a fault");
}

#[test]
fn sensor_failure_while_idle_still_drives_off() {
    let mut rig = Rig::new(2.5);
    rig.hw.sensor_fault = Some(SensorError::OutOfRange);
    assert!(rig.step().is_err());
    assert_eq!(rig.hw.calls, vec![ActuatorCall::SetPump(false)]);
    assert!(rig.sink.stop_reasons().is_empty());
}

#[test]
fn actuator_failure_is_fatal_even_if_off_also_fails() {
    let mut rig = Rig::new(1.0);
    rig.hw.actuator_fault = true;
    let err = rig.step().unwrap_err();

    assert_eq!(err, Error::Actuator(ActuatorError::GpioWriteFailed));
    // The ON attempt, then the best-effort OFF.
    assert_eq!(
        rig.hw.calls,
        vec![ActuatorCall::SetPump(true), ActuatorCall::SetPump(false)]
    );
    assert_eq!(rig.ctl.state(), PumpState::Idle);
    assert_eq!(rig.fatal(), Some(err));
}

#[test]
fn failed_off_write_still_reports_the_stop() {
    let mut rig = Rig::new(1.0);
    assert_eq!(rig.step(), Ok(PumpState::Running));

    rig.hw.voltage = 3.0;
    rig.hw.actuator_fault = true;
    rig.clock.now = Timestamp::from_secs(20);
    let err = rig.step().unwrap_err();

    assert_eq!(err, Error::Actuator(ActuatorError::GpioWriteFailed));
    assert_eq!(rig.ctl.state(), PumpState::Idle);
    assert_eq!(rig.sink.stop_reasons(), vec![StopReason::LevelRecovered]);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::StateChanged {
                from: PumpState::Running,
                to: PumpState::Idle
            }
        )),
        1
    );
    assert!((rig.ctl.controller_state().pump_active_time_secs() - 20.0).abs() < 1e-6);
    assert_eq!(rig.fatal(), Some(err));

    // The committed run is not reported a second time later on.
    rig.hw.actuator_fault = false;
    rig.ctl
        .enter_rest(Timestamp::from_secs(25), &mut rig.hw, &mut rig.sink)
        .unwrap();
    assert_eq!(rig.sink.stop_reasons().len(), 1);
    assert_eq!(
        rig.hw.calls,
        vec![
            ActuatorCall::SetPump(true),
            ActuatorCall::SetPump(false),
            ActuatorCall::SetPump(false),
        ]
    );
}

#[test]
fn display_failure_is_fatal() {
    let mut rig = Rig::new(1.0);
    rig.display.fault = Some(DisplayError::BusError);
    let err = rig.step().unwrap_err();

    assert_eq!(err, Error::Display(DisplayError::BusError));
    assert_eq!(rig.hw.last_call(), Some(&ActuatorCall::SetPump(false)));
    assert!(!rig.hw.is_pump_on());
}

#[test]
fn run_returns_first_fatal_error() {
    let mut rig = Rig::new(2.5);
    rig.hw.fail_after_reads = Some(3);
    let mut ticks = 0;
    let err = run(
        &mut rig.ctl,
        &mut rig.hw,
        &mut rig.display,
        &mut rig.clock,
        &mut rig.sink,
        |_| ticks += 1,
    );
    assert_eq!(err, Error::Sensor(SensorError::AdcReadFailed));
    assert_eq!(ticks, 3);
    assert_eq!(rig.hw.last_call(), Some(&ActuatorCall::SetPump(false)));
}
