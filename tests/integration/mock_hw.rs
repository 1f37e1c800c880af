//! Mock adapters for integration tests.
//!
//! Records every actuator call, display frame and event so tests can
//! assert on the full history without touching real GPIO or I2C.

use std::time::Duration;

use sumpctl::app::events::{AppEvent, MetricsSnapshot};
use sumpctl::app::ports::{ActuatorPort, Clock, DisplayPort, EventSink, SensorPort};
use sumpctl::error::{ActuatorError, DisplayError, SensorError};
use sumpctl::fsm::context::StopReason;
use sumpctl::timestamp::Timestamp;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    SetPump(bool),
}

// ── MockHardware ──────────────────────────────────────────────

/// Sensor + actuator mock.  `voltage` is returned by every read until
/// changed; failures can be injected per port.
pub struct MockHardware {
    pub voltage: f32,
    pub pump_status: bool,
    pub sensor_fault: Option<SensorError>,
    /// Voltage reads that succeed before the ADC starts failing.
    pub fail_after_reads: Option<u32>,
    pub actuator_fault: bool,
    pub calls: Vec<ActuatorCall>,
    pub voltage_reads: u32,
    pump_on: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(voltage: f32) -> Self {
        Self {
            voltage,
            pump_status: false,
            sensor_fault: None,
            fail_after_reads: None,
            actuator_fault: false,
            calls: Vec::new(),
            voltage_reads: 0,
            pump_on: false,
        }
    }

    pub fn last_call(&self) -> Option<&ActuatorCall> {
        self.calls.last()
    }

    pub fn on_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == ActuatorCall::SetPump(true))
            .count()
    }

    pub fn off_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == ActuatorCall::SetPump(false))
            .count()
    }
}

impl SensorPort for MockHardware {
    fn read_voltage(&mut self) -> Result<f32, SensorError> {
        self.voltage_reads += 1;
        if self.fail_after_reads.is_some_and(|n| self.voltage_reads > n) {
            return Err(SensorError::AdcReadFailed);
        }
        match self.sensor_fault {
            Some(e) => Err(e),
            None => Ok(self.voltage),
        }
    }

    fn read_pump_status(&mut self) -> Result<bool, SensorError> {
        Ok(self.pump_status)
    }
}

impl ActuatorPort for MockHardware {
    fn set_pump(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::SetPump(on));
        if self.actuator_fault {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.pump_on = on;
        Ok(())
    }

    fn is_pump_on(&self) -> bool {
        self.pump_on
    }
}

// ── RecordingDisplay ──────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<MetricsSnapshot>,
    pub fault: Option<DisplayError>,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&MetricsSnapshot> {
        self.frames.last()
    }
}

impl DisplayPort for RecordingDisplay {
    fn render(&mut self, snapshot: &MetricsSnapshot) -> Result<(), DisplayError> {
        if let Some(e) = self.fault {
            return Err(e);
        }
        self.frames.push(*snapshot);
        Ok(())
    }
}

// ── FakeClock ─────────────────────────────────────────────────

/// Clock that only moves when slept on.
pub struct FakeClock {
    pub now: Timestamp,
    pub sleeps: Vec<Duration>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn at(now: Timestamp) -> Self {
        Self {
            now,
            sleeps: Vec::new(),
        }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        self.now = self.now.after(duration);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn stop_reasons(&self) -> Vec<StopReason> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::PumpStopped { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
