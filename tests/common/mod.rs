//! Scripted mock collaborators shared by the integration tests.
//!
//! Each mock records its calls into an `Rc<RefCell<..>>` state block the
//! test keeps a handle to, and can be scripted to fail at a given call
//! index. The measurement signal mock can inject timeouts and post a state
//! request after a given number of waits, standing in for the command
//! interface writing from another context.

use std::cell::RefCell;
use std::rc::Rc;

use axis_control::{
    Axis, AxisBuilder, AxisConfig, AxisState, ControlMode, Controller, Encoder, Estimate,
    Estimator, MeasurementSignal, Motor, SharedAxisState,
};

#[cfg(any(feature = "std", feature = "alloc"))]
use axis_control::CoggingMap;

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SensorState {
    pub calibrated: bool,
    pub update_count: usize,
    pub calibration_count: usize,
    /// Fail `update` from this call index onward.
    pub fail_update_at: Option<usize>,
    pub fail_calibration: bool,
    pub estimate: Estimate,
    pub counts_per_rev: usize,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            calibrated: true,
            update_count: 0,
            calibration_count: 0,
            fail_update_at: None,
            fail_calibration: false,
            estimate: Estimate {
                position: 100.0,
                velocity: 5.0,
                phase: 0.25,
            },
            counts_per_rev: 8192,
        }
    }
}

/// Mock for both the encoder and the sensorless estimator roles.
#[derive(Clone)]
pub struct MockSensor {
    pub state: Rc<RefCell<SensorState>>,
}

impl MockSensor {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SensorState::default())),
        }
    }

    pub fn uncalibrated() -> Self {
        let sensor = Self::new();
        sensor.state.borrow_mut().calibrated = false;
        sensor
    }

    pub fn failing_from(index: usize) -> Self {
        let sensor = Self::new();
        sensor.state.borrow_mut().fail_update_at = Some(index);
        sensor
    }

    pub fn update_count(&self) -> usize {
        self.state.borrow().update_count
    }
}

impl Estimator for MockSensor {
    fn update(&mut self) -> Option<Estimate> {
        let mut s = self.state.borrow_mut();
        let index = s.update_count;
        s.update_count += 1;
        match s.fail_update_at {
            Some(at) if index >= at => None,
            _ => Some(s.estimate),
        }
    }

    fn run_calibration(&mut self) -> bool {
        let mut s = self.state.borrow_mut();
        s.calibration_count += 1;
        if s.fail_calibration {
            return false;
        }
        s.calibrated = true;
        true
    }

    fn is_calibrated(&self) -> bool {
        self.state.borrow().calibrated
    }
}

impl Encoder for MockSensor {
    fn counts_per_rev(&self) -> usize {
        self.state.borrow().counts_per_rev
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ControllerState {
    pub mode: ControlMode,
    pub update_count: usize,
    pub fail_update: bool,
    pub last_estimate: Option<(f32, f32)>,
    pub setpoint: f32,
    pub cogging_map_len: Option<usize>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            mode: ControlMode::Velocity,
            update_count: 0,
            fail_update: false,
            last_estimate: None,
            setpoint: 1.5,
            cogging_map_len: None,
        }
    }
}

#[derive(Clone)]
pub struct MockController {
    pub state: Rc<RefCell<ControllerState>>,
}

impl MockController {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ControllerState::default())),
        }
    }

    pub fn with_mode(mode: ControlMode) -> Self {
        let controller = Self::new();
        controller.state.borrow_mut().mode = mode;
        controller
    }

    pub fn update_count(&self) -> usize {
        self.state.borrow().update_count
    }
}

impl Controller for MockController {
    fn control_mode(&self) -> ControlMode {
        self.state.borrow().mode
    }

    fn update(&mut self, pos_estimate: f32, vel_estimate: f32) -> Option<f32> {
        let mut s = self.state.borrow_mut();
        s.update_count += 1;
        s.last_estimate = Some((pos_estimate, vel_estimate));
        if s.fail_update {
            None
        } else {
            Some(s.setpoint)
        }
    }

    #[cfg(any(feature = "std", feature = "alloc"))]
    fn set_cogging_map(&mut self, map: CoggingMap) {
        self.state.borrow_mut().cogging_map_len = Some(map.len());
    }
}

// ---------------------------------------------------------------------------
// Motor
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MotorState {
    pub calibrated: bool,
    pub arm_count: usize,
    pub calibration_count: usize,
    /// Every (current, phase) pair the orchestrator commanded.
    pub updates: Vec<(f32, f32)>,
    /// Fail `update` from this call index onward.
    pub fail_update_at: Option<usize>,
    pub fail_arm: bool,
    pub fail_checks: bool,
    pub fail_calibration: bool,
}

#[derive(Clone)]
pub struct MockMotor {
    pub state: Rc<RefCell<MotorState>>,
}

impl MockMotor {
    pub fn new() -> Self {
        let motor = Self {
            state: Rc::new(RefCell::new(MotorState::default())),
        };
        motor.state.borrow_mut().calibrated = true;
        motor
    }

    pub fn uncalibrated() -> Self {
        let motor = Self::new();
        motor.state.borrow_mut().calibrated = false;
        motor
    }

    pub fn update_count(&self) -> usize {
        self.state.borrow().updates.len()
    }
}

impl Motor for MockMotor {
    fn update(&mut self, current_setpoint: f32, phase: f32) -> bool {
        let mut s = self.state.borrow_mut();
        let index = s.updates.len();
        s.updates.push((current_setpoint, phase));
        match s.fail_update_at {
            Some(at) if index >= at => false,
            _ => true,
        }
    }

    fn run_calibration(&mut self) -> bool {
        let mut s = self.state.borrow_mut();
        s.calibration_count += 1;
        if s.fail_calibration {
            return false;
        }
        s.calibrated = true;
        true
    }

    fn arm(&mut self) -> bool {
        let mut s = self.state.borrow_mut();
        s.arm_count += 1;
        !s.fail_arm
    }

    fn do_checks(&mut self) -> bool {
        !self.state.borrow().fail_checks
    }

    fn is_calibrated(&self) -> bool {
        self.state.borrow().calibrated
    }
}

// ---------------------------------------------------------------------------
// Measurement signal
// ---------------------------------------------------------------------------

/// Scripted stand-in for the current-measurement interrupt handoff.
pub struct MockSignal<'a> {
    shared: &'a SharedAxisState,
    pub waits: usize,
    /// Wait indices that time out instead of delivering a signal.
    pub timeouts_at: Vec<usize>,
    /// Post this request once `waits` reaches the given index, as if the
    /// command interface wrote it from another context.
    pub request_after: Option<(usize, AxisState)>,
}

impl<'a> MockSignal<'a> {
    /// A signal source that always delivers on time.
    pub fn always(shared: &'a SharedAxisState) -> Self {
        Self {
            shared,
            waits: 0,
            timeouts_at: Vec::new(),
            request_after: None,
        }
    }

    pub fn with_request_after(mut self, wait_index: usize, state: AxisState) -> Self {
        self.request_after = Some((wait_index, state));
        self
    }

    pub fn with_timeouts_at(mut self, indices: &[usize]) -> Self {
        self.timeouts_at = indices.to_vec();
        self
    }
}

impl MeasurementSignal for MockSignal<'_> {
    fn wait_for_measurement(&mut self, _timeout_ms: u32) -> bool {
        let index = self.waits;
        self.waits += 1;
        if let Some((at, state)) = self.request_after {
            if index >= at {
                self.shared.request_state(state);
            }
        }
        !self.timeouts_at.contains(&index)
    }
}

// ---------------------------------------------------------------------------
// Rig
// ---------------------------------------------------------------------------

pub type MockAxis<'a> = Axis<'a, MockSensor, MockSensor, MockController, MockMotor, MockSignal<'a>>;

/// Collaborator handles the test keeps after handing the mocks to the axis.
pub struct Rig {
    pub encoder: MockSensor,
    pub sensorless: MockSensor,
    pub controller: MockController,
    pub motor: MockMotor,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            encoder: MockSensor::new(),
            sensorless: MockSensor::new(),
            controller: MockController::new(),
            motor: MockMotor::new(),
        }
    }
}

/// Build an axis from a rig. The shared block gets a healthy bus voltage so
/// the brownout check passes unless a test lowers it.
pub fn build_axis<'a>(
    config: AxisConfig,
    shared: &'a SharedAxisState,
    rig: &Rig,
    signal: MockSignal<'a>,
) -> MockAxis<'a> {
    if shared.vbus_voltage() == 0.0 {
        shared.set_vbus_voltage(24.0);
    }
    AxisBuilder::new()
        .encoder(rig.encoder.clone())
        .sensorless_estimator(rig.sensorless.clone())
        .controller(rig.controller.clone())
        .motor(rig.motor.clone())
        .signal(signal)
        .config(config)
        .build(shared)
        .expect("axis builds")
}
