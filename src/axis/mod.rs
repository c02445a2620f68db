//! Axis orchestration.
//!
//! The [`Axis`] state machine owns the task chain, drives the collaborator
//! components, and is the only thing allowed to command motor power.

mod builder;
mod control_loop;
mod shared;
mod state;
mod step_dir;

pub use builder::AxisBuilder;
pub use shared::SharedAxisState;
pub use state::{AxisState, TaskChain, TASK_CHAIN_CAPACITY};
pub use step_dir::StepDirBridge;

use crate::components::{Controller, Encoder, Estimator, MeasurementSignal, Motor};
use crate::config::AxisConfig;
use crate::error::AxisError;

#[cfg(any(feature = "std", feature = "alloc"))]
use crate::components::CoggingMap;

/// The collaborator components of one axis.
///
/// Grouped so control-loop step functions can borrow all four while the
/// executor holds the rest of the axis.
pub struct AxisParts<E, S, C, M> {
    /// Position sensor.
    pub encoder: E,
    /// Sensorless rotor estimator.
    pub sensorless: S,
    /// Closed-loop controller.
    pub controller: C,
    /// Motor driver.
    pub motor: M,
}

/// One axis: state machine, task chain, and collaborator components.
///
/// The state-machine loop runs on a dedicated worker; everything it shares
/// with other contexts goes through the [`SharedAxisState`] handle given at
/// construction.
pub struct Axis<'a, E, S, C, M, W>
where
    E: Encoder,
    S: Estimator,
    C: Controller,
    M: Motor,
    W: MeasurementSignal,
{
    pub(crate) config: AxisConfig,
    pub(crate) shared: &'a SharedAxisState,
    pub(crate) signal: W,
    pub(crate) parts: AxisParts<E, S, C, M>,
    task_chain: TaskChain,
}

impl<'a, E, S, C, M, W> Axis<'a, E, S, C, M, W>
where
    E: Encoder,
    S: Estimator,
    C: Controller,
    M: Motor,
    W: MeasurementSignal,
{
    /// Start building an axis.
    pub fn builder() -> AxisBuilder<E, S, C, M, W> {
        AxisBuilder::new()
    }

    pub(crate) fn new(
        config: AxisConfig,
        shared: &'a SharedAxisState,
        signal: W,
        parts: AxisParts<E, S, C, M>,
    ) -> Self {
        Self {
            config,
            shared,
            signal,
            parts,
            task_chain: TaskChain::new(),
        }
    }

    /// The axis configuration.
    #[inline]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// The shared cell block this axis reports through.
    #[inline]
    pub fn shared(&self) -> &'a SharedAxisState {
        self.shared
    }

    /// The pending task chain, front first.
    #[inline]
    pub fn task_chain(&self) -> &TaskChain {
        &self.task_chain
    }

    /// Whether the motor holds a valid calibration.
    #[inline]
    pub fn motor_is_calibrated(&self) -> bool {
        self.parts.motor.is_calibrated()
    }

    /// Whether the encoder holds a valid calibration.
    #[inline]
    pub fn encoder_is_calibrated(&self) -> bool {
        self.parts.encoder.is_calibrated()
    }

    /// One-time run preparation: allocate the anti-cogging map and arm.
    ///
    /// The cogging map is sized to the encoder resolution and lives for the
    /// rest of the run loop. Allocation failure is non-fatal; compensation
    /// is simply disabled.
    pub fn start(&mut self) {
        #[cfg(any(feature = "std", feature = "alloc"))]
        {
            let cpr = self.parts.encoder.counts_per_rev();
            if let Some(map) = CoggingMap::try_zeroed(cpr) {
                self.parts.controller.set_cogging_map(map);
            }
        }

        let _ = self.parts.motor.arm();
    }

    /// Run the state machine forever.
    ///
    /// This is an always-on control process: fatal-looking conditions
    /// degrade the axis to idle, they never stop the loop.
    pub fn run_state_machine_loop(&mut self) -> ! {
        self.start();
        loop {
            self.state_machine_iteration();
        }
    }

    /// One iteration of the state machine: consume a pending request,
    /// validate the chain head, dispatch it, and advance or collapse the
    /// chain on its status.
    pub fn state_machine_iteration(&mut self) {
        // Load the task chain if a specific request is pending
        let raw = self.shared.take_requested_raw();
        if raw != 0 {
            match AxisState::from_code(raw) {
                Some(request) => self.load_task_chain(request),
                None => {
                    // Undecodable request: fault it and fall back to idle,
                    // picked up at the next iteration
                    self.shared.set_error(AxisError::InvalidState);
                    self.task_chain.collapse_to_idle();
                    self.shared.set_current_state(AxisState::Idle);
                    return;
                }
            }
        }

        // Validate the state before running it
        let mut head = self.task_chain.head();
        if head.requires_motor_calibration() && !self.parts.motor.is_calibrated() {
            head = AxisState::Undefined;
        }
        if head.requires_encoder_calibration() && !self.parts.encoder.is_calibrated() {
            head = AxisState::Undefined;
        }
        self.task_chain.set_head(head);
        self.shared.set_current_state(head);

        // Run the specified state. Long-running handlers exit once a new
        // request is pending.
        let status = match head {
            AxisState::MotorCalibration => self.parts.motor.run_calibration(),

            AxisState::EncoderCalibration => self.parts.encoder.run_calibration(),

            AxisState::SensorlessControl => self
                .run_sensorless_spin_up()
                .and_then(|()| self.run_sensorless_control_loop())
                .is_ok(),

            AxisState::ClosedLoopControl => self.run_closed_loop_control_loop().is_ok(),

            AxisState::Idle => self.run_idle_and_rearm(),

            // Downgraded or exhausted chain: fall back to idle silently
            AxisState::Undefined => false,

            // Sequence requests are expanded, never dispatched
            AxisState::StartupSequence | AxisState::FullCalibrationSequence => {
                self.shared.set_error(AxisError::InvalidState);
                false
            }
        };

        // If the state failed, go to idle, else advance the task chain.
        // Telemetry tracks the chain head, so a collapse publishes Idle
        // right away rather than leaving a downgraded Undefined visible.
        if status {
            self.task_chain.advance();
        } else {
            self.task_chain.collapse_to_idle();
            self.shared.set_current_state(AxisState::Idle);
        }
    }

    /// Expand a top-level request into a fresh task chain.
    fn load_task_chain(&mut self, request: AxisState) {
        let mut plan: heapless::Vec<AxisState, TASK_CHAIN_CAPACITY> = heapless::Vec::new();
        match request {
            AxisState::StartupSequence => {
                if self.config.startup_motor_calibration {
                    let _ = plan.push(AxisState::MotorCalibration);
                }
                if self.config.startup_encoder_calibration {
                    let _ = plan.push(AxisState::EncoderCalibration);
                }
                if self.config.startup_closed_loop_control {
                    let _ = plan.push(AxisState::ClosedLoopControl);
                } else if self.config.startup_sensorless_control {
                    let _ = plan.push(AxisState::SensorlessControl);
                }
                let _ = plan.push(AxisState::Idle);
            }
            AxisState::FullCalibrationSequence => {
                let _ = plan.extend_from_slice(&[
                    AxisState::MotorCalibration,
                    AxisState::EncoderCalibration,
                    AxisState::Idle,
                ]);
            }
            other => {
                let _ = plan.push(other);
                let _ = plan.push(AxisState::Idle);
            }
        }
        let _ = self.task_chain.load(&plan);
    }

    /// Idle until something happens, then try to get back into an armable
    /// state.
    ///
    /// Re-arming requires the safety checks to pass; only a successful
    /// re-arm clears the sticky error.
    fn run_idle_and_rearm(&mut self) -> bool {
        let _ = self.run_idle_loop();

        // Done with idling - try to arm the motor
        if let Err(e) = self.do_checks() {
            self.shared.set_error(e);
            return false;
        }
        if self.parts.motor.arm() {
            self.shared.clear_error();
            true
        } else {
            self.shared.set_error(AxisError::MotorFailed);
            false
        }
    }
}
