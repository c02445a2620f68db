//! The control-loop executor and the operating-mode loops.
//!
//! Every operating mode (spin-up, sensorless run, closed-loop run, idle) is
//! a step function handed to [`Axis::run_control_loop`], which paces it at
//! the current-measurement cadence. The executor's bounded wait is the only
//! blocking point in the system.

use crate::components::{ControlMode, Controller, Encoder, Estimator, MeasurementSignal, Motor};
use crate::error::AxisError;
use crate::math::wrap_pm_pi;

use super::{Axis, AxisParts};

impl<'a, E, S, C, M, W> Axis<'a, E, S, C, M, W>
where
    E: Encoder,
    S: Estimator,
    C: Controller,
    M: Motor,
    W: MeasurementSignal,
{
    /// Run `step` once per current measurement until it finishes, fails, or
    /// a new top-level request preempts it.
    ///
    /// Each iteration: bounded-wait for the measurement signal, run the
    /// safety checks, then invoke `step`. `Ok(true)` continues, `Ok(false)`
    /// is graceful completion, `Err` records the fault and aborts. A wait
    /// timeout is fatal (`CurrentMeasurementTimeout`) unless
    /// `tolerate_timeout` is set, which only the idle loop does.
    ///
    /// Preemption is cooperative and has step granularity: a pending
    /// request is observed between iterations, never mid-step, and exits
    /// with `Ok(())`.
    pub fn run_control_loop<F>(
        &mut self,
        tolerate_timeout: bool,
        mut step: F,
    ) -> Result<(), AxisError>
    where
        F: FnMut(&mut AxisParts<E, S, C, M>) -> Result<bool, AxisError>,
    {
        while !self.shared.request_pending() {
            if !self
                .signal
                .wait_for_measurement(self.config.current_meas_timeout_ms)
            {
                if tolerate_timeout {
                    // Idle has no hard real-time obligation
                    continue;
                }
                self.shared.set_error(AxisError::CurrentMeasurementTimeout);
                return Err(AxisError::CurrentMeasurementTimeout);
            }

            if let Err(e) = self.do_checks() {
                self.shared.set_error(e);
                return Err(e);
            }

            match step(&mut self.parts) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.shared.set_error(e);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Run the axis-level safety checks: motor driver faults and DC bus
    /// brownout.
    ///
    /// Does not record the fault; callers decide whether it is sticky.
    pub fn do_checks(&mut self) -> Result<(), AxisError> {
        if !self.parts.motor.do_checks() {
            return Err(AxisError::MotorFailed);
        }
        if self.shared.vbus_voltage() < self.config.dc_bus_brownout_trip_level {
            return Err(AxisError::DcBusUnderVoltage);
        }
        Ok(())
    }

    /// Open-loop sensorless spin-up.
    ///
    /// Establishes an initial rotor phase and velocity before the sensorless
    /// estimator takes over: a spiral phase ramps current and phase together,
    /// then a constant-current phase accelerates to the handover velocity.
    pub fn run_sensorless_spin_up(&mut self) -> Result<(), AxisError> {
        let period = self.config.current_meas_period;
        let ramp_distance = self.config.ramp_up_distance;
        let ramp_time = self.config.ramp_up_time;
        let spin_up_current = self.config.spin_up_current;

        // Early spin-up: spiral up current
        let mut x = 0.0f32;
        self.run_control_loop(false, |parts| {
            let phase = wrap_pm_pi(ramp_distance * x);
            let current = spin_up_current * x;
            x += period / ramp_time;
            if !parts.motor.update(current, phase) {
                return Err(AxisError::MotorFailed);
            }
            Ok(x < 1.0)
        })?;

        // Late spin-up: accelerate to the handover velocity
        let accel = self.config.spin_up_acceleration;
        let target_vel = self.config.spin_up_target_vel;
        let mut vel = self.config.spin_up_initial_vel();
        let mut phase = wrap_pm_pi(ramp_distance);
        self.run_control_loop(false, |parts| {
            vel += accel * period;
            phase = wrap_pm_pi(phase + vel * period);
            if !parts.motor.update(spin_up_current, phase) {
                return Err(AxisError::MotorFailed);
            }
            Ok(vel < target_vel)
        })
    }

    /// Closed-loop control with the estimate coming from the sensorless
    /// estimator.
    ///
    /// Position control is rejected up front: without a real position
    /// sensor there is nothing to close a position loop on.
    pub fn run_sensorless_control_loop(&mut self) -> Result<(), AxisError> {
        self.shared.set_step_dir_enabled(self.config.enable_step_dir);
        let result = self.run_control_loop(false, |parts| {
            if parts.controller.control_mode() >= ControlMode::Position {
                return Err(AxisError::PositionControlDuringSensorless);
            }

            // The encoder keeps tracking for diagnostics; the result is
            // discarded by contract.
            let _ = parts.encoder.update();
            let est = parts
                .sensorless
                .update()
                .ok_or(AxisError::SensorlessEstimatorFailed)?;
            let current_setpoint = parts
                .controller
                .update(est.position, est.velocity)
                .ok_or(AxisError::ControllerFailed)?;
            if !parts.motor.update(current_setpoint, est.phase) {
                return Err(AxisError::MotorFailed);
            }
            Ok(true)
        });
        // Step/dir input must be off after the loop no matter how it ended
        self.shared.set_step_dir_enabled(false);
        result
    }

    /// Closed-loop control with the estimate coming from the encoder.
    pub fn run_closed_loop_control_loop(&mut self) -> Result<(), AxisError> {
        self.shared.set_step_dir_enabled(self.config.enable_step_dir);
        let result = self.run_control_loop(false, |parts| {
            // The sensorless estimator keeps tracking for diagnostics; the
            // result is discarded by contract.
            let _ = parts.sensorless.update();
            let est = parts.encoder.update().ok_or(AxisError::EncoderFailed)?;
            let current_setpoint = parts
                .controller
                .update(est.position, est.velocity)
                .ok_or(AxisError::ControllerFailed)?;
            if !parts.motor.update(current_setpoint, est.phase) {
                return Err(AxisError::MotorFailed);
            }
            Ok(true)
        });
        self.shared.set_step_dir_enabled(false);
        result
    }

    /// Idle: keep both estimators tracking, drive nothing.
    ///
    /// Missed measurement ticks are tolerated here and only here. Exits when
    /// a new top-level request arrives or a safety check trips.
    pub fn run_idle_loop(&mut self) -> Result<(), AxisError> {
        self.run_control_loop(true, |parts| {
            let _ = parts.sensorless.update();
            let _ = parts.encoder.update();
            Ok(true)
        })
    }
}
