//! Per-axis configuration from TOML.

use serde::Deserialize;

/// Complete configuration for one axis.
///
/// Defaults match a typical small BLDC setup; every field can be overridden
/// per axis in the TOML file. All angles are electrical radians, currents
/// are amps, voltages are volts, times are seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Run motor calibration as part of the startup sequence.
    #[serde(default)]
    pub startup_motor_calibration: bool,

    /// Run encoder calibration as part of the startup sequence.
    #[serde(default)]
    pub startup_encoder_calibration: bool,

    /// Enter closed-loop control at the end of the startup sequence.
    ///
    /// Takes precedence over `startup_sensorless_control` when both are set.
    #[serde(default)]
    pub startup_closed_loop_control: bool,

    /// Enter sensorless control at the end of the startup sequence.
    #[serde(default)]
    pub startup_sensorless_control: bool,

    /// Accept step/dir input while in a control loop.
    #[serde(default)]
    pub enable_step_dir: bool,

    /// Position setpoint change per step pulse, in encoder counts.
    #[serde(default = "default_counts_per_step")]
    pub counts_per_step: f32,

    /// DC bus voltage below which the axis trips a brownout fault.
    #[serde(default = "default_brownout_trip_level")]
    pub dc_bus_brownout_trip_level: f32,

    /// Duration of the spin-up spiral phase in seconds.
    #[serde(default = "default_ramp_up_time")]
    pub ramp_up_time: f32,

    /// Electrical distance covered by the spiral phase, in radians.
    #[serde(default = "default_ramp_up_distance")]
    pub ramp_up_distance: f32,

    /// Commanded current magnitude during spin-up, in amps.
    #[serde(default = "default_spin_up_current")]
    pub spin_up_current: f32,

    /// Acceleration during the late spin-up phase, in rad/s^2.
    #[serde(default = "default_spin_up_acceleration")]
    pub spin_up_acceleration: f32,

    /// Electrical velocity at which spin-up hands over to the sensorless
    /// estimator, in rad/s.
    #[serde(default = "default_spin_up_target_vel")]
    pub spin_up_target_vel: f32,

    /// Current measurement period in seconds (the control loop cadence).
    #[serde(default = "default_current_meas_period")]
    pub current_meas_period: f32,

    /// Bounded-wait timeout for the measurement signal, in milliseconds.
    #[serde(default = "default_current_meas_timeout_ms")]
    pub current_meas_timeout_ms: u32,
}

fn default_counts_per_step() -> f32 {
    2.0
}

fn default_brownout_trip_level() -> f32 {
    8.0
}

fn default_ramp_up_time() -> f32 {
    0.4
}

fn default_ramp_up_distance() -> f32 {
    4.0 * core::f32::consts::PI
}

fn default_spin_up_current() -> f32 {
    10.0
}

fn default_spin_up_acceleration() -> f32 {
    400.0
}

fn default_spin_up_target_vel() -> f32 {
    400.0
}

fn default_current_meas_period() -> f32 {
    1.0 / 8000.0
}

fn default_current_meas_timeout_ms() -> u32 {
    2
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            startup_motor_calibration: false,
            startup_encoder_calibration: false,
            startup_closed_loop_control: false,
            startup_sensorless_control: false,
            enable_step_dir: false,
            counts_per_step: default_counts_per_step(),
            dc_bus_brownout_trip_level: default_brownout_trip_level(),
            ramp_up_time: default_ramp_up_time(),
            ramp_up_distance: default_ramp_up_distance(),
            spin_up_current: default_spin_up_current(),
            spin_up_acceleration: default_spin_up_acceleration(),
            spin_up_target_vel: default_spin_up_target_vel(),
            current_meas_period: default_current_meas_period(),
            current_meas_timeout_ms: default_current_meas_timeout_ms(),
        }
    }
}

impl AxisConfig {
    /// Velocity at the end of the spiral phase, in rad/s.
    ///
    /// This is where the late spin-up acceleration ramp begins.
    #[inline]
    pub fn spin_up_initial_vel(&self) -> f32 {
        self.ramp_up_distance / self.ramp_up_time
    }
}
