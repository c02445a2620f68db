//! Collaborator contracts consumed by the axis orchestrator.
//!
//! The numeric internals of the encoder, sensorless estimator, controller,
//! and motor driver live outside this crate; each one plugs in behind the
//! narrow capability trait defined here. Implementations that need shared
//! axis data (configuration, bus voltage, the step/dir position setpoint)
//! take a read-only [`SharedAxisState`](crate::SharedAxisState) handle at
//! construction.

#[cfg(all(feature = "alloc", not(feature = "std")))]
use alloc::vec::Vec;

/// One rotor state estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Estimate {
    /// Position estimate in encoder counts.
    pub position: f32,
    /// Velocity estimate in counts per second.
    pub velocity: f32,
    /// Electrical phase in radians, wrapped into (-pi, pi].
    pub phase: f32,
}

/// Controller operating mode, ordered from least to most demanding of the
/// position estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMode {
    /// Direct voltage commands.
    Voltage,
    /// Current (torque) control.
    Current,
    /// Velocity control.
    Velocity,
    /// Position control. Requires a real position sensor.
    Position,
}

/// Rotor state estimation capability.
///
/// `update` runs once per current measurement. A `None` result means the
/// component could not produce an estimate this cycle; whether that is fatal
/// is the caller's decision (diagnostic updates discard the result by
/// contract).
pub trait Estimator {
    /// Advance the estimator by one measurement cycle.
    fn update(&mut self) -> Option<Estimate>;

    /// Run the component's calibration routine to completion.
    ///
    /// Returns `true` on success.
    fn run_calibration(&mut self) -> bool;

    /// Whether a valid calibration is present.
    fn is_calibrated(&self) -> bool;
}

/// A physical position sensor.
///
/// Beyond plain estimation, an encoder knows its resolution, which sizes the
/// anti-cogging compensation table.
pub trait Encoder: Estimator {
    /// Encoder counts per mechanical revolution.
    fn counts_per_rev(&self) -> usize;
}

/// Closed-loop controller capability.
///
/// The controller owns the anti-cogging compensation table; the orchestrator
/// allocates it and hands it over at run start.
pub trait Controller {
    /// The currently configured control mode.
    fn control_mode(&self) -> ControlMode;

    /// Compute the current setpoint for one cycle from the latest estimate.
    ///
    /// Returns `None` if the controller cannot produce a setpoint.
    fn update(&mut self, pos_estimate: f32, vel_estimate: f32) -> Option<f32>;

    /// Install the anti-cogging compensation table.
    ///
    /// Called once per run-loop lifetime; the controller mutates the map
    /// from then on. Never called when allocation failed (compensation is
    /// simply disabled).
    #[cfg(any(feature = "std", feature = "alloc"))]
    fn set_cogging_map(&mut self, map: CoggingMap);
}

/// Motor driver capability.
///
/// All methods report success as `true`; the orchestrator translates
/// failures into its own sticky fault codes.
pub trait Motor {
    /// Drive one cycle with the given current magnitude and electrical phase.
    fn update(&mut self, current_setpoint: f32, phase: f32) -> bool;

    /// Run the motor parameter calibration routine to completion.
    fn run_calibration(&mut self) -> bool;

    /// Arm the gate drivers.
    fn arm(&mut self) -> bool;

    /// Run the driver's own fault checks.
    fn do_checks(&mut self) -> bool;

    /// Whether a valid motor calibration is present.
    fn is_calibrated(&self) -> bool;
}

/// Blocking handoff from the current-sense interrupt to the control loop.
///
/// This is the single blocking point in the whole system. It is a one-slot
/// signal, not a queue: a signal posted while nobody waits is consumed by
/// the next wait, and a second post before that simply coalesces.
pub trait MeasurementSignal {
    /// Block until the next measurement-ready signal arrives.
    ///
    /// Returns `true` if the signal arrived within `timeout_ms`, `false` on
    /// timeout.
    fn wait_for_measurement(&mut self, timeout_ms: u32) -> bool;
}

/// Anti-cogging compensation table.
///
/// One entry per encoder count. Allocated fallibly by the orchestrator at
/// run start and owned by the controller afterwards.
#[cfg(any(feature = "std", feature = "alloc"))]
#[derive(Debug, Clone, PartialEq)]
pub struct CoggingMap {
    values: Vec<f32>,
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl CoggingMap {
    /// Allocate a zero-initialized map with one entry per encoder count.
    ///
    /// Returns `None` if the allocation fails; the caller degrades by
    /// running without compensation.
    pub fn try_zeroed(counts_per_rev: usize) -> Option<Self> {
        let mut values = Vec::new();
        values.try_reserve_exact(counts_per_rev).ok()?;
        values.resize(counts_per_rev, 0.0);
        Some(Self { values })
    }

    /// Number of entries (encoder counts per revolution).
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read the compensation value for an encoder count.
    #[inline]
    pub fn get(&self, count: usize) -> Option<f32> {
        self.values.get(count).copied()
    }

    /// Mutable access for the controller's calibration pass.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }
}
