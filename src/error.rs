//! Error types for the axis-control library.
//!
//! Two layers: [`ConfigError`] for construction-time failures that propagate
//! through `Result`, and [`AxisError`] for the sticky runtime fault codes the
//! state machine records in the shared error cell.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all axis-control operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Axis runtime fault
    Axis(AxisError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Axis name not found in configuration
    AxisNotFound(heapless::String<32>),
    /// Invalid spin-up ramp time (must be > 0)
    InvalidRampUpTime(f32),
    /// Invalid spin-up target velocity (must be > 0)
    InvalidSpinUpTargetVel(f32),
    /// Invalid spin-up acceleration (must be > 0)
    InvalidSpinUpAcceleration(f32),
    /// Invalid current measurement period (must be > 0)
    InvalidCurrentMeasPeriod(f32),
    /// Invalid DC bus brownout trip level (must be > 0)
    InvalidBrownoutTripLevel(f32),
    /// Invalid step/dir scale (must be >= 0)
    InvalidCountsPerStep(f32),
    /// A required builder field is missing
    MissingField(heapless::String<32>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Sticky axis fault codes.
///
/// Recorded in the shared error cell by the state machine, last-one-wins,
/// and cleared only by a successful re-arm from the idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AxisError {
    /// The current measurement signal did not arrive within the timeout
    CurrentMeasurementTimeout = 1,
    /// The motor driver reported a failure
    MotorFailed = 2,
    /// Supply voltage dropped below the brownout trip level
    DcBusUnderVoltage = 3,
    /// Position control was requested while running sensorless
    PositionControlDuringSensorless = 4,
    /// The sensorless estimator could not produce an estimate
    SensorlessEstimatorFailed = 5,
    /// The encoder could not produce an estimate
    EncoderFailed = 6,
    /// The controller could not produce a current setpoint
    ControllerFailed = 7,
    /// An invalid state value reached the dispatcher
    InvalidState = 8,
}

impl AxisError {
    /// Raw code for the shared atomic error cell. Zero means "no error".
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a raw cell value. Zero and unknown codes decode to `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(AxisError::CurrentMeasurementTimeout),
            2 => Some(AxisError::MotorFailed),
            3 => Some(AxisError::DcBusUnderVoltage),
            4 => Some(AxisError::PositionControlDuringSensorless),
            5 => Some(AxisError::SensorlessEstimatorFailed),
            6 => Some(AxisError::EncoderFailed),
            7 => Some(AxisError::ControllerFailed),
            8 => Some(AxisError::InvalidState),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Axis(e) => write!(f, "Axis error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::AxisNotFound(name) => write!(f, "Axis '{}' not found", name),
            ConfigError::InvalidRampUpTime(v) => {
                write!(f, "Invalid ramp_up_time: {}. Must be > 0", v)
            }
            ConfigError::InvalidSpinUpTargetVel(v) => {
                write!(f, "Invalid spin_up_target_vel: {}. Must be > 0", v)
            }
            ConfigError::InvalidSpinUpAcceleration(v) => {
                write!(f, "Invalid spin_up_acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidCurrentMeasPeriod(v) => {
                write!(f, "Invalid current_meas_period: {}. Must be > 0", v)
            }
            ConfigError::InvalidBrownoutTripLevel(v) => {
                write!(f, "Invalid dc_bus_brownout_trip_level: {}. Must be > 0", v)
            }
            ConfigError::InvalidCountsPerStep(v) => {
                write!(f, "Invalid counts_per_step: {}. Must be >= 0", v)
            }
            ConfigError::MissingField(name) => write!(f, "{} is required", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for AxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisError::CurrentMeasurementTimeout => write!(f, "current measurement timeout"),
            AxisError::MotorFailed => write!(f, "motor failed"),
            AxisError::DcBusUnderVoltage => write!(f, "DC bus under-voltage"),
            AxisError::PositionControlDuringSensorless => {
                write!(f, "position control during sensorless operation")
            }
            AxisError::SensorlessEstimatorFailed => write!(f, "sensorless estimator failed"),
            AxisError::EncoderFailed => write!(f, "encoder failed"),
            AxisError::ControllerFailed => write!(f, "controller failed"),
            AxisError::InvalidState => write!(f, "invalid state"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<AxisError> for Error {
    fn from(e: AxisError) -> Self {
        Error::Axis(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for AxisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_round_trip() {
        let all = [
            AxisError::CurrentMeasurementTimeout,
            AxisError::MotorFailed,
            AxisError::DcBusUnderVoltage,
            AxisError::PositionControlDuringSensorless,
            AxisError::SensorlessEstimatorFailed,
            AxisError::EncoderFailed,
            AxisError::ControllerFailed,
            AxisError::InvalidState,
        ];
        for e in all {
            assert_eq!(AxisError::from_code(e.code()), Some(e));
        }
    }

    #[test]
    fn test_zero_code_is_no_error() {
        assert_eq!(AxisError::from_code(0), None);
        assert_eq!(AxisError::from_code(200), None);
    }
}
