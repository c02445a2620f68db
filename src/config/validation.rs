//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{AxisConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks, per axis:
/// - Spin-up ramp time, target velocity, and acceleration are positive
/// - Current measurement period is positive
/// - Brownout trip level is positive
/// - Step/dir scale is non-negative
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (name, axis) in config.axes.iter() {
        validate_axis(name.as_str(), axis)?;
    }
    Ok(())
}

fn validate_axis(_name: &str, config: &AxisConfig) -> Result<()> {
    if config.ramp_up_time <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidRampUpTime(
            config.ramp_up_time,
        )));
    }

    if config.spin_up_target_vel <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidSpinUpTargetVel(
            config.spin_up_target_vel,
        )));
    }

    if config.spin_up_acceleration <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidSpinUpAcceleration(
            config.spin_up_acceleration,
        )));
    }

    if config.current_meas_period <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidCurrentMeasPeriod(
            config.current_meas_period,
        )));
    }

    if config.dc_bus_brownout_trip_level <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidBrownoutTripLevel(
            config.dc_bus_brownout_trip_level,
        )));
    }

    if config.counts_per_step < 0.0 {
        return Err(Error::Config(ConfigError::InvalidCountsPerStep(
            config.counts_per_step,
        )));
    }

    Ok(())
}
