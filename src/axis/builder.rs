//! Builder pattern for Axis.

use crate::components::{Controller, Encoder, Estimator, MeasurementSignal, Motor};
use crate::config::{AxisConfig, SystemConfig};
use crate::error::{ConfigError, Error, Result};

use super::{Axis, AxisParts, SharedAxisState};

/// Builder for creating [`Axis`] instances.
pub struct AxisBuilder<E, S, C, M, W>
where
    E: Encoder,
    S: Estimator,
    C: Controller,
    M: Motor,
    W: MeasurementSignal,
{
    encoder: Option<E>,
    sensorless: Option<S>,
    controller: Option<C>,
    motor: Option<M>,
    signal: Option<W>,
    config: Option<AxisConfig>,
}

impl<E, S, C, M, W> Default for AxisBuilder<E, S, C, M, W>
where
    E: Encoder,
    S: Estimator,
    C: Controller,
    M: Motor,
    W: MeasurementSignal,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, S, C, M, W> AxisBuilder<E, S, C, M, W>
where
    E: Encoder,
    S: Estimator,
    C: Controller,
    M: Motor,
    W: MeasurementSignal,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            encoder: None,
            sensorless: None,
            controller: None,
            motor: None,
            signal: None,
            config: None,
        }
    }

    /// Set the position sensor.
    pub fn encoder(mut self, encoder: E) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Set the sensorless estimator.
    pub fn sensorless_estimator(mut self, estimator: S) -> Self {
        self.sensorless = Some(estimator);
        self
    }

    /// Set the controller.
    pub fn controller(mut self, controller: C) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Set the motor driver.
    pub fn motor(mut self, motor: M) -> Self {
        self.motor = Some(motor);
        self
    }

    /// Set the measurement signal source.
    pub fn signal(mut self, signal: W) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Set the axis configuration directly.
    pub fn config(mut self, config: AxisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Configure from a SystemConfig by axis name.
    pub fn from_config(self, config: &SystemConfig, axis_name: &str) -> Result<Self> {
        let axis_config = config.axis(axis_name).ok_or_else(|| {
            Error::Config(ConfigError::AxisNotFound(
                heapless::String::try_from(axis_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.config(axis_config.clone()))
    }

    /// Build the Axis against its shared cell block.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator or the signal source is missing.
    pub fn build(self, shared: &SharedAxisState) -> Result<Axis<'_, E, S, C, M, W>> {
        let encoder = self.encoder.ok_or_else(|| missing("encoder"))?;
        let sensorless = self.sensorless.ok_or_else(|| missing("sensorless"))?;
        let controller = self.controller.ok_or_else(|| missing("controller"))?;
        let motor = self.motor.ok_or_else(|| missing("motor"))?;
        let signal = self.signal.ok_or_else(|| missing("signal"))?;
        let config = self.config.unwrap_or_default();

        Ok(Axis::new(
            config,
            shared,
            signal,
            AxisParts {
                encoder,
                sensorless,
                controller,
                motor,
            },
        ))
    }
}

fn missing(field: &str) -> Error {
    Error::Config(ConfigError::MissingField(
        heapless::String::try_from(field).unwrap_or_default(),
    ))
}
