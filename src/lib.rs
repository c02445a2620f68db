//! # axis-control
//!
//! Per-axis motor control orchestration with embedded-hal 1.0 support.
//!
//! One [`Axis`] owns the lifecycle of a single mechanical axis: it sequences
//! calibration, open-loop spin-up, and closed-loop operation, arbitrates
//! between sensorless and sensor-based estimation, and guarantees that motor
//! power is only ever driven by a validated state.
//!
//! ## Features
//!
//! - **Trait-based collaborators**: encoder, sensorless estimator, controller,
//!   and motor driver plug in behind narrow capability traits
//! - **Task-chain state machine**: high-level requests expand into ordered
//!   chains of primitive states, executed strictly front-to-back
//! - **Interrupt-safe sharing**: state requests, error status, and the
//!   step/dir position setpoint are lock-free atomic cells
//! - **Configuration-driven**: axis startup behavior and spin-up ramp
//!   parameters load from TOML files
//! - **no_std compatible**: core library works without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axis_control::{Axis, AxisState, SharedAxisState, SystemConfig};
//!
//! // Load configuration from TOML
//! let config: SystemConfig = axis_control::load_config("axes.toml")?;
//!
//! // One shared cell block per axis; the command interface, the step/dir
//! // interrupt, and the state-machine worker all talk through it.
//! let shared = SharedAxisState::new();
//!
//! let mut axis = Axis::builder()
//!     .encoder(encoder)
//!     .sensorless_estimator(estimator)
//!     .controller(controller)
//!     .motor(motor)
//!     .signal(meas_signal)
//!     .from_config(&config, "axis0")?
//!     .build(&shared)?;
//!
//! // Ask for the startup sequence and hand the axis to its worker.
//! shared.request_state(AxisState::StartupSequence);
//! axis.run_state_machine_loop();
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables cogging-map allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod axis;
pub mod components;
pub mod config;
pub mod error;
pub mod math;

// Re-exports for ergonomic API
pub use axis::{Axis, AxisBuilder, AxisState, SharedAxisState, StepDirBridge, TaskChain};
pub use components::{
    ControlMode, Controller, Encoder, Estimate, Estimator, MeasurementSignal, Motor,
};
pub use config::{validate_config, AxisConfig, SystemConfig};
pub use error::{AxisError, ConfigError, Error, Result};
pub use math::wrap_pm_pi;

#[cfg(any(feature = "std", feature = "alloc"))]
pub use components::CoggingMap;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
