//! Configuration module for axis-control.
//!
//! Provides types for loading and validating per-axis configurations from
//! TOML files (with `std` feature) or pre-parsed data. Configuration is
//! immutable while the state machine runs.

mod axis;
#[cfg(feature = "std")]
mod loader;
mod system;
mod validation;

pub use axis::AxisConfig;
pub use system::SystemConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
