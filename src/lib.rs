// src/lib.rs

#![no_std] // Specify no_std at the crate root

pub mod common;
pub mod driver;
pub mod sensor;

// Re-export key types for convenience
pub use common::{Ld1125hError, OutputConfig, TuningConfig};
pub use driver::{ConfigStatus, Ld1125h};
pub use sensor::{PresenceState, ReadingSink, SensorState, Update};
