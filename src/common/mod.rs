// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod config;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From command.rs
pub use command::{
    encode_output_mode, encode_range, encode_test_mode, encode_threshold, encode_timing,
    CommandBuffer, CommandFormatError, ConfigCommand, Segment, ThresholdKind, TimingParam,
};

// From config.rs
pub use config::{ConfigError, OutputConfig, TuningConfig};

// From error.rs
pub use error::Ld1125hError;

// From frame.rs
pub use frame::{FrameReader, FrameTooLong, RawFrame, MAX_FRAME_LEN};

// From hal_traits.rs
pub use hal_traits::{Ld1125hInstant, Ld1125hSerial, Ld1125hTimer, Millis};

#[cfg(feature = "impl-native")]
pub use hal_traits::HalTimer;

// From types.rs
pub use types::{Distance, ParseFailure};
