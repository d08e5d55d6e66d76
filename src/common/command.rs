//! LD1125H command frames.
//!
//! The sensor accepts plain `key=value` lines terminated by `<CR><LF>`. Each
//! tuning parameter is sent as its own frame; the sensor answers every frame
//! with a `received message...` line.

use core::fmt::{self, Write};

use arrayvec::ArrayString;

use super::config::ConfigError;

/// Capacity of a formatted command, including the trailing `<CR><LF>`.
pub const COMMAND_BUFFER_LEN: usize = 24;

/// A formatted command, ready to be written to the UART.
pub type CommandBuffer = ArrayString<COMMAND_BUFFER_LEN>;

/// Distance band a sensitivity threshold applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// 0 - 2.8 m (`mth1_*`).
    Near,
    /// 2.8 - 8 m (`mth2_*`).
    Mid,
    /// Beyond 8 m (`mth3_*`).
    Far,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Near, Segment::Mid, Segment::Far];
}

/// Which detector a sensitivity threshold tunes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ThresholdKind {
    /// Moving-target detector (`mth*_mov`).
    Movement,
    /// Stationary-target detector (`mth*_occ`).
    Occupancy,
}

/// Which of the two sensor-internal timing thresholds a command sets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TimingParam {
    On,
    Off,
}

/// A single command frame sent to the sensor during initialization.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ConfigCommand {
    /// `rmax=<meters>` - maximum detection range.
    RangeMax { meters: f32 },
    /// `mth<n>_<mov|occ>=<value>` - per-segment sensitivity.
    Threshold { segment: Segment, kind: ThresholdKind, value: u8 },
    /// `ts_on=<n>` / `ts_off=<n>`.
    Timing { param: TimingParam, value: u32 },
    /// `output_mode=<0|1>` - 0 reports over serial, 1 over the GPIO header.
    OutputMode(u8),
    /// `test_mode=<0|1>` - 1 adds signal strength to occupancy frames.
    TestMode(u8),
    /// `VER` - ask the sensor for its firmware version.
    QueryVersion,
    /// `get_all` - ask the sensor to dump its current settings.
    QueryAll,
}

impl ConfigCommand {
    /// The configuration key this command writes, as used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigCommand::RangeMax { .. } => "rmax",
            ConfigCommand::Threshold { segment, kind, .. } => threshold_name(*segment, *kind),
            ConfigCommand::Timing { param: TimingParam::On, .. } => "ts_on",
            ConfigCommand::Timing { param: TimingParam::Off, .. } => "ts_off",
            ConfigCommand::OutputMode(_) => "output_mode",
            ConfigCommand::TestMode(_) => "test_mode",
            ConfigCommand::QueryVersion => "VER",
            ConfigCommand::QueryAll => "get_all",
        }
    }

    /// Formats the command into a fixed buffer, terminated by `<CR><LF>`.
    pub fn format_into(&self) -> Result<CommandBuffer, CommandFormatError> {
        let mut buffer = CommandBuffer::new();
        write!(buffer, "{}\r\n", self).map_err(|_| CommandFormatError::BufferOverflow)?;
        Ok(buffer)
    }
}

impl fmt::Display for ConfigCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigCommand::RangeMax { meters } => write!(f, "rmax={:.2}", meters),
            ConfigCommand::Threshold { value, .. } => write!(f, "{}={}", self.name(), value),
            ConfigCommand::Timing { value, .. } => write!(f, "{}={}", self.name(), value),
            ConfigCommand::OutputMode(mode) => write!(f, "output_mode={}", mode),
            ConfigCommand::TestMode(mode) => write!(f, "test_mode={}", mode),
            ConfigCommand::QueryVersion | ConfigCommand::QueryAll => f.write_str(self.name()),
        }
    }
}

fn threshold_name(segment: Segment, kind: ThresholdKind) -> &'static str {
    match (segment, kind) {
        (Segment::Near, ThresholdKind::Movement) => "mth1_mov",
        (Segment::Mid, ThresholdKind::Movement) => "mth2_mov",
        (Segment::Far, ThresholdKind::Movement) => "mth3_mov",
        (Segment::Near, ThresholdKind::Occupancy) => "mth1_occ",
        (Segment::Mid, ThresholdKind::Occupancy) => "mth2_occ",
        (Segment::Far, ThresholdKind::Occupancy) => "mth3_occ",
    }
}

/// Error raised when a command does not fit its output buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandFormatError {
    #[error("command buffer overflow")]
    BufferOverflow,
}

// --- Encoders ---

/// Maximum detection range accepted by the sensor, in meters.
pub const RMAX_RANGE: core::ops::RangeInclusive<f32> = 0.0..=10.0;
/// Valid range of every segment sensitivity threshold.
pub const THRESHOLD_MAX: u8 = 100;

/// Encodes the maximum detection range. Rejects values outside 0-10 m (and NaN).
pub fn encode_range(rmax: f32) -> Result<ConfigCommand, ConfigError> {
    if RMAX_RANGE.contains(&rmax) {
        Ok(ConfigCommand::RangeMax { meters: rmax })
    } else {
        Err(ConfigError::OutOfRange { param: "rmax" })
    }
}

/// Encodes one of the six segment sensitivity thresholds (0-100).
pub fn encode_threshold(
    segment: Segment,
    kind: ThresholdKind,
    value: u8,
) -> Result<ConfigCommand, ConfigError> {
    if value <= THRESHOLD_MAX {
        Ok(ConfigCommand::Threshold { segment, kind, value })
    } else {
        Err(ConfigError::OutOfRange { param: threshold_name(segment, kind) })
    }
}

/// Encodes both timing thresholds. Each must be a positive integer.
pub fn encode_timing(ts_on: u32, ts_off: u32) -> Result<[ConfigCommand; 2], ConfigError> {
    if ts_on == 0 {
        return Err(ConfigError::OutOfRange { param: "ts_on" });
    }
    if ts_off == 0 {
        return Err(ConfigError::OutOfRange { param: "ts_off" });
    }
    Ok([
        ConfigCommand::Timing { param: TimingParam::On, value: ts_on },
        ConfigCommand::Timing { param: TimingParam::Off, value: ts_off },
    ])
}

/// Encodes the output mode (0 = serial, 1 = GPIO).
pub fn encode_output_mode(mode: u8) -> Result<ConfigCommand, ConfigError> {
    match mode {
        0 | 1 => Ok(ConfigCommand::OutputMode(mode)),
        _ => Err(ConfigError::OutOfRange { param: "output_mode" }),
    }
}

/// Encodes the test mode (1 = include signal strength in occupancy frames).
pub fn encode_test_mode(mode: u8) -> Result<ConfigCommand, ConfigError> {
    match mode {
        0 | 1 => Ok(ConfigCommand::TestMode(mode)),
        _ => Err(ConfigError::OutOfRange { param: "test_mode" }),
    }
}
