// src/common/config.rs

use core::time::Duration;

use arrayvec::ArrayVec;

use super::command::{
    encode_output_mode, encode_range, encode_test_mode, encode_threshold, encode_timing,
    ConfigCommand, Segment, ThresholdKind,
};
use super::timing::DEFAULT_MOTION_TIMEOUT;

/// Number of tuning frames a valid configuration produces.
pub const TUNING_COMMAND_COUNT: usize = 11;

/// Tuning frames plus the optional `VER` and `get_all` queries.
pub const MAX_CONFIG_COMMANDS: usize = TUNING_COMMAND_COUNT + 2;

/// A tuning value was rejected before any frame was sent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("`{param}` is out of range")]
    OutOfRange { param: &'static str },
}

/// User-facing tuning parameters for the LD1125H.
///
/// Field names match the configuration keys of the sensor firmware, so a host can
/// deserialize them directly (with the `serde` feature). Missing keys fall back to
/// the defaults from the datasheet.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TuningConfig {
    /// Maximum detection range in meters (0-10).
    pub rmax: f32,
    pub mth1_mov: u8,
    pub mth2_mov: u8,
    pub mth3_mov: u8,
    pub mth1_occ: u8,
    pub mth2_occ: u8,
    pub mth3_occ: u8,
    pub ts_on: u32,
    pub ts_off: u32,
    pub output_mode: u8,
    pub test_mode: u8,
    /// Ask for and log the firmware version once configuration is done.
    pub log_version: bool,
    /// Ask for and log the sensor's settings dump once configuration is done.
    pub log_get_all: bool,
    /// Log every raw frame received from the sensor.
    pub log_sensor_output: bool,
    /// How long motion is held after the last `mov` frame, in milliseconds.
    pub motion_timeout: u32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            rmax: 6.0,
            mth1_mov: 80,
            mth2_mov: 50,
            mth3_mov: 20,
            mth1_occ: 60,
            mth2_occ: 55,
            mth3_occ: 20,
            ts_on: 60,
            ts_off: 15,
            output_mode: 0,
            test_mode: 0,
            log_version: false,
            log_get_all: false,
            log_sensor_output: false,
            motion_timeout: DEFAULT_MOTION_TIMEOUT.as_millis() as u32,
        }
    }
}

impl TuningConfig {
    /// Checks every value against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.commands().map(|_| ())
    }

    /// Encodes the eleven tuning frames in the order the sensor receives them.
    ///
    /// Fails on the first out-of-range value; nothing is produced in that case.
    pub fn commands(&self) -> Result<ArrayVec<ConfigCommand, TUNING_COMMAND_COUNT>, ConfigError> {
        if self.motion_timeout == 0 {
            return Err(ConfigError::OutOfRange { param: "motion_timeout" });
        }

        let mut commands = ArrayVec::new();
        commands.push(encode_range(self.rmax)?);

        let movement = [self.mth1_mov, self.mth2_mov, self.mth3_mov];
        let occupancy = [self.mth1_occ, self.mth2_occ, self.mth3_occ];
        for (kind, values) in [(ThresholdKind::Movement, movement), (ThresholdKind::Occupancy, occupancy)] {
            for (segment, value) in Segment::ALL.into_iter().zip(values) {
                commands.push(encode_threshold(segment, kind, value)?);
            }
        }

        commands.extend(encode_timing(self.ts_on, self.ts_off)?);
        commands.push(encode_output_mode(self.output_mode)?);
        commands.push(encode_test_mode(self.test_mode)?);
        Ok(commands)
    }

    /// Full start-up sequence: tuning frames followed by the enabled log queries.
    pub fn startup_commands(&self) -> Result<ArrayVec<ConfigCommand, MAX_CONFIG_COMMANDS>, ConfigError> {
        let mut commands: ArrayVec<ConfigCommand, MAX_CONFIG_COMMANDS> =
            self.commands()?.into_iter().collect();
        if self.log_version {
            commands.push(ConfigCommand::QueryVersion);
        }
        if self.log_get_all {
            commands.push(ConfigCommand::QueryAll);
        }
        Ok(commands)
    }

    pub fn motion_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.motion_timeout))
    }

    pub fn test_mode_enabled(&self) -> bool {
        self.test_mode == 1
    }
}

/// Which optional outputs the host wants published.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct OutputConfig {
    pub distance: bool,
    pub movement: bool,
    pub occupancy: bool,
    pub motion: bool,
    /// Publish nothing until every start-up command was acknowledged or given up on,
    /// so readings taken under factory thresholds never reach the host.
    pub hold_until_configured: bool,
}

impl OutputConfig {
    /// Every output enabled, published from the first poll.
    pub const fn all() -> Self {
        Self { distance: true, movement: true, occupancy: true, motion: true, hold_until_configured: false }
    }
}
