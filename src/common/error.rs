// src/common/error.rs

use super::command::CommandFormatError;
use super::config::ConfigError;
use super::types::ParseFailure;

/// Errors surfaced by the LD1125H driver.
///
/// Only `Io`, `Timeout`, `CommandFormat` and `InvalidConfig` are ever returned
/// to the caller. `AckTimeout`, `FrameTooLong` and `Parse` describe conditions
/// the driver tolerates: they are logged and processing continues.
#[derive(Debug, thiserror::Error)]
pub enum Ld1125hError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// A byte could not be written within the write timeout.
    #[error("Operation timed out")]
    Timeout,

    /// The sensor did not acknowledge a configuration command in time.
    #[error("Configuration command `{command}` was not acknowledged")]
    AckTimeout { command: &'static str },

    /// A line exceeded the frame buffer before its terminator arrived.
    #[error("Frame exceeded {limit} bytes without a line terminator")]
    FrameTooLong { limit: usize },

    /// A frame could not be classified or its fields were malformed.
    #[error("Unparseable frame: {0}")]
    Parse(ParseFailure),

    /// A tuning value was outside its documented range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(ConfigError),

    /// A command did not fit its output buffer.
    #[error("Command formatting failed: {0}")]
    CommandFormat(CommandFormatError),
}

impl<E: core::fmt::Debug> From<ConfigError> for Ld1125hError<E> {
    fn from(e: ConfigError) -> Self {
        Ld1125hError::InvalidConfig(e)
    }
}

impl<E: core::fmt::Debug> From<ParseFailure> for Ld1125hError<E> {
    fn from(e: ParseFailure) -> Self {
        Ld1125hError::Parse(e)
    }
}

impl<E: core::fmt::Debug> From<CommandFormatError> for Ld1125hError<E> {
    fn from(e: CommandFormatError) -> Self {
        Ld1125hError::CommandFormat(e)
    }
}

impl<E: core::fmt::Debug + PartialEq> PartialEq for Ld1125hError<E> {
    fn eq(&self, other: &Self) -> bool {
        use Ld1125hError::*;
        match (self, other) {
            (Io(a), Io(b)) => a == b,
            (Timeout, Timeout) => true,
            (AckTimeout { command: a }, AckTimeout { command: b }) => a == b,
            (FrameTooLong { limit: a }, FrameTooLong { limit: b }) => a == b,
            (Parse(a), Parse(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (CommandFormat(a), CommandFormat(b)) => a == b,
            _ => false,
        }
    }
}
