// src/common/timing.rs

use core::time::Duration;

// === UART ===

/// Default baud rate of the LD1125H (8N1).
pub const BAUD_RATE: u32 = 115_200;

// === Configuration ===

/// How long to wait for the `received message` echo after a command before
/// giving up on it and leaving the parameter at its factory default.
pub const ACK_TIMEOUT: Duration = Duration::from_millis(1000);

/// Upper bound on writing one command byte before reporting a timeout.
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(20);

/// Upper bound on flushing a whole command.
pub const FLUSH_TIMEOUT: Duration = Duration::from_millis(10);

/// Delay between polls while running the blocking configuration helper.
pub const CONFIG_POLL_INTERVAL_MS: u32 = 10;

/// Back-off between retries of a non-blocking write.
pub const WRITE_RETRY_DELAY_MS: u32 = 1;

// === Receive loop ===

/// Maximum bytes consumed in one poll, so a chattering line cannot starve the host loop.
/// Roughly 20 ms of traffic at 115200 baud.
pub const MAX_BYTES_PER_POLL: usize = 256;

/// Default hold time for motion after the last `mov` frame.
pub const DEFAULT_MOTION_TIMEOUT: Duration = Duration::from_millis(1000);
