// src/common/hal_traits.rs

use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// A monotonic point in time as understood by the driver.
///
/// Implemented automatically for any copyable, ordered type that supports adding
/// a `Duration` and subtracting two instants, such as [`Millis`].
pub trait Ld1125hInstant:
    Copy + Ord + Debug + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

impl<T> Ld1125hInstant for T where
    T: Copy + Ord + Debug + Add<Duration, Output = T> + Sub<T, Output = Duration>
{
}

/// Abstraction for the clock and delay operations the driver needs.
pub trait Ld1125hTimer {
    type Instant: Ld1125hInstant;

    /// Returns the current monotonic time.
    fn now(&self) -> Self::Instant;

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Abstraction for non-blocking access to the sensor's UART.
pub trait Ld1125hSerial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Attempts to read a single byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` when no byte is currently available.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Attempts to write a single byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if the transmit buffer is full.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush the transmit buffer.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// Milliseconds since an arbitrary epoch (usually boot).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Millis(pub u64);

impl Add<Duration> for Millis {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        let ms = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Millis(self.0.saturating_add(ms))
    }
}

impl Sub<Millis> for Millis {
    type Output = Duration;

    fn sub(self, rhs: Millis) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

/// Pairs an `embedded-hal` delay provider with a millisecond clock.
///
/// embedded-hal has no clock trait, so the caller supplies one as a closure
/// (typically reading a hardware timer or an RTOS tick counter).
#[cfg(feature = "impl-native")]
pub struct HalTimer<D, C> {
    delay: D,
    clock: C,
}

#[cfg(feature = "impl-native")]
impl<D, C> HalTimer<D, C>
where
    D: embedded_hal::delay::DelayNs,
    C: Fn() -> u64,
{
    pub fn new(delay: D, clock: C) -> Self {
        Self { delay, clock }
    }

    pub fn release(self) -> (D, C) {
        (self.delay, self.clock)
    }
}

#[cfg(feature = "impl-native")]
impl<D, C> Ld1125hTimer for HalTimer<D, C>
where
    D: embedded_hal::delay::DelayNs,
    C: Fn() -> u64,
{
    type Instant = Millis;

    fn now(&self) -> Millis {
        Millis((self.clock)())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
