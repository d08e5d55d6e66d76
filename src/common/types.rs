// src/common/types.rs

use core::fmt;
use core::str::FromStr;

// --- Distance value (`dis=<float>`) ---

/// A distance reported by the sensor, quantised to hundredths of a meter.
///
/// The sensor prints distances as `d.dd` meters. Storing whole centimeters keeps
/// "rounded to two decimals" exact, so change detection never flaps on float noise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Distance(u32);

impl Distance {
    /// Largest integer part accepted when parsing (in meters).
    const MAX_WHOLE_DIGITS: usize = 6;

    pub const fn from_centimeters(cm: u32) -> Self {
        Self(cm)
    }

    #[inline]
    pub const fn centimeters(&self) -> u32 {
        self.0
    }

    /// Returns the distance in meters.
    pub fn as_meters(&self) -> f32 {
        self.0 as f32 / 100.0
    }

    /// Parses a non-negative decimal string such as `"3.62"`, `"4"` or `"0.987"`.
    ///
    /// Digits past the second decimal are rounded half-up, so `"3.625"` becomes 3.63.
    pub fn parse(s: &str) -> Result<Self, ParseFailure> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(ParseFailure::InvalidDistance);
        }
        if whole.len() > Self::MAX_WHOLE_DIGITS
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ParseFailure::InvalidDistance);
        }

        let mut cm: u32 = 0;
        for b in whole.bytes() {
            cm = cm * 10 + u32::from(b - b'0');
        }
        cm *= 100;

        let mut digits = frac.bytes().map(|b| u32::from(b - b'0'));
        cm += digits.next().unwrap_or(0) * 10;
        cm += digits.next().unwrap_or(0);
        if digits.next().unwrap_or(0) >= 5 {
            cm += 1;
        }

        Ok(Self(cm))
    }
}

impl FromStr for Distance {
    type Err = ParseFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Parses a signal strength value (`str=<float>`), only emitted in test mode.
pub fn parse_strength(s: &str) -> Result<f32, ParseFailure> {
    let value = f32::from_str(s.trim()).map_err(|_| ParseFailure::InvalidStrength)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseFailure::InvalidStrength)
    }
}

/// Reasons a received frame was dropped.
///
/// None of these are fatal: the serial line routinely carries boot banners and
/// other text the driver does not understand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ParseFailure {
    #[error("empty frame")]
    Empty,
    #[error("frame is not valid UTF-8")]
    NotUtf8,
    #[error("unrecognized frame")]
    Unrecognized,
    #[error("field is not a key=value pair")]
    MalformedField,
    #[error("invalid distance value")]
    InvalidDistance,
    #[error("invalid strength value")]
    InvalidStrength,
}
