// src/sensor/event.rs

use heapless::String;

use crate::common::frame::MAX_FRAME_LEN;
use crate::common::types::Distance;

/// Version text reported by the sensor in answer to `VER`.
pub type VersionInfo = String<MAX_FRAME_LEN>;

/// Distance and (test mode only) signal strength carried by a detection frame.
///
/// A frame without a `dis=` field yields `distance: None`, never zero.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct DistanceReading {
    pub distance: Option<Distance>,
    pub strength: Option<f32>,
}

/// Payload of an `occ` frame or a no-target line.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum OccupancyReport {
    /// A target is present (`occ[, dis=..][, str=..]`).
    Target(DistanceReading),
    /// The sensor reports nothing in range.
    NoTarget,
}

/// One parsed frame from the sensor.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    /// A moving target was detected (`mov[, dis=..]`).
    Motion(DistanceReading),
    /// Occupancy update, either a present target or "no target".
    Occupancy(OccupancyReport),
    /// Firmware version banner.
    Version(VersionInfo),
    /// `received message...` echo acknowledging the last command.
    Acknowledge,
}
