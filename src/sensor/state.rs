// src/sensor/state.rs

use core::time::Duration;

use log::trace;

use crate::common::hal_traits::Ld1125hInstant;
use crate::common::types::Distance;

use super::event::{DistanceReading, OccupancyReport, SensorEvent};

/// Snapshot of everything the sensor has told us, as handed to the publisher.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct SensorState {
    /// Last reported distance, absent until reported or after "no target".
    pub distance: Option<Distance>,
    /// A moving target was seen within the motion timeout.
    pub motion: bool,
    /// A target (moving or stationary) is present.
    pub occupancy: bool,
    /// Mirrors `motion`; kept separate because hosts wire the two names to different outputs.
    pub movement: bool,
    /// Last signal strength, only tracked in test mode.
    pub strength: Option<f32>,
}

/// Coarse presence classification derived from the motion and occupancy bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PresenceState {
    Idle,
    MotionActive,
    OccupancyOnly,
    MotionAndOccupancy,
}

impl SensorState {
    pub fn presence(&self) -> PresenceState {
        match (self.motion, self.occupancy) {
            (false, false) => PresenceState::Idle,
            (true, false) => PresenceState::MotionActive,
            (false, true) => PresenceState::OccupancyOnly,
            (true, true) => PresenceState::MotionAndOccupancy,
        }
    }
}

/// Turns parsed events and the passage of time into [`SensorState`].
///
/// Motion is held for `motion_timeout` after the last `mov` frame and cleared by
/// [`check_timeout`](Self::check_timeout), even if the sensor goes quiet.
#[derive(Debug)]
pub struct StateDeriver<I> {
    state: SensorState,
    last_motion: Option<I>,
    motion_timeout: Duration,
    keep_strength: bool,
}

impl<I: Ld1125hInstant> StateDeriver<I> {
    /// `keep_strength` should follow the sensor's test mode; strength is ignored otherwise.
    pub fn new(motion_timeout: Duration, keep_strength: bool) -> Self {
        Self {
            state: SensorState::default(),
            last_motion: None,
            motion_timeout,
            keep_strength,
        }
    }

    pub fn state(&self) -> &SensorState {
        &self.state
    }

    pub fn last_motion(&self) -> Option<I> {
        self.last_motion
    }

    /// Applies one event received at `now`. Version and acknowledgement events
    /// carry no detection state and are ignored.
    pub fn apply(&mut self, event: &SensorEvent, now: I) {
        let before = self.state.presence();
        match event {
            SensorEvent::Motion(reading) => {
                self.state.motion = true;
                self.state.movement = true;
                self.last_motion = Some(now);
                self.update_reading(reading);
            }
            SensorEvent::Occupancy(OccupancyReport::Target(reading)) => {
                self.state.occupancy = true;
                self.update_reading(reading);
            }
            SensorEvent::Occupancy(OccupancyReport::NoTarget) => {
                self.state.occupancy = false;
                self.state.motion = false;
                self.state.movement = false;
                self.state.distance = None;
                self.state.strength = None;
                self.last_motion = None;
            }
            SensorEvent::Version(_) | SensorEvent::Acknowledge => {}
        }
        let after = self.state.presence();
        if before != after {
            trace!("presence {:?} -> {:?}", before, after);
        }
    }

    /// Clears motion once more than `motion_timeout` has passed since the last `mov`.
    ///
    /// Returns `true` only on the poll where motion actually transitions to false.
    pub fn check_timeout(&mut self, now: I) -> bool {
        let Some(last) = self.last_motion else {
            return false;
        };
        if !self.state.motion || now - last <= self.motion_timeout {
            return false;
        }
        self.state.motion = false;
        self.state.movement = false;
        self.last_motion = None;
        trace!("motion timed out after {:?}", self.motion_timeout);
        true
    }

    fn update_reading(&mut self, reading: &DistanceReading) {
        if let Some(distance) = reading.distance {
            self.state.distance = Some(distance);
        }
        if self.keep_strength {
            if let Some(strength) = reading.strength {
                self.state.strength = Some(strength);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::hal_traits::Millis;

    fn motion() -> SensorEvent {
        SensorEvent::Motion(DistanceReading::default())
    }

    fn occupied(cm: Option<u32>, strength: Option<f32>) -> SensorEvent {
        SensorEvent::Occupancy(OccupancyReport::Target(DistanceReading {
            distance: cm.map(Distance::from_centimeters),
            strength,
        }))
    }

    fn deriver() -> StateDeriver<Millis> {
        StateDeriver::new(Duration::from_millis(1000), false)
    }

    #[test]
    fn test_motion_sets_motion_and_movement() {
        let mut d = deriver();
        d.apply(&motion(), Millis(0));
        assert!(d.state().motion);
        assert!(d.state().movement);
        assert!(!d.state().occupancy);
        assert_eq!(d.state().presence(), PresenceState::MotionActive);
        assert_eq!(d.last_motion(), Some(Millis(0)));
    }

    #[test]
    fn test_motion_clears_exactly_once_after_timeout() {
        let mut d = deriver();
        d.apply(&motion(), Millis(0));

        assert!(!d.check_timeout(Millis(999)));
        assert!(!d.check_timeout(Millis(1000)));
        assert!(d.state().motion);

        assert!(d.check_timeout(Millis(1001)));
        assert!(!d.state().motion);
        assert!(!d.state().movement);

        assert!(!d.check_timeout(Millis(1002)));
        assert!(!d.check_timeout(Millis(5000)));
    }

    #[test]
    fn test_repeated_motion_refreshes_timestamp_only() {
        let mut d = deriver();
        d.apply(&motion(), Millis(0));
        let first = *d.state();
        d.apply(&motion(), Millis(800));
        assert_eq!(*d.state(), first);
        assert_eq!(d.last_motion(), Some(Millis(800)));

        // Held relative to the refreshed timestamp.
        assert!(!d.check_timeout(Millis(1500)));
        assert!(d.check_timeout(Millis(1801)));
    }

    #[test]
    fn test_occupancy_updates_distance_when_present() {
        let mut d = deriver();
        d.apply(&occupied(Some(362), None), Millis(0));
        assert!(d.state().occupancy);
        assert_eq!(d.state().distance, Some(Distance::from_centimeters(362)));

        // A frame without dis= leaves the last distance alone.
        d.apply(&occupied(None, None), Millis(10));
        assert_eq!(d.state().distance, Some(Distance::from_centimeters(362)));
        assert_eq!(d.state().presence(), PresenceState::OccupancyOnly);
    }

    #[test]
    fn test_motion_frame_distance_is_recorded() {
        let mut d = deriver();
        d.apply(
            &SensorEvent::Motion(DistanceReading { distance: Some(Distance::from_centimeters(98)), strength: None }),
            Millis(0),
        );
        assert_eq!(d.state().distance, Some(Distance::from_centimeters(98)));
    }

    #[test]
    fn test_no_target_clears_everything() {
        let mut d = deriver();
        d.apply(&motion(), Millis(0));
        d.apply(&occupied(Some(120), None), Millis(5));
        assert_eq!(d.state().presence(), PresenceState::MotionAndOccupancy);

        d.apply(&SensorEvent::Occupancy(OccupancyReport::NoTarget), Millis(10));
        assert_eq!(*d.state(), SensorState::default());
        assert_eq!(d.state().presence(), PresenceState::Idle);
        assert!(!d.check_timeout(Millis(5000)));
    }

    #[test]
    fn test_occupancy_is_not_affected_by_motion_timeout() {
        let mut d = deriver();
        d.apply(&motion(), Millis(0));
        d.apply(&occupied(Some(200), None), Millis(0));
        assert!(d.check_timeout(Millis(2000)));
        assert!(d.state().occupancy);
        assert_eq!(d.state().presence(), PresenceState::OccupancyOnly);
    }

    #[test]
    fn test_strength_only_kept_in_test_mode() {
        let mut plain = deriver();
        plain.apply(&occupied(Some(362), Some(61.93)), Millis(0));
        assert_eq!(plain.state().strength, None);

        let mut test_mode: StateDeriver<Millis> = StateDeriver::new(Duration::from_millis(1000), true);
        test_mode.apply(&occupied(Some(362), Some(61.93)), Millis(0));
        assert_eq!(test_mode.state().strength, Some(61.93));
        assert_eq!(test_mode.state().distance.map(|d| d.as_meters()), Some(3.62));
    }

    #[test]
    fn test_acknowledge_and_version_do_not_change_state() {
        let mut d = deriver();
        d.apply(&SensorEvent::Acknowledge, Millis(0));
        d.apply(&SensorEvent::Version(Default::default()), Millis(0));
        assert_eq!(*d.state(), SensorState::default());
    }
}
