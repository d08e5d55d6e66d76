// src/sensor/publisher.rs

use crate::common::config::OutputConfig;
use crate::common::types::Distance;

use super::state::SensorState;

/// The optional outputs a host can wire up.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Output {
    Distance,
    Movement,
    Occupancy,
    Motion,
}

/// A published value. Distances are already rounded to hundredths.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Value {
    Distance(Option<Distance>),
    Binary(bool),
}

/// One change pushed to a [`ReadingSink`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Update {
    pub output: Output,
    pub value: Value,
}

/// Receives changed readings. Implemented for any `FnMut(Update)`.
pub trait ReadingSink {
    fn publish(&mut self, update: Update);
}

impl<F: FnMut(Update)> ReadingSink for F {
    fn publish(&mut self, update: Update) {
        self(update)
    }
}

type Extractor = fn(&SensorState) -> Value;

const SLOT_COUNT: usize = 4;

const SLOTS: [(Output, Extractor); SLOT_COUNT] = [
    (Output::Distance, |s: &SensorState| Value::Distance(s.distance)),
    (Output::Movement, |s: &SensorState| Value::Binary(s.movement)),
    (Output::Occupancy, |s: &SensorState| Value::Binary(s.occupancy)),
    (Output::Motion, |s: &SensorState| Value::Binary(s.motion)),
];

/// Pushes readings to the enabled outputs, only when they change.
#[derive(Debug)]
pub struct Publisher {
    enabled: [bool; SLOT_COUNT],
    last: [Option<Value>; SLOT_COUNT],
}

impl Publisher {
    pub fn new(outputs: OutputConfig) -> Self {
        Self {
            enabled: [outputs.distance, outputs.movement, outputs.occupancy, outputs.motion],
            last: [None; SLOT_COUNT],
        }
    }

    pub fn is_enabled(&self, output: Output) -> bool {
        SLOTS
            .iter()
            .zip(self.enabled)
            .any(|((o, _), enabled)| *o == output && enabled)
    }

    /// Compares `state` against what was last published and emits the differences.
    /// The first call publishes every enabled output. Returns the number of updates.
    pub fn publish<S: ReadingSink + ?Sized>(&mut self, state: &SensorState, sink: &mut S) -> usize {
        let mut published = 0;
        for (i, (output, extract)) in SLOTS.iter().enumerate() {
            if !self.enabled[i] {
                continue;
            }
            let value = extract(state);
            if self.last[i] != Some(value) {
                self.last[i] = Some(value);
                sink.publish(Update { output: *output, value });
                published += 1;
            }
        }
        published
    }

    /// Forgets what was published so the next pass republishes everything.
    pub fn invalidate(&mut self) {
        self.last = [None; SLOT_COUNT];
    }
}
