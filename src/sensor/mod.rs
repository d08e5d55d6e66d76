// src/sensor/mod.rs

// --- Frame interpretation and derived detection state ---
pub mod event;
pub mod parser;
pub mod publisher;
pub mod state;

// --- Re-exports ---
pub use event::{DistanceReading, OccupancyReport, SensorEvent, VersionInfo};
pub use parser::{parse_frame, parse_line};
pub use publisher::{Output, Publisher, ReadingSink, Update, Value};
pub use state::{PresenceState, SensorState, StateDeriver};
