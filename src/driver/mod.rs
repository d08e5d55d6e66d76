// src/driver/mod.rs

pub mod sync_driver;

// Re-export the public driver and its configuration progress
pub use sync_driver::{ConfigStatus, Ld1125h};
