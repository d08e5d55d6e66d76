// src/driver/sync_driver/log_capture.rs

//! Test-only `log` backend that records messages per test thread.

extern crate std;

use core::cell::RefCell;
use std::format;
use std::string::String;
use std::vec::Vec;

use log::{Level, LevelFilter, Log, Metadata, Record};

struct CaptureLogger;

static LOGGER: CaptureLogger = CaptureLogger;

std::thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        let message = format!("{}", record.args());
        RECORDS.with(|records| records.borrow_mut().push((record.level(), message)));
    }

    fn flush(&self) {}
}

/// Installs the logger (once per process) and clears this thread's records.
pub(super) fn start() {
    // Fails harmlessly when another test already installed it.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Returns and clears everything logged on this thread since [`start`].
pub(super) fn take() -> Vec<(Level, String)> {
    RECORDS.with(|records| core::mem::take(&mut *records.borrow_mut()))
}

/// True if any record at `level` contains `text`.
pub(super) fn logged(records: &[(Level, String)], level: Level, text: &str) -> bool {
    records.iter().any(|(l, message)| *l == level && message.contains(text))
}
