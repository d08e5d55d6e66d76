// src/driver/sync_driver/config_tx.rs

use arrayvec::ArrayVec;
use log::{debug, warn};

use crate::common::{
    command::ConfigCommand,
    config::MAX_CONFIG_COMMANDS,
    error::Ld1125hError,
    hal_traits::Ld1125hInstant,
    timing,
};

/// Progress of the start-up configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigStatus {
    /// `sent` of `total` commands have been written (or given up on).
    InProgress { sent: usize, total: usize },
    /// Every command was handled; `failed` were left at factory defaults.
    Complete { failed: usize },
}

/// What the driver should do next with the configuration queue.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum ConfigStep {
    /// Write this command now.
    Send(ConfigCommand),
    /// A command is awaiting its acknowledgement.
    Wait,
    /// Nothing left to send.
    Done,
}

#[derive(Debug, Copy, Clone)]
struct Pending<I> {
    command: ConfigCommand,
    sent_at: I,
}

/// Sends the configuration one command at a time, gating each on the sensor's
/// `received message` echo.
///
/// The sensor silently drops commands that arrive too quickly, so the next command
/// is only released once the previous one is acknowledged or `ACK_TIMEOUT` has
/// passed. Commands are never resent; unacknowledged ones are recorded as failed.
#[derive(Debug)]
pub(crate) struct ConfigSequencer<I> {
    queue: ArrayVec<ConfigCommand, MAX_CONFIG_COMMANDS>,
    next: usize,
    pending: Option<Pending<I>>,
    failed: ArrayVec<&'static str, MAX_CONFIG_COMMANDS>,
}

impl<I: Ld1125hInstant> ConfigSequencer<I> {
    pub(crate) fn new(queue: ArrayVec<ConfigCommand, MAX_CONFIG_COMMANDS>) -> Self {
        Self {
            queue,
            next: 0,
            pending: None,
            failed: ArrayVec::new(),
        }
    }

    /// Handles an acknowledgement line. Returns the command it released, if any.
    pub(crate) fn on_ack(&mut self) -> Option<&'static str> {
        match self.pending.take() {
            Some(pending) => {
                debug!("`{}` acknowledged", pending.command.name());
                Some(pending.command.name())
            }
            None => {
                debug!("acknowledgement with no command in flight");
                None
            }
        }
    }

    /// Decides the next step at `now`, expiring the in-flight command if its
    /// acknowledgement is overdue.
    pub(crate) fn next_step(&mut self, now: I) -> ConfigStep {
        if let Some(pending) = self.pending {
            if now - pending.sent_at <= timing::ACK_TIMEOUT {
                return ConfigStep::Wait;
            }
            let name = pending.command.name();
            warn!("{}; left at factory default", Ld1125hError::<()>::AckTimeout { command: name });
            self.record_failure(name);
            self.pending = None;
        }

        match self.queue.get(self.next) {
            Some(command) => ConfigStep::Send(*command),
            None => ConfigStep::Done,
        }
    }

    /// Records that the command returned by [`next_step`](Self::next_step) was written at `now`.
    pub(crate) fn mark_sent(&mut self, now: I) {
        let Some(command) = self.queue.get(self.next).copied() else {
            return;
        };
        self.next += 1;
        // Queries answer with their own output instead of an acknowledgement.
        if expects_ack(&command) {
            self.pending = Some(Pending { command, sent_at: now });
        }
    }

    /// Records that the current command could not be written. The queue moves on.
    pub(crate) fn mark_failed(&mut self) {
        if let Some(command) = self.queue.get(self.next).copied() {
            self.next += 1;
            self.record_failure(command.name());
        }
    }

    pub(crate) fn status(&self) -> ConfigStatus {
        if self.is_done() {
            ConfigStatus::Complete { failed: self.failed.len() }
        } else {
            ConfigStatus::InProgress { sent: self.next, total: self.queue.len() }
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.pending.is_none() && self.next >= self.queue.len()
    }

    pub(crate) fn failed(&self) -> &[&'static str] {
        &self.failed
    }

    fn record_failure(&mut self, name: &'static str) {
        // Capacity equals the queue length, so this cannot overflow.
        let _ = self.failed.try_push(name);
    }
}

fn expects_ack(command: &ConfigCommand) -> bool {
    !matches!(command, ConfigCommand::QueryVersion | ConfigCommand::QueryAll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::TuningConfig;
    use crate::common::hal_traits::Millis;

    fn sequencer(config: &TuningConfig) -> ConfigSequencer<Millis> {
        ConfigSequencer::new(config.startup_commands().unwrap())
    }

    fn expect_send(seq: &mut ConfigSequencer<Millis>, now: u64) -> ConfigCommand {
        match seq.next_step(Millis(now)) {
            ConfigStep::Send(cmd) => {
                seq.mark_sent(Millis(now));
                cmd
            }
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[test]
    fn test_acknowledged_sequence_completes() {
        let mut seq = sequencer(&TuningConfig::default());
        assert_eq!(seq.status(), ConfigStatus::InProgress { sent: 0, total: 11 });

        for i in 0..11 {
            expect_send(&mut seq, i * 10);
            assert_eq!(seq.next_step(Millis(i * 10 + 5)), ConfigStep::Wait);
            assert!(seq.on_ack().is_some());
        }
        assert_eq!(seq.next_step(Millis(200)), ConfigStep::Done);
        assert_eq!(seq.status(), ConfigStatus::Complete { failed: 0 });
        assert!(seq.failed().is_empty());
    }

    #[test]
    fn test_one_command_in_flight() {
        let mut seq = sequencer(&TuningConfig::default());
        assert!(matches!(expect_send(&mut seq, 0), ConfigCommand::RangeMax { .. }));
        assert_eq!(seq.next_step(Millis(500)), ConfigStep::Wait);
        assert_eq!(seq.next_step(Millis(1000)), ConfigStep::Wait);
        assert_eq!(seq.status(), ConfigStatus::InProgress { sent: 1, total: 11 });
    }

    #[test]
    fn test_ack_timeout_records_failure_and_moves_on() {
        let mut seq = sequencer(&TuningConfig::default());
        expect_send(&mut seq, 0);

        // Strictly greater than ACK_TIMEOUT.
        assert_eq!(seq.next_step(Millis(1000)), ConfigStep::Wait);
        let next = expect_send(&mut seq, 1001);
        assert_eq!(next.name(), "mth1_mov");
        assert_eq!(seq.failed(), ["rmax"]);
    }

    #[test]
    fn test_stray_ack_is_ignored() {
        let mut seq = sequencer(&TuningConfig::default());
        assert_eq!(seq.on_ack(), None);
        assert!(matches!(seq.next_step(Millis(0)), ConfigStep::Send(ConfigCommand::RangeMax { .. })));
    }

    #[test]
    fn test_write_failure_advances() {
        let mut seq = sequencer(&TuningConfig::default());
        assert!(matches!(seq.next_step(Millis(0)), ConfigStep::Send(_)));
        seq.mark_failed();
        assert_eq!(seq.failed(), ["rmax"]);
        assert_eq!(expect_send(&mut seq, 1).name(), "mth1_mov");
    }

    #[test]
    fn test_queries_do_not_wait_for_ack() {
        let config = TuningConfig { log_version: true, log_get_all: true, ..Default::default() };
        let mut seq = sequencer(&config);
        for i in 0..11 {
            expect_send(&mut seq, i);
            seq.on_ack();
        }
        assert_eq!(expect_send(&mut seq, 20), ConfigCommand::QueryVersion);
        assert_eq!(expect_send(&mut seq, 21), ConfigCommand::QueryAll);
        assert_eq!(seq.next_step(Millis(22)), ConfigStep::Done);
        assert_eq!(seq.status(), ConfigStatus::Complete { failed: 0 });
    }
}
