// src/driver/sync_driver/mod.rs

mod config_tx;
mod io_helpers;
#[cfg(test)]
mod log_capture;

pub use config_tx::ConfigStatus;

use config_tx::{ConfigSequencer, ConfigStep};
use log::{debug, info, warn};

use crate::common::{
    config::{OutputConfig, TuningConfig},
    error::Ld1125hError,
    frame::{FrameReader, FrameTooLong, RawFrame, MAX_FRAME_LEN},
    hal_traits::{Ld1125hSerial, Ld1125hTimer},
    timing,
};
use crate::sensor::{
    parser::parse_frame,
    publisher::{Output, Publisher, ReadingSink},
    state::{PresenceState, SensorState, StateDeriver},
    SensorEvent,
};

/// Driver for an LD1125H radar attached to a UART, for SYNCHRONOUS, polled use.
///
/// Construct it once, then call [`poll`](Self::poll) from the host loop. Each poll
/// reads whatever bytes are waiting, advances the start-up configuration by at most
/// one command, expires stale motion and pushes changed readings to the sink.
#[derive(Debug)]
pub struct Ld1125h<IF>
where
    IF: Ld1125hSerial + Ld1125hTimer,
{
    interface: IF,
    config: TuningConfig,
    reader: FrameReader,
    deriver: StateDeriver<IF::Instant>,
    publisher: Publisher,
    hold_until_configured: bool,
    sequencer: ConfigSequencer<IF::Instant>,
}

impl<IF> Ld1125h<IF>
where
    IF: Ld1125hSerial + Ld1125hTimer,
{
    /// Validates `config` and queues its command frames. Nothing is written
    /// until the first [`poll`](Self::poll).
    ///
    /// # Errors
    ///
    /// * `Ld1125hError::InvalidConfig`: a tuning value is out of range.
    pub fn new(interface: IF, config: &TuningConfig, outputs: OutputConfig) -> Result<Self, Ld1125hError<IF::Error>> {
        let commands = config.startup_commands()?;

        Ok(Ld1125h {
            interface,
            config: *config,
            reader: FrameReader::new(),
            deriver: StateDeriver::new(config.motion_timeout(), config.test_mode_enabled()),
            publisher: Publisher::new(outputs),
            hold_until_configured: outputs.hold_until_configured,
            sequencer: ConfigSequencer::new(commands),
        })
    }

    // --- Public Methods ---

    /// Runs one iteration of the driver and returns how many updates reached `sink`.
    ///
    /// Frame-level problems (overlong or unrecognized lines, missing
    /// acknowledgements) are logged and never returned.
    ///
    /// # Errors
    ///
    /// * `Ld1125hError::Io`: the UART reported an error while reading or writing.
    /// * `Ld1125hError::Timeout`: a command byte could not be written in time.
    ///
    /// State is still updated and published when an error is returned; a failed
    /// command is recorded and the next poll moves on to the following one.
    ///
    /// With `OutputConfig::hold_until_configured`, nothing is published until the
    /// start-up commands are done; the first poll after that publishes everything.
    pub fn poll<S: ReadingSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize, Ld1125hError<IF::Error>> {
        let received = self.receive_pending(Self::handle_frame);
        let sent = self.manage_config_tx();

        let now = self.interface.now();
        self.deriver.check_timeout(now);
        let published = if self.hold_until_configured && !self.sequencer.is_done() {
            0
        } else {
            self.publisher.publish(self.deriver.state(), sink)
        };

        received?;
        sent?;
        Ok(published)
    }

    /// Polls until every start-up command was acknowledged or given up on.
    ///
    /// Bounded: each command waits at most `ACK_TIMEOUT` for its acknowledgement.
    pub fn configure<S: ReadingSink + ?Sized>(&mut self, sink: &mut S) -> Result<ConfigStatus, Ld1125hError<IF::Error>> {
        loop {
            self.poll(sink)?;
            if self.sequencer.is_done() {
                return Ok(self.sequencer.status());
            }
            self.interface.delay_ms(timing::CONFIG_POLL_INTERVAL_MS);
        }
    }

    pub fn config_status(&self) -> ConfigStatus {
        self.sequencer.status()
    }

    /// Parameters that were never acknowledged and so remain at factory defaults.
    pub fn failed_commands(&self) -> &[&'static str] {
        self.sequencer.failed()
    }

    /// Makes the next poll push every enabled output again, changed or not.
    /// Useful after the host's sink reconnects.
    pub fn republish(&mut self) {
        self.publisher.invalidate();
    }

    pub fn state(&self) -> &SensorState {
        self.deriver.state()
    }

    pub fn presence(&self) -> PresenceState {
        self.deriver.state().presence()
    }

    /// Logs the tuning values and the enabled outputs at `info`.
    pub fn log_config(&self) {
        let c = &self.config;
        info!("LD1125H:");
        info!("  UART: {} baud 8N1", timing::BAUD_RATE);
        info!("  rmax: {:.2} m", c.rmax);
        info!("  mth_mov: {}/{}/{}", c.mth1_mov, c.mth2_mov, c.mth3_mov);
        info!("  mth_occ: {}/{}/{}", c.mth1_occ, c.mth2_occ, c.mth3_occ);
        info!("  ts_on: {}, ts_off: {}", c.ts_on, c.ts_off);
        info!("  output_mode: {}, test_mode: {}", c.output_mode, c.test_mode);
        info!("  motion_timeout: {} ms", c.motion_timeout);
        for output in [Output::Distance, Output::Movement, Output::Occupancy, Output::Motion] {
            if self.publisher.is_enabled(output) {
                info!("  output: {:?}", output);
            }
        }
        if !self.failed_commands().is_empty() {
            info!("  left at factory default: {:?}", self.failed_commands());
        }
    }

    /// Direct access to the interface, e.g. to change baud rate on the host side.
    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    /// Consumes the driver and returns the interface.
    pub fn release(self) -> IF {
        self.interface
    }

    // --- Frame handling ---

    fn handle_frame(&mut self, frame: Result<RawFrame, FrameTooLong>) {
        let frame = match frame {
            Ok(frame) => frame,
            Err(FrameTooLong) => {
                warn!("{}", Ld1125hError::<()>::FrameTooLong { limit: MAX_FRAME_LEN });
                return;
            }
        };

        if self.config.log_sensor_output {
            debug!("rx: {}", frame.as_str().unwrap_or("<non-utf8>"));
        }

        match parse_frame(frame.as_bytes()) {
            Ok(SensorEvent::Acknowledge) => {
                self.sequencer.on_ack();
            }
            Ok(SensorEvent::Version(version)) => {
                if self.config.log_version {
                    info!("LD1125H firmware: {}", version);
                }
            }
            Ok(event) => {
                let now = self.interface.now();
                self.deriver.apply(&event, now);
            }
            Err(e) => {
                // Replies to `get_all` are free text.
                if self.config.log_get_all {
                    info!("LD1125H: {}", frame.as_str().unwrap_or("<non-utf8>"));
                }
                if self.config.log_sensor_output {
                    debug!("dropped frame: {}", Ld1125hError::<()>::Parse(e));
                }
            }
        }
    }

    // --- Configuration ---

    fn manage_config_tx(&mut self) -> Result<(), Ld1125hError<IF::Error>> {
        let now = self.interface.now();
        let ConfigStep::Send(command) = self.sequencer.next_step(now) else {
            return Ok(());
        };

        let result = command
            .format_into()
            .map_err(Ld1125hError::from)
            .and_then(|buffer| self.send_command_bytes(buffer.as_bytes()));

        match result {
            Ok(()) => {
                debug!("sent `{}`", command);
                let sent_at = self.interface.now();
                self.sequencer.mark_sent(sent_at);
                Ok(())
            }
            Err(e) => {
                warn!("`{}` could not be written: {}", command.name(), e);
                self.sequencer.mark_failed();
                Err(e)
            }
        }
    }
}
