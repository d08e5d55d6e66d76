// src/driver/sync_driver/io_helpers.rs

use super::Ld1125h;
use crate::common::{
    error::Ld1125hError,
    frame::{FrameTooLong, RawFrame},
    hal_traits::{Ld1125hSerial, Ld1125hTimer},
    timing,
};
use core::time::Duration;
use nb::Result as NbResult;

impl<IF> Ld1125h<IF>
where
    IF: Ld1125hSerial + Ld1125hTimer,
{
    /// Executes a non-blocking I/O operation (`f`) repeatedly until it
    /// stops returning `WouldBlock`, returning the final result or a timeout error.
    pub(super) fn execute_blocking_io_with_timeout<FN, T>(
        &mut self,
        timeout: Duration,
        mut f: FN,
    ) -> Result<T, Ld1125hError<IF::Error>>
    where
        FN: FnMut(&mut IF) -> NbResult<T, IF::Error>,
    {
        let deadline = self.interface.now() + timeout;

        loop {
            match f(&mut self.interface) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if self.interface.now() >= deadline {
                        return Err(Ld1125hError::Timeout);
                    }
                    self.interface.delay_ms(timing::WRITE_RETRY_DELAY_MS);
                }
                Err(nb::Error::Other(e)) => return Err(Ld1125hError::Io(e)),
            }
        }
    }

    /// Writes an already formatted command, byte by byte, then flushes.
    pub(super) fn send_command_bytes(&mut self, cmd_bytes: &[u8]) -> Result<(), Ld1125hError<IF::Error>> {
        for byte in cmd_bytes {
            self.execute_blocking_io_with_timeout(timing::WRITE_TIMEOUT, |iface| iface.write_byte(*byte))?;
        }
        self.execute_blocking_io_with_timeout(timing::FLUSH_TIMEOUT, |iface| iface.flush())
    }

    /// Drains the bytes that are available right now, up to `MAX_BYTES_PER_POLL`,
    /// handing every completed line to `on_frame`. Never waits for more input.
    pub(super) fn receive_pending<FN>(&mut self, mut on_frame: FN) -> Result<usize, Ld1125hError<IF::Error>>
    where
        FN: FnMut(&mut Self, Result<RawFrame, FrameTooLong>),
    {
        let mut received = 0;
        while received < timing::MAX_BYTES_PER_POLL {
            let byte = match self.interface.read_byte() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(Ld1125hError::Io(e)),
            };
            received += 1;
            if let Some(frame) = self.reader.push_byte(byte) {
                on_frame(self, frame);
            }
        }
        Ok(received)
    }
}
