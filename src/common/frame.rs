// src/common/frame.rs

use arrayvec::ArrayVec;

/// Longest line the reader buffers. Real frames are under 32 bytes
/// (`occ, dis=3.62, str=61.93`); anything longer is line noise or a banner.
pub const MAX_FRAME_LEN: usize = 64;

/// One line received from the sensor, without its terminator or any `<CR>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame(ArrayVec<u8, MAX_FRAME_LEN>);

impl RawFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Attempts to interpret the frame as a UTF-8 string slice.
    pub fn as_str(&self) -> Result<&str, core::str::Utf8Error> {
        core::str::from_utf8(&self.0)
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Reported when a line overflows the reader's buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameTooLong;

/// Assembles `\n`-terminated frames from a byte stream.
///
/// Partial lines are kept across calls. On overflow the partial line is dropped,
/// [`FrameTooLong`] is reported once, and input is skipped until the next `\n`.
#[derive(Debug, Default)]
pub struct FrameReader {
    buffer: ArrayVec<u8, MAX_FRAME_LEN>,
    discarding: bool,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte. Returns a frame when `byte` completes one.
    pub fn push_byte(&mut self, byte: u8) -> Option<Result<RawFrame, FrameTooLong>> {
        match byte {
            b'\n' => {
                if self.discarding {
                    self.discarding = false;
                    return None;
                }
                if self.buffer.is_empty() {
                    return None;
                }
                let frame = RawFrame(core::mem::take(&mut self.buffer));
                Some(Ok(frame))
            }
            b'\r' => None,
            _ if self.discarding => None,
            _ => {
                if self.buffer.try_push(byte).is_err() {
                    self.buffer.clear();
                    self.discarding = true;
                    return Some(Err(FrameTooLong));
                }
                None
            }
        }
    }

    /// Lazily yields every frame completed by `bytes`.
    pub fn frames<'r, 'b>(&'r mut self, bytes: &'b [u8]) -> Frames<'r, 'b> {
        Frames { reader: self, bytes: bytes.iter() }
    }

    /// Number of bytes of the current partial line.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drops any partial line.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}

/// Iterator returned by [`FrameReader::frames`].
pub struct Frames<'r, 'b> {
    reader: &'r mut FrameReader,
    bytes: core::slice::Iter<'b, u8>,
}

impl Iterator for Frames<'_, '_> {
    type Item = Result<RawFrame, FrameTooLong>;

    fn next(&mut self) -> Option<Self::Item> {
        for &byte in self.bytes.by_ref() {
            if let Some(result) = self.reader.push_byte(byte) {
                return Some(result);
            }
        }
        None
    }
}
