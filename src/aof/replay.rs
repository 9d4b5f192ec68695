//! Replay support
//!
//! Offset tracking for the decode loop, and the summary it produces.

use std::io::{self, BufRead, Read};

/// Result of a replay pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayStats {
    /// Number of commands decoded and handed to the callback
    pub commands_replayed: u64,

    /// Byte length of the complete frames that were replayed
    pub bytes_replayed: u64,

    /// Bytes of an incomplete trailing frame that were cut off (0 if none)
    pub truncated_bytes: u64,
}

impl ReplayStats {
    /// Whether replay had to drop a torn tail
    pub fn was_truncated(&self) -> bool {
        self.truncated_bytes > 0
    }
}

/// `BufRead` adaptor that counts how many bytes have been consumed
///
/// The codec only advances through `consume` and `read`, so `position`
/// is always the offset of the next undecoded byte.
pub(crate) struct PositionReader<R> {
    inner: R,
    position: u64,
}

impl<R> PositionReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }
}

impl<R: Read> Read for PositionReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<R: BufRead> BufRead for PositionReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
        self.position += amt as u64;
    }
}
