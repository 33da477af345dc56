// SPDX-License-Identifier: MIT
//
// Frame output buffering.
//
// A refresh produces dozens of small pieces: cursor hide, home, one text
// slice plus an erase-line per screen row, the final cursor position. If
// each piece went straight to the terminal, the user would see rows being
// painted one by one. Instead everything accumulates in `OutputBuffer`
// and reaches the terminal in exactly one write() call.
//
// The write is deliberately a single `write`, not `write_all`: a second
// write for the remainder would be a second, visibly separate update. A
// short count is reported back to the caller, which logs and moves on.

use std::io::{self, Write};

/// A byte buffer that accumulates ANSI output for a single `write()` call.
///
/// Default capacity: 16 KB — enough for a full 80×24 frame with room to
/// spare, so typical refreshes never reallocate.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append `n` copies of `byte`.
    pub fn push_repeated(&mut self, byte: u8, n: usize) {
        self.buf.resize(self.buf.len() + n, byte);
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Hand the accumulated frame to `w` in one `write` call, then clear.
    ///
    /// Returns the byte count `w` accepted, which may be less than
    /// [`len`](Self::len). The buffer is cleared whether or not the write
    /// succeeded, so a failed frame never leaks into the next one.
    ///
    /// # Errors
    ///
    /// Returns the error from `w.write` or `w.flush`.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<usize> {
        if self.buf.is_empty() {
            return Ok(0);
        }
        let result = w.write(&self.buf).and_then(|n| w.flush().map(|()| n));
        self.buf.clear();
        result
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real output goes through flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
