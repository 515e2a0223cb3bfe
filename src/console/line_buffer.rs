//! Line buffer for console input

use crate::config::LINE_SIZE;

/// Fixed-size, NUL-terminated line of printable ASCII.
///
/// Holds at most `L - 1` characters; `buf[len]` is always NUL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineBuffer<const L: usize = LINE_SIZE> {
    buf: [u8; L],
    len: usize,
}

impl<const L: usize> LineBuffer<L> {
    /// Create empty buffer
    pub const fn new() -> Self {
        const { assert!(L >= 2, "Line buffer needs room for one char and NUL") };

        Self {
            buf: [0u8; L],
            len: 0,
        }
    }

    /// Insert a character at `pos`, shifting the rest right.
    ///
    /// Returns `false` if the buffer is full or `pos` is past the end.
    pub fn insert(&mut self, pos: usize, c: u8) -> bool {
        if self.is_full() || pos > self.len {
            return false;
        }

        self.buf.copy_within(pos..self.len, pos + 1);
        self.buf[pos] = c;
        self.len += 1;
        self.buf[self.len] = 0;
        true
    }

    /// Push a character at the end
    pub fn push(&mut self, c: u8) -> bool {
        self.insert(self.len, c)
    }

    /// Remove the character at `pos`, shifting the rest left.
    pub fn remove(&mut self, pos: usize) -> Option<u8> {
        if pos >= self.len {
            return None;
        }

        let c = self.buf[pos];
        self.buf.copy_within(pos + 1..self.len, pos);
        self.len -= 1;
        self.buf[self.len] = 0;
        Some(c)
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.buf = [0u8; L];
        self.len = 0;
    }

    /// Get buffer as string slice
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Text from `pos` to the end (empty if `pos` is past the end)
    pub fn tail_str(&self, pos: usize) -> &str {
        let start = pos.min(self.len);
        core::str::from_utf8(&self.buf[start..self.len]).unwrap_or("")
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Raw bytes including the terminating NUL
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf[..=self.len]
    }

    /// Get buffer length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// No room for another character
    pub fn is_full(&self) -> bool {
        self.len >= Self::capacity()
    }

    /// Characters the buffer can hold
    pub const fn capacity() -> usize {
        L - 1
    }
}

impl<const L: usize> Default for LineBuffer<L> {
    fn default() -> Self {
        Self::new()
    }
}
