//! Interrupt-safe logging for the serial console.
//!
//! # Architecture
//!
//! ```text
//! ISR / main loop          LogStream            `log` command
//! ───────────────          ─────────            ─────────────
//!
//! log_warn!() ─────────▶ [L0][L1][L2] ──────▶ serial port
//! never blocks            fixed slots          at leisure
//! ```
//!
//! # Rules
//!
//! - Interrupt handlers never block on logging; a full ring drops the entry
//! - Dropped entries are counted and reported by the drain side
//! - The console port is not written from the log path (it would interleave
//!   with the line being edited); entries wait until drained

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Longest message kept per entry; longer text is cut.
pub const MAX_MSG_LEN: usize = 48;

/// Entries in the console log ring (power of 2).
pub const LOG_BUFFER_SIZE: usize = 16;

/// Severity of a log entry, most severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    /// Tag printed in front of the message.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

/// One fixed-size slot of the log ring.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Board time base in microseconds, 0 if the board has none.
    pub timestamp_us: i64,
    pub level: LogLevel,
    /// Used bytes of `msg`.
    pub len: u8,
    /// Message text, not NUL-terminated.
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text, or a placeholder if it was cut inside a UTF-8 sequence.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free log ring: producers in the main loop and in interrupt handlers,
/// one consumer (the drain).
///
/// - Slots are claimed with a compare-exchange on `write_idx`, so a full ring
///   never advances the index
/// - A claimed slot is committed by storing `claim + 1` in its sequence
///   word once filled; drain stops at the first uncommitted slot
/// - Push never blocks (drops message if full)
/// - Drain runs from the main loop
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    /// Per-slot commit marker: `write index + 1` of the entry it holds.
    committed: [AtomicU32; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: Producers claim distinct slots through compare-exchange on
// write_idx; the single consumer only reads a slot after its commit marker
// is published, and releases it through read_idx.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            committed: [const { AtomicU32::new(0) }; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry (never blocks).
    ///
    /// Returns `true` if message was queued, `false` if dropped (ring full).
    /// Messages longer than [`MAX_MSG_LEN`] are truncated.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let mut write = self.write_idx.load(Ordering::Acquire);
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }

            match self.write_idx.compare_exchange_weak(
                write,
                write.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(current) => write = current,
            }
        }

        let idx = (write as usize) & Self::MASK;
        let len = msg.len().min(MAX_MSG_LEN);

        // SAFETY: slot `idx` was claimed exclusively by the exchange above.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }
        self.committed[idx].store(write.wrapping_add(1), Ordering::Release);

        true
    }

    /// Drain next log entry.
    ///
    /// Returns `None` if no entries available, or if the oldest one is
    /// claimed but still being written.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;
        if self.committed[idx].load(Ordering::Acquire) != read.wrapping_add(1) {
            return None;
        }

        // SAFETY: Single consumer. The commit marker shows the producer is
        // done with the slot, and it is not reused before read_idx moves on.
        let entry = unsafe { (*self.entries.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Get number of entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack buffer a log message is formatted into before it is pushed.
///
/// Formatting never fails: text past [`MAX_MSG_LEN`] is cut.
pub struct MessageBuf {
    buf: [u8; MAX_MSG_LEN],
    len: usize,
}

impl MessageBuf {
    /// Render `args`, keeping what fits.
    #[inline]
    pub fn format(args: core::fmt::Arguments<'_>) -> Self {
        let mut msg = Self {
            buf: [0; MAX_MSG_LEN],
            len: 0,
        };
        let _ = core::fmt::write(&mut msg, args);
        msg
    }

    /// Rendered bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl core::fmt::Write for MessageBuf {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let room = MAX_MSG_LEN - self.len;
        let n = s.len().min(room);
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}

/// Interrupt-safe log macro.
///
/// # Example
///
/// ```ignore
/// log_event!(LogLevel::Warn, CONSOLE_LOG_STREAM, hw.timestamp_us(), "rx overflow 0x{:02x}", byte);
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let msg = $crate::logging::MessageBuf::format(format_args!($($arg)*));
        $stream.push($timestamp, $level, msg.as_bytes());
    }};
}

/// Info log.
#[macro_export]
macro_rules! log_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::log_event!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

/// Warning log.
#[macro_export]
macro_rules! log_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::log_event!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

/// Error log.
#[macro_export]
macro_rules! log_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::log_event!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stream_basic() {
        let stream = LogStream::<16>::new();

        assert!(stream.push(1000, LogLevel::Info, b"uart up"));
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message(), "uart up");

        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_log_stream_full_keeps_index() {
        let stream = LogStream::<4>::new();

        for i in 0..4 {
            assert!(stream.push(i, LogLevel::Info, b"x"));
        }

        // Should drop, without corrupting the ring
        assert!(!stream.push(5, LogLevel::Info, b"5"));
        assert!(!stream.push(6, LogLevel::Info, b"6"));
        assert_eq!(stream.dropped(), 2);
        assert_eq!(stream.pending(), 4);

        assert_eq!(stream.drain().unwrap().timestamp_us, 0);
        assert!(stream.push(7, LogLevel::Warn, b"7"));

        let mut last = None;
        while let Some(entry) = stream.drain() {
            last = Some(entry);
        }
        assert_eq!(last.unwrap().timestamp_us, 7);
    }

    #[test]
    fn test_drain_waits_for_commit() {
        let stream = LogStream::<4>::new();

        // A producer has claimed slot 0 but not filled it yet
        stream.write_idx.store(1, Ordering::Release);
        assert_eq!(stream.pending(), 1);
        assert!(stream.drain().is_none());

        // Filling and committing it makes it visible
        unsafe {
            let entry = &mut (*stream.entries.get())[0];
            entry.timestamp_us = 9;
            entry.len = 0;
        }
        stream.committed[0].store(1, Ordering::Release);
        assert_eq!(stream.drain().unwrap().timestamp_us, 9);
    }

    #[test]
    fn test_drain_concurrent_with_producer() {
        use std::thread;

        let stream = LogStream::<8>::new();
        const COUNT: i64 = 2000;

        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..COUNT {
                    let msg = MessageBuf::format(format_args!("entry {}", i));
                    while !stream.push(i, LogLevel::Info, msg.as_bytes()) {
                        thread::yield_now();
                    }
                }
            });

            let mut next = 0;
            while next < COUNT {
                if let Some(entry) = stream.drain() {
                    assert_eq!(entry.timestamp_us, next);
                    assert_eq!(entry.message(), format!("entry {}", next));
                    next += 1;
                }
            }
        });
    }

    #[test]
    fn test_message_truncated() {
        let stream = LogStream::<4>::new();
        let long = [b'a'; MAX_MSG_LEN + 10];

        stream.push(0, LogLevel::Debug, &long);
        assert_eq!(stream.drain().unwrap().len as usize, MAX_MSG_LEN);
    }

    #[test]
    fn test_message_buf_cuts_long_text() {
        let msg = MessageBuf::format(format_args!("baud {}", 9600));
        assert_eq!(msg.as_bytes(), b"baud 9600");

        let long = MessageBuf::format(format_args!("{:>60}", "x"));
        assert_eq!(long.as_bytes().len(), MAX_MSG_LEN);
    }

    #[test]
    fn test_log_macro() {
        let stream = LogStream::<4>::new();
        crate::log_warn!(stream, 42, "dropped 0x{:02x}", 0x41);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.message(), "dropped 0x41");
    }

    #[test]
    fn test_concurrent_producers() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());
        let mut handles = vec![];

        for i in 0..4 {
            let stream = Arc::clone(&stream);
            handles.push(thread::spawn(move || {
                for j in 0..10 {
                    let msg = format!("T{} msg {}", i, j);
                    stream.push(j as i64, LogLevel::Info, msg.as_bytes());
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let mut count = 0;
        while stream.drain().is_some() {
            count += 1;
        }
        assert_eq!(count, 40, "All messages should be present");
    }
}
