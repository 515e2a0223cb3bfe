//! Log output over the console port.
//!
//! Drains a [`LogStream`] and writes each entry as text. Called from the
//! console `log` command, never from interrupt context.
//!
//! Format: `[timestamp_us] LEVEL: message\r\n`

use core::fmt::Write;

use crate::logging::{LogEntry, LogStream};

/// Write one log entry as a CRLF-terminated line.
pub fn write_log_entry(out: &mut dyn Write, entry: &LogEntry) -> core::fmt::Result {
    write!(
        out,
        "[{:10}] {}: {}\r\n",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.message()
    )
}

/// Write every pending entry, then a drop report if entries were lost.
///
/// Returns the number of entries written.
pub fn drain_to<const N: usize>(stream: &LogStream<N>, out: &mut dyn Write) -> usize {
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let _ = write_log_entry(out, &entry);
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = write!(out, "[WARN] Dropped: {}\r\n", dropped);
        stream.reset_dropped();
    }

    count
}
