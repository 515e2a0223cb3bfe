//! Global log stream instance.
//!
//! Producers: transport interrupt handlers and the main loop.
//! Consumer: the console `log` command.

use crate::logging::LogStream;

/// Console log stream.
pub static CONSOLE_LOG_STREAM: LogStream = LogStream::new();
