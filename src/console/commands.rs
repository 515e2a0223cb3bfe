//! Command handlers
//!
//! Static table, linear lookup on the first word of the line.

use core::fmt::Write;

use super::parser::ParsedCommand;
use super::ConsoleError;
use crate::config::{UartConfig, LINE_SIZE, RX_BUFFER_SIZE, TX_BUFFER_SIZE};
use crate::log_drain;
use crate::log_globals::CONSOLE_LOG_STREAM;

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub brief: &'static str,
    pub handler: fn(&ParsedCommand<'_>, &mut dyn Write) -> Result<(), ConsoleError>,
}

/// All available commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "help", brief: "Show a list of commands", handler: cmd_help },
    CommandDescriptor { name: "info", brief: "Show console configuration", handler: cmd_info },
    CommandDescriptor { name: "hello", brief: "Say \"Hello, World\"", handler: cmd_hello },
    CommandDescriptor { name: "log", brief: "Dump pending log entries", handler: cmd_log },
];

/// Look up a command by name
pub fn find_command(name: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// Execute a parsed command
pub fn execute(cmd: &ParsedCommand<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if cmd.is_empty() {
        return Err(ConsoleError::MissingCommand);
    }

    let handler = find_command(cmd.command).ok_or(ConsoleError::UnknownCommand)?;

    (handler.handler)(cmd, out)
}

/// Get all command names
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|c| c.name)
}

// --- Command Implementations ---

fn cmd_help(cmd: &ParsedCommand<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if let Some(name) = cmd.arg(0) {
        // Help for specific command
        let c = find_command(name).ok_or(ConsoleError::UnknownCommand)?;
        let _ = write!(out, "{}: {}\r\n", c.name, c.brief);
    } else {
        let _ = write!(out, "Please input command as follows:\r\n");
        for c in COMMANDS {
            let _ = write!(out, "  {:<14} {}\r\n", c.name, c.brief);
        }
    }
    Ok(())
}

fn cmd_info(_cmd: &ParsedCommand<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let uart = UartConfig::default();

    let _ = write!(out, "<< Console Info >>\r\n");
    let _ = write!(out, "  {:<12} {}\r\n", "version:", VERSION);
    let _ = write!(out, "  {:<12} {} Hz\r\n", "uart clock:", uart.clock_hz);
    let _ = write!(out, "  {:<12} {}\r\n", "baud rate:", uart.baud_rate);
    let _ = write!(out, "  {:<12} {} bytes\r\n", "rx buffer:", RX_BUFFER_SIZE);
    let _ = write!(out, "  {:<12} {} bytes\r\n", "tx buffer:", TX_BUFFER_SIZE);
    let _ = write!(out, "  {:<12} {} chars\r\n", "line size:", LINE_SIZE - 1);
    Ok(())
}

fn cmd_hello(_cmd: &ParsedCommand<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let _ = write!(out, "Hello, World!\r\n");
    Ok(())
}

fn cmd_log(cmd: &ParsedCommand<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    match cmd.arg(0) {
        None => {
            if log_drain::drain_to(&CONSOLE_LOG_STREAM, out) == 0 {
                let _ = write!(out, "log: empty\r\n");
            }
        }
        Some("clear") => {
            while CONSOLE_LOG_STREAM.drain().is_some() {}
            CONSOLE_LOG_STREAM.reset_dropped();
        }
        Some(_) => return Err(ConsoleError::InvalidValue),
    }
    Ok(())
}
