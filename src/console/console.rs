//! Main console struct integrating all components

use core::fmt::Write;

use super::ansi;
use super::commands::VERSION;
use super::{execute, parse_line, ConsoleError, LineEditor};
use crate::config::{UartConfig, LINE_SIZE};
use crate::uart::{PortWriter, SerialPort};

/// Prompt printed after every command
pub const PROMPT: &str = "uart-cli > ";

/// Console front-end: line editor plus command dispatch.
pub struct Console<const L: usize = LINE_SIZE> {
    editor: LineEditor<L>,
    last_cr: bool,
}

impl<const L: usize> Console<L> {
    /// Create new console
    pub const fn new() -> Self {
        Self {
            editor: LineEditor::new(),
            last_cr: false,
        }
    }

    /// Process a single input byte
    ///
    /// Returns Some(result) if a line was completed and dispatched, None if
    /// more input is needed.
    pub fn process_byte(
        &mut self,
        byte: u8,
        out: &mut dyn Write,
    ) -> Option<Result<(), ConsoleError>> {
        // CR LF from the terminal is one terminator, not two
        let skip = self.last_cr && byte == ansi::LF;
        self.last_cr = byte == ansi::CR;
        if skip {
            return None;
        }

        self.editor.feed(byte, out);
        let line = self.editor.drain()?;

        let _ = write!(out, "\r\n");
        let result = execute(&parse_line(line.as_str()), out);
        if let Err(err) = result {
            let _ = write!(out, "{}\r\n", err);
        }
        self.print_prompt(out);

        Some(result)
    }

    /// Drain received bytes from `port` until empty or one line completes.
    ///
    /// Never blocks on input.
    pub fn poll<P: SerialPort + ?Sized>(&mut self, port: &P) -> Option<Result<(), ConsoleError>> {
        let mut out = PortWriter(port);

        // Line faults are already latched and logged by the transport.
        while let Ok(rx) = port.read_byte() {
            if let Some(result) = self.process_byte(rx.byte, &mut out) {
                return Some(result);
            }
        }
        None
    }

    /// Line editor state, for diagnostics
    pub fn editor(&self) -> &LineEditor<L> {
        &self.editor
    }

    /// Print the prompt
    pub fn print_prompt(&self, out: &mut dyn Write) {
        let _ = write!(out, "{}", PROMPT);
    }

    /// Print welcome banner
    pub fn print_banner(&self, out: &mut dyn Write) {
        let uart = UartConfig::default();

        let _ = write!(out, "\r\n*----------------------------------------*\r\n");
        let _ = write!(out, "*         Command Line Interface         *\r\n");
        let _ = write!(out, "*----------------------------------------*\r\n");
        let _ = write!(out, "{}\r\n", VERSION);
        let _ = write!(out, "UART {} baud @ {} Hz\r\n", uart.baud_rate, uart.clock_hz);
        let _ = write!(out, "Type 'help' for commands.\r\n\r\n");
        self.print_prompt(out);
    }
}

impl<const L: usize> Default for Console<L> {
    fn default() -> Self {
        Self::new()
    }
}
