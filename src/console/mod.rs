//! Serial console: line editor and command dispatch
//!
//! Polled from the main loop - no dedicated task.
//! Zero heap allocation - all static buffers.

pub mod ansi;
pub mod commands;
#[allow(clippy::module_inception)]
pub mod console;
pub mod error;
pub mod line_buffer;
pub mod line_editor;
pub mod parser;

pub use commands::{command_names, execute, find_command, COMMANDS};
pub use console::Console;
pub use error::ConsoleError;
pub use line_buffer::LineBuffer;
pub use line_editor::{transition, Action, EditorState, LineEditor};
pub use parser::{parse_line, ParsedCommand};
