//! Line editor state machine.
//!
//! Turns a raw byte stream into one finished command line per terminator,
//! echoing and re-rendering the line as the user edits it.
//!
//! ```text
//!            ESC           '['            '3' '2' '5' '6'
//! Running ───────▶ Escape ─────▶ Bracket ────────────────▶ BracketTilde
//!    ▲  │             │ other       │ 'C' 'D' other              │ any
//!    │  │ CR/LF       ▼             ▼                            │
//!    │  └──▶ LineReady    Running      Running ◀─────────────────┘
//!    └──── drain() ─┘
//! ```
//!
//! The decision part is the pure [`transition`] function; [`LineEditor`]
//! applies the resulting [`Action`] to its buffer and writes the terminal
//! side effects to a `fmt::Write` sink.

use core::fmt::Write;

use super::ansi;
use super::line_buffer::LineBuffer;
use crate::config::LINE_SIZE;

/// Editor state tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EditorState {
    /// Accepting characters.
    #[default]
    Running,
    /// Got ESC.
    Escape,
    /// Got ESC [.
    EscapeBracket,
    /// Swallow the `~` that ends an ESC [ n ~ sequence.
    EscapeBracketTilde,
    /// Line terminated, waiting for `drain`.
    LineReady,
}

/// Edit requested by one input byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// No buffer or terminal effect.
    None,
    /// Insert a printable character at the cursor.
    Insert(u8),
    /// Delete the character left of the cursor.
    Backspace,
    /// Delete the character under the cursor.
    DeleteForward,
    /// Move the cursor one column right.
    CursorRight,
    /// Move the cursor one column left.
    CursorLeft,
    /// Finish the line.
    Terminate,
}

/// Next state and action for `byte` received in `state`.
pub fn transition(state: EditorState, byte: u8) -> (EditorState, Action) {
    use EditorState::*;

    match state {
        Running => match byte {
            ansi::BS | ansi::DEL => (Running, Action::Backspace),
            ansi::ESC => (Escape, Action::None),
            ansi::CR | ansi::LF => (LineReady, Action::Terminate),
            0x20..=0x7E => (Running, Action::Insert(byte)),
            _ => (Running, Action::None),
        },
        Escape => match byte {
            b'[' => (EscapeBracket, Action::None),
            _ => (Running, Action::None),
        },
        EscapeBracket => match byte {
            b'C' => (Running, Action::CursorRight),
            b'D' => (Running, Action::CursorLeft),
            b'3' => (EscapeBracketTilde, Action::DeleteForward),
            // insert, page up, page down: unsupported
            b'2' | b'5' | b'6' => (EscapeBracketTilde, Action::None),
            _ => (Running, Action::None),
        },
        EscapeBracketTilde => (Running, Action::None),
        LineReady => (LineReady, Action::None),
    }
}

/// Line editor over a fixed buffer of `L` bytes (`L - 1` characters).
pub struct LineEditor<const L: usize = LINE_SIZE> {
    line: LineBuffer<L>,
    position: usize,
    state: EditorState,
}

impl<const L: usize> LineEditor<L> {
    /// Create an editor with an empty line.
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            position: 0,
            state: EditorState::Running,
        }
    }

    /// Process one incoming byte, writing echo and control sequences to `out`.
    pub fn feed(&mut self, byte: u8, out: &mut dyn Write) {
        let (next, action) = transition(self.state, byte);
        self.state = next;
        // Terminal writes never fail on the transport; ignore sink errors.
        let _ = self.apply(action, out);
    }

    /// Take the finished line, if any, and reset for the next one.
    pub fn drain(&mut self) -> Option<LineBuffer<L>> {
        if self.state != EditorState::LineReady {
            return None;
        }

        let line = self.line;
        self.line.clear();
        self.position = 0;
        self.state = EditorState::Running;
        Some(line)
    }

    /// Current state tag.
    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Cursor index into the line.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Line being edited.
    pub fn line(&self) -> &LineBuffer<L> {
        &self.line
    }

    fn apply(&mut self, action: Action, out: &mut dyn Write) -> core::fmt::Result {
        match action {
            Action::None | Action::Terminate => Ok(()),

            Action::Insert(c) => {
                if !self.line.insert(self.position, c) {
                    return out.write_str(ansi::BELL);
                }
                self.position += 1;
                out.write_char(c as char)?;

                // Mid-line insert: redraw what got pushed right
                if self.position < self.line.len() {
                    out.write_str(ansi::CURSOR_SAVE)?;
                    out.write_str(self.line.tail_str(self.position))?;
                    out.write_str(ansi::CURSOR_RESTORE)?;
                }
                Ok(())
            }

            Action::Backspace => {
                if self.position == 0 {
                    return out.write_str(ansi::BELL);
                }
                out.write_str(ansi::CURSOR_LEFT)?;
                self.redraw_from(self.position, out)?;
                self.line.remove(self.position - 1);
                self.position -= 1;
                Ok(())
            }

            Action::DeleteForward => {
                if self.position >= self.line.len() {
                    return out.write_str(ansi::BELL);
                }
                self.redraw_from(self.position + 1, out)?;
                self.line.remove(self.position);
                Ok(())
            }

            Action::CursorRight => {
                if self.position >= self.line.len() {
                    return out.write_str(ansi::BELL);
                }
                self.position += 1;
                out.write_str(ansi::CURSOR_RIGHT)
            }

            Action::CursorLeft => {
                if self.position == 0 {
                    return out.write_str(ansi::BELL);
                }
                self.position -= 1;
                out.write_str(ansi::CURSOR_LEFT)
            }
        }
    }

    /// Clear from the cursor to end of line and rewrite the text from `from`,
    /// leaving the cursor where it was.
    fn redraw_from(&self, from: usize, out: &mut dyn Write) -> core::fmt::Result {
        out.write_str(ansi::CURSOR_SAVE)?;
        out.write_str(ansi::CLEAR_TO_EOL)?;
        out.write_str(self.line.tail_str(from))?;
        out.write_str(ansi::CURSOR_RESTORE)
    }
}

impl<const L: usize> Default for LineEditor<L> {
    fn default() -> Self {
        Self::new()
    }
}
