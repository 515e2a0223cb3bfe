//! Key codes and the VT100 control sequences the line editor emits.

pub const NUL: u8 = 0x00;
pub const BEL: u8 = 0x07;
pub const BS: u8 = 0x08;
pub const LF: u8 = 0x0A;
pub const CR: u8 = 0x0D;
pub const ESC: u8 = 0x1B;
/// Sent by most terminals for the backspace key.
pub const DEL: u8 = 0x7F;

/// Bell, as a string for `fmt::Write` sinks.
pub const BELL: &str = "\x07";
pub const CURSOR_RIGHT: &str = "\x1b[C";
pub const CURSOR_LEFT: &str = "\x1b[D";
pub const CURSOR_SAVE: &str = "\x1b[s";
pub const CURSOR_RESTORE: &str = "\x1b[u";
pub const CLEAR_TO_EOL: &str = "\x1b[0K";
