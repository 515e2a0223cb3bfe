//! UART receive error codes.

/// Error reported by the transport's read side.
///
/// Stored as `u8` in the sticky error slot, `0` meaning none.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum UartError {
    /// Read attempted on an empty receive buffer. Expected, not a fault.
    NoData = 1,
    /// Hardware saw a missing stop bit.
    FrameError = 2,
    /// Hardware receive register overwritten before it was read.
    OverrunError = 3,
    /// Receive ring full, the newest byte was dropped.
    BufferOverflow = 4,
}

impl UartError {
    /// Convert from the raw sticky slot value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(UartError::NoData),
            2 => Some(UartError::FrameError),
            3 => Some(UartError::OverrunError),
            4 => Some(UartError::BufferOverflow),
            _ => None,
        }
    }

    /// Short error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoData => "U01",
            Self::FrameError => "U02",
            Self::OverrunError => "U03",
            Self::BufferOverflow => "U04",
        }
    }

    /// Error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoData => "no data",
            Self::FrameError => "frame error",
            Self::OverrunError => "overrun error",
            Self::BufferOverflow => "receive buffer overflow",
        }
    }
}

impl core::fmt::Display for UartError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
