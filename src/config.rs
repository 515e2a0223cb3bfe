//! Compile- and init-time configuration for the serial console.
//!
//! Buffer sizes are fixed at compile time (no heap); the UART clock and baud
//! rate are handed to [`UartTransport::init`](crate::uart::UartTransport::init).

/// Receive ring buffer size in bytes (power of 2, one slot stays unused).
pub const RX_BUFFER_SIZE: usize = 64;

/// Transmit ring buffer size in bytes (power of 2, one slot stays unused).
pub const TX_BUFFER_SIZE: usize = 64;

/// Line editor buffer length, including the terminating NUL.
pub const LINE_SIZE: usize = 64;

const _: () = assert!(RX_BUFFER_SIZE.is_power_of_two() && RX_BUFFER_SIZE >= 2);
const _: () = assert!(TX_BUFFER_SIZE.is_power_of_two() && TX_BUFFER_SIZE >= 2);
const _: () = assert!(LINE_SIZE >= 2);

/// UART clock and line settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    /// Clock feeding the baud-rate generator, in Hz.
    pub clock_hz: u32,
    /// Line speed in bits per second.
    pub baud_rate: u32,
}

impl UartConfig {
    /// Config for the given clock and baud rate.
    pub const fn new(clock_hz: u32, baud_rate: u32) -> Self {
        Self {
            clock_hz,
            baud_rate,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            clock_hz: 1_000_000, // SMCLK = DCO 16 MHz / 16
            baud_rate: 9600,
        }
    }
}
