//! Hardware Abstraction Layer for the UART console.
//!
//! Register-level seam between the transport and a board-support layer.
//! Business logic stays in core modules, HAL is just I/O.

#[cfg(target_os = "espidf")]
pub mod esp_uart;

use crate::uart::baud::{BaudDivisor, ConfigError};

/// One frame taken from the receive register, with its line status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RxFrame {
    /// Received byte.
    pub byte: u8,
    /// Stop bit missing.
    pub frame_error: bool,
    /// A previous byte was not read before this one arrived.
    pub overrun: bool,
}

impl RxFrame {
    /// A clean frame carrying `byte`.
    pub const fn new(byte: u8) -> Self {
        Self {
            byte,
            frame_error: false,
            overrun: false,
        }
    }
}

/// UART peripheral registers as seen by the transport.
///
/// All methods take `&self`: the transport is shared between the main loop
/// and the interrupt handlers, and register access is volatile I/O rather
/// than Rust-level mutation.
pub trait UartHardware {
    /// Program divisor and modulation, hold the peripheral in reset meanwhile.
    ///
    /// Returns [`ConfigError::Hardware`] if the peripheral did not take the
    /// settings.
    fn configure(&self, divisor: &BaudDivisor) -> Result<(), ConfigError>;

    /// Unmask the receive interrupt.
    fn enable_rx_interrupt(&self);

    /// Read the receive register. Clears the hardware's pending flag.
    fn read_rx(&self) -> RxFrame;

    /// Load the transmit register.
    fn write_tx(&self, byte: u8);

    /// Whether the transmit interrupt is unmasked.
    fn tx_interrupt_enabled(&self) -> bool;

    /// Mask or unmask the transmit interrupt.
    fn set_tx_interrupt(&self, enabled: bool);

    /// Raise the transmit pending flag so the handler runs once unmasked.
    fn set_tx_pending(&self);

    /// Free-running time base for log stamps, 0 if the board has none.
    fn timestamp_us(&self) -> i64 {
        0
    }
}
