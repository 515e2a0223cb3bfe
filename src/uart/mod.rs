//! Interrupt-driven UART transport.
//!
//! # Architecture
//!
//! ```text
//!            receive ISR                          main loop
//! wire ──▶ on_receive() ──▶ [ rx ring ] ──▶ get() / peek() ──▶ line editor
//!
//!            transmit ISR                         main loop
//! wire ◀── on_transmit_ready() ◀── [ tx ring ] ◀── put() / put_string()
//! ```
//!
//! # Rules
//!
//! - Each ring has one producer and one consumer, fixed for its lifetime
//! - Only `put` blocks (spins while the tx ring is full)
//! - Receive faults are latched in a sticky error slot, newest wins, and
//!   handed out with the next byte returned by `get`
//! - The transmit interrupt masks itself when the tx ring drains and is
//!   re-armed by the next `put`

pub mod baud;
pub mod error;

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::atomic::{atomic, InterruptControl};
use crate::config::{UartConfig, RX_BUFFER_SIZE, TX_BUFFER_SIZE};
use crate::hal::UartHardware;
use crate::log_globals::CONSOLE_LOG_STREAM;
use crate::ring_buffer::RingBuffer;

pub use baud::{BaudDivisor, ConfigError};
pub use error::UartError;

/// Sticky slot value meaning "no error latched".
const NO_ERROR: u8 = 0;

/// A byte handed out by [`UartTransport::get`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RxByte {
    /// The received byte.
    pub byte: u8,
    /// Error latched since the previous successful read, now cleared.
    pub error: Option<UartError>,
}

/// Byte-level port the console runs on.
pub trait SerialPort {
    /// Take one received byte. Never blocks; `Err(NoData)` when empty.
    fn read_byte(&self) -> Result<RxByte, UartError>;

    /// Queue one byte for output.
    fn write_byte(&self, byte: u8);

    /// Queue several bytes, in order.
    fn write_bytes(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }
}

/// `core::fmt::Write` adapter over a [`SerialPort`].
pub struct PortWriter<'a, P: SerialPort + ?Sized>(pub &'a P);

impl<P: SerialPort + ?Sized> fmt::Write for PortWriter<'_, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_bytes(s.as_bytes());
        Ok(())
    }
}

/// UART transport: two ring buffers, the interrupt handlers, and the public
/// byte API.
///
/// Shared by reference between the main loop and the board's interrupt
/// dispatch; the board-support layer calls [`on_receive`](Self::on_receive)
/// and [`on_transmit_ready`](Self::on_transmit_ready) from its vectors.
pub struct UartTransport<
    H,
    I,
    const RX: usize = RX_BUFFER_SIZE,
    const TX: usize = TX_BUFFER_SIZE,
> {
    hw: H,
    irq: I,
    rx: RingBuffer<RX>,
    tx: RingBuffer<TX>,
    last_error: AtomicU8,
}

impl<H, I, const RX: usize, const TX: usize> UartTransport<H, I, RX, TX>
where
    H: UartHardware,
    I: InterruptControl,
{
    /// Create a transport with empty buffers. Call [`init`](Self::init)
    /// before enabling interrupts.
    pub const fn new(hw: H, irq: I) -> Self {
        Self {
            hw,
            irq,
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
            last_error: AtomicU8::new(NO_ERROR),
        }
    }

    /// Reset both rings, program the baud-rate generator, and unmask the
    /// receive interrupt. The transmit interrupt stays masked until the
    /// first `put`.
    ///
    /// If the hardware rejects the divisor the receive interrupt stays
    /// masked and the error is returned.
    pub fn init(&self, config: &UartConfig) -> Result<BaudDivisor, ConfigError> {
        let divisor = BaudDivisor::compute(config.clock_hz, config.baud_rate)?;

        atomic(&self.irq, || {
            self.rx.reset();
            self.tx.reset();
            self.last_error.store(NO_ERROR, Ordering::Release);
            self.hw.set_tx_interrupt(false);
            self.hw.configure(&divisor)?;
            self.hw.enable_rx_interrupt();
            Ok::<(), ConfigError>(())
        })?;

        crate::log_info!(
            CONSOLE_LOG_STREAM,
            self.hw.timestamp_us(),
            "uart {} baud brw={} mctlw=0x{:04x}",
            divisor.baud_rate,
            divisor.brw(),
            divisor.mctlw()
        );

        Ok(divisor)
    }

    /// Receive interrupt handler.
    ///
    /// Always reads the receive register (clearing the pending flag), even
    /// when the byte cannot be kept.
    pub fn on_receive(&self) {
        let frame = self.hw.read_rx();

        if frame.frame_error {
            self.latch(UartError::FrameError);
        }
        if frame.overrun {
            self.latch(UartError::OverrunError);
        }

        if !self.rx.try_push(frame.byte) {
            self.latch(UartError::BufferOverflow);
            crate::log_warn!(
                CONSOLE_LOG_STREAM,
                self.hw.timestamp_us(),
                "rx overflow, dropped 0x{:02x}",
                frame.byte
            );
        } else if frame.frame_error || frame.overrun {
            crate::log_warn!(
                CONSOLE_LOG_STREAM,
                self.hw.timestamp_us(),
                "rx line fault fe={} oe={}",
                frame.frame_error,
                frame.overrun
            );
        }
    }

    /// Transmit interrupt handler.
    ///
    /// Sends the next queued byte, or masks its own interrupt once the tx
    /// ring is empty.
    pub fn on_transmit_ready(&self) {
        match self.tx.try_pop(&self.irq) {
            Some(byte) => self.hw.write_tx(byte),
            None => self.hw.set_tx_interrupt(false),
        }
    }

    /// Queue one byte for transmission, spinning while the tx ring is full.
    ///
    /// Each attempt runs in its own atomic section: the full test, the store
    /// and re-arming a masked transmit interrupt happen together, so the
    /// handler cannot mask itself between the push and the check. The spin
    /// stays outside the section so the handler can free a slot.
    ///
    /// Must not be called with interrupts disabled.
    pub fn put(&self, byte: u8) -> u8 {
        while !atomic(&self.irq, || self.try_queue(byte)) {
            core::hint::spin_loop();
        }

        byte
    }

    /// Queue a string, byte by byte. Not atomic with respect to other
    /// producers.
    pub fn put_string(&self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    /// Queue raw bytes, in order.
    pub fn put_bytes(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.put(byte);
        }
    }

    /// Take the oldest received byte with any latched error attached.
    pub fn get(&self) -> Result<RxByte, UartError> {
        let byte = self.rx.try_pop(&self.irq).ok_or(UartError::NoData)?;
        let error = UartError::from_u8(self.last_error.swap(NO_ERROR, Ordering::AcqRel));
        Ok(RxByte { byte, error })
    }

    /// Look at the oldest received byte without consuming it.
    pub fn peek(&self) -> Result<u8, UartError> {
        self.rx.peek(&self.irq).ok_or(UartError::NoData)
    }

    /// Bytes waiting in the receive ring.
    pub fn available(&self) -> usize {
        self.rx.available(&self.irq)
    }

    /// Discard all received bytes not yet read.
    pub fn flush(&self) {
        self.rx.flush(&self.irq);
    }

    /// Bytes still queued for transmission.
    pub fn tx_pending(&self) -> usize {
        self.tx.available(&self.irq)
    }

    /// Latched error, without clearing it.
    pub fn last_error(&self) -> Option<UartError> {
        UartError::from_u8(self.last_error.load(Ordering::Acquire))
    }

    /// Board hardware handle.
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// Interrupt control the transport masks with.
    pub fn interrupts(&self) -> &I {
        &self.irq
    }

    /// `core::fmt::Write` view of the transmit side.
    pub fn writer(&self) -> PortWriter<'_, Self> {
        PortWriter(self)
    }

    /// Push into the tx ring and wake the transmit handler. Call with
    /// interrupts disabled.
    fn try_queue(&self, byte: u8) -> bool {
        if !self.tx.try_push(byte) {
            return false;
        }
        if !self.hw.tx_interrupt_enabled() {
            self.hw.set_tx_pending();
            self.hw.set_tx_interrupt(true);
        }
        true
    }

    #[inline]
    fn latch(&self, error: UartError) {
        self.last_error.store(error as u8, Ordering::Release);
    }
}

impl<H, I, const RX: usize, const TX: usize> SerialPort for UartTransport<H, I, RX, TX>
where
    H: UartHardware,
    I: InterruptControl,
{
    fn read_byte(&self) -> Result<RxByte, UartError> {
        self.get()
    }

    fn write_byte(&self, byte: u8) {
        self.put(byte);
    }

    fn write_bytes(&self, bytes: &[u8]) {
        self.put_bytes(bytes);
    }
}
