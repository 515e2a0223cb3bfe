//! ESP-IDF board support for the console UART.
//!
//! ESP-IDF owns the real UART vectors, so the transport's handlers are
//! driven from a dispatcher task instead:
//!
//! ```text
//! UART0 ──▶ esp-idf driver ──▶ dispatcher task ──▶ on_receive()
//!            (event queue)      (polls, 1 tick)  ──▶ on_transmit_ready()
//! ```
//!
//! Interrupt control is a [`SectionLock`] keyed on the FreeRTOS task handle.
//! The dispatcher runs every handler call inside an atomic section, so a
//! main-loop section and a handler never overlap. A handler's own nested
//! sections see interrupts disabled, as they would in a real vector.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

use esp_idf_svc::hal::delay::NON_BLOCK;
use esp_idf_svc::hal::uart::{UartDriver, UartEventPayload};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys as esp_idf_sys;

use super::{RxFrame, UartHardware};
use crate::atomic::{atomic, ExecutionContext, InterruptControl, SectionLock};
use crate::log_globals::CONSOLE_LOG_STREAM;
use crate::uart::{BaudDivisor, ConfigError, UartTransport};

/// Latch marker: bit 8 set means a byte is waiting in the low bits.
const LATCH_FULL: u16 = 0x100;

/// Line status bits collected from driver events until the next read.
const STATUS_FRAME: u8 = 0x01;
const STATUS_OVERRUN: u8 = 0x02;

/// FreeRTOS tasks as execution contexts.
pub struct FreeRtosTask;

impl ExecutionContext for FreeRtosTask {
    fn current_id() -> usize {
        // SAFETY: returns the handle of the calling task, never null once
        // the scheduler runs.
        unsafe { esp_idf_sys::xTaskGetCurrentTaskHandle() as usize }
    }

    fn relax() {
        // Block for a tick so a lower-priority owner can finish its section.
        // SAFETY: called from task context only.
        unsafe { esp_idf_sys::vTaskDelay(1) };
    }
}

/// Interrupt control for the console on ESP-IDF.
pub type TaskInterrupts = SectionLock<FreeRtosTask>;

/// Console UART on top of the esp-idf UART driver.
pub struct EspUart<'d> {
    driver: UartDriver<'d>,
    rx_latch: AtomicU16,
    line_status: AtomicU8,
    rx_ie: AtomicBool,
    tx_ie: AtomicBool,
    tx_pending: AtomicBool,
}

// SAFETY: uart_read_bytes / uart_write_bytes serialize internally; the
// remaining state is atomics.
unsafe impl Sync for EspUart<'_> {}

impl<'d> EspUart<'d> {
    /// Wrap an installed driver. Install it with an event queue
    /// (`queue_size > 0`) to get frame and overflow reports.
    pub fn new(driver: UartDriver<'d>) -> Self {
        Self {
            driver,
            rx_latch: AtomicU16::new(0),
            line_status: AtomicU8::new(0),
            rx_ie: AtomicBool::new(false),
            tx_ie: AtomicBool::new(false),
            tx_pending: AtomicBool::new(false),
        }
    }

    /// Fold pending driver events into the line status.
    fn poll_events(&self) {
        let Some(queue) = self.driver.event_queue() else {
            return;
        };

        while let Some((event, _)) = queue.recv_front(NON_BLOCK) {
            let status = match event.payload() {
                UartEventPayload::FrameError | UartEventPayload::ParityError => STATUS_FRAME,
                UartEventPayload::RxFifoOverflow | UartEventPayload::RxBufferFull => {
                    STATUS_OVERRUN
                }
                _ => 0,
            };
            self.line_status.fetch_or(status, Ordering::AcqRel);
        }
    }

    /// Pull one byte from the driver into the receive latch.
    fn poll_rx(&self) -> bool {
        let mut byte = [0u8; 1];
        match self.driver.read(&mut byte, NON_BLOCK) {
            Ok(1) => {
                self.rx_latch
                    .store(LATCH_FULL | byte[0] as u16, Ordering::Release);
                true
            }
            _ => false,
        }
    }
}

impl UartHardware for EspUart<'_> {
    fn configure(&self, divisor: &BaudDivisor) -> Result<(), ConfigError> {
        // The esp-idf clock tree derives its own divider from the rate.
        self.driver
            .change_baudrate(Hertz(divisor.baud_rate))
            .map(|_| ())
            .map_err(|_| ConfigError::Hardware)
    }

    fn enable_rx_interrupt(&self) {
        self.rx_ie.store(true, Ordering::Release);
    }

    fn read_rx(&self) -> RxFrame {
        let latched = self.rx_latch.swap(0, Ordering::AcqRel);
        let status = self.line_status.swap(0, Ordering::AcqRel);
        RxFrame {
            byte: latched as u8,
            frame_error: status & STATUS_FRAME != 0,
            overrun: status & STATUS_OVERRUN != 0,
        }
    }

    fn write_tx(&self, byte: u8) {
        if let Err(err) = self.driver.write(&[byte]) {
            crate::log_error!(
                CONSOLE_LOG_STREAM,
                self.timestamp_us(),
                "uart write 0x{:02x}: {}",
                byte,
                err.code()
            );
        }
    }

    fn tx_interrupt_enabled(&self) -> bool {
        self.tx_ie.load(Ordering::Acquire)
    }

    fn set_tx_interrupt(&self, enabled: bool) {
        self.tx_ie.store(enabled, Ordering::Release);
    }

    fn set_tx_pending(&self) {
        self.tx_pending.store(true, Ordering::Release);
    }

    fn timestamp_us(&self) -> i64 {
        // SAFETY: esp_timer_get_time is always safe to call
        unsafe { esp_idf_sys::esp_timer_get_time() }
    }
}

/// One dispatcher pass: run whichever handlers are due.
///
/// Every handler call holds the interrupt section for its duration, one
/// byte at a time, so the main task gets in between bytes.
///
/// Returns `true` if any handler ran.
pub fn dispatch<I, const RX: usize, const TX: usize>(
    transport: &UartTransport<EspUart<'_>, I, RX, TX>,
) -> bool
where
    I: InterruptControl,
{
    let irq = transport.interrupts();
    let hw = transport.hardware();
    let mut work_done = false;

    let receive = || {
        hw.poll_events();
        let due = hw.rx_ie.load(Ordering::Acquire) && hw.poll_rx();
        if due {
            transport.on_receive();
        }
        due
    };
    while atomic(irq, &receive) {
        work_done = true;
    }

    let transmit = || {
        let due = hw.tx_interrupt_enabled();
        if due {
            hw.tx_pending.store(false, Ordering::Release);
            transport.on_transmit_ready();
        }
        due
    };
    while atomic(irq, &transmit) {
        work_done = true;
    }

    work_done
}
