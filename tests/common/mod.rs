//! Shared register model for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use uart_line_console::atomic::{ExecutionContext, InterruptFlag, SectionLock};
use uart_line_console::hal::{RxFrame, UartHardware};
use uart_line_console::uart::{BaudDivisor, ConfigError, UartTransport};
use uart_line_console::{InterruptControl, UartConfig};

/// Thread-safe UART register model.
///
/// Bytes "arriving on the wire" are queued with `inject`; the test then calls
/// the transport's `on_receive` the way the receive vector would.
#[derive(Default)]
pub struct MockUart {
    rx_wire: Mutex<VecDeque<RxFrame>>,
    tx_wire: Mutex<Vec<u8>>,
    divisor: Mutex<Option<BaudDivisor>>,
    reject_config: AtomicBool,
    rx_ie: AtomicBool,
    tx_ie: AtomicBool,
    tx_pending: AtomicBool,
    clock: AtomicI64,
}

impl MockUart {
    pub fn inject(&self, frame: RxFrame) {
        self.rx_wire.lock().unwrap().push_back(frame);
    }

    /// Frames injected but not yet read by the receive handler.
    pub fn rx_waiting(&self) -> bool {
        !self.rx_wire.lock().unwrap().is_empty()
    }

    pub fn sent(&self) -> Vec<u8> {
        self.tx_wire.lock().unwrap().clone()
    }

    pub fn sent_string(&self) -> String {
        String::from_utf8_lossy(&self.sent()).into_owned()
    }

    pub fn clear_sent(&self) {
        self.tx_wire.lock().unwrap().clear();
    }

    pub fn divisor(&self) -> Option<BaudDivisor> {
        *self.divisor.lock().unwrap()
    }

    /// Make the next `configure` fail, like a driver refusing the rate.
    pub fn reject_config(&self) {
        self.reject_config.store(true, Ordering::Release);
    }

    pub fn rx_interrupt_enabled(&self) -> bool {
        self.rx_ie.load(Ordering::Acquire)
    }

    pub fn tx_pending(&self) -> bool {
        self.tx_pending.load(Ordering::Acquire)
    }
}

impl UartHardware for MockUart {
    fn configure(&self, divisor: &BaudDivisor) -> Result<(), ConfigError> {
        if self.reject_config.load(Ordering::Acquire) {
            return Err(ConfigError::Hardware);
        }
        *self.divisor.lock().unwrap() = Some(*divisor);
        Ok(())
    }

    fn enable_rx_interrupt(&self) {
        self.rx_ie.store(true, Ordering::Release);
    }

    fn read_rx(&self) -> RxFrame {
        // Reading an empty register yields whatever was last latched; 0 here.
        self.rx_wire.lock().unwrap().pop_front().unwrap_or_default()
    }

    fn write_tx(&self, byte: u8) {
        self.tx_wire.lock().unwrap().push(byte);
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
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
}

static NEXT_THREAD_ID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static THREAD_ID: usize = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Test threads as execution contexts: the main test thread plays the main
/// loop, a spawned thread plays the handler dispatcher.
pub struct TestThread;

impl ExecutionContext for TestThread {
    fn current_id() -> usize {
        THREAD_ID.with(|id| *id)
    }

    fn relax() {
        std::thread::yield_now();
    }
}

/// Transport for single-threaded tests.
pub type Transport<const RX: usize, const TX: usize> =
    UartTransport<MockUart, InterruptFlag, RX, TX>;

/// Transport whose handlers may run on another thread.
pub type SharedTransport<const RX: usize, const TX: usize> =
    UartTransport<MockUart, SectionLock<TestThread>, RX, TX>;

/// Initialized transport with interrupts enabled.
pub fn transport<const RX: usize, const TX: usize>() -> Transport<RX, TX> {
    let t = UartTransport::new(MockUart::default(), InterruptFlag::new(true));
    t.init(&UartConfig::default()).expect("default config is valid");
    t
}

/// Initialized transport over a [`SectionLock`], no section held.
pub fn shared_transport<const RX: usize, const TX: usize>() -> SharedTransport<RX, TX> {
    let t = UartTransport::new(MockUart::default(), SectionLock::new());
    t.init(&UartConfig::default()).expect("default config is valid");
    t
}

/// Deliver bytes through the receive handler, one interrupt per byte.
pub fn receive<I, const RX: usize, const TX: usize>(
    t: &UartTransport<MockUart, I, RX, TX>,
    bytes: &[u8],
) where
    I: InterruptControl,
{
    for &b in bytes {
        t.hardware().inject(RxFrame::new(b));
        t.on_receive();
    }
}

/// Run the transmit handler until it masks itself.
pub fn drain_tx<I, const RX: usize, const TX: usize>(t: &UartTransport<MockUart, I, RX, TX>)
where
    I: InterruptControl,
{
    while t.hardware().tx_interrupt_enabled() {
        t.on_transmit_ready();
    }
}
