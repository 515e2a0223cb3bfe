//! UartLineConsole - firmware entry point (ESP32-S3, UART0)
//!
//! 1. Install the esp-idf UART driver on the console pins
//! 2. Init the transport (rings, baud rate, rx interrupt) with interrupts off
//! 3. Start the dispatcher task that stands in for the UART vectors
//! 4. Enable interrupts and poll the console from the main task

use std::thread;

use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::uart::{self, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys as esp_idf_sys;

use uart_line_console::{
    config::UartConfig,
    console::Console,
    hal::esp_uart::{dispatch, EspUart, TaskInterrupts},
    log_error,
    uart::UartTransport,
    InterruptControl, CONSOLE_LOG_STREAM,
};

/// Dispatcher task stack, bytes.
const DISPATCH_STACK_SIZE: usize = 4096;

/// Driver event queue depth (frame errors, FIFO overflows).
const UART_EVENT_QUEUE: usize = 16;

fn main() {
    // Initialize ESP-IDF
    esp_idf_sys::link_patches();

    let Ok(peripherals) = Peripherals::take() else {
        halt();
    };

    let config = UartConfig::default();
    let uart_config = uart::config::Config::default()
        .baudrate(Hertz(config.baud_rate))
        .queue_size(UART_EVENT_QUEUE);

    let driver = match UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,        // TX
        peripherals.pins.gpio44,        // RX
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    ) {
        Ok(driver) => driver,
        Err(_) => halt(),
    };

    let transport: UartTransport<_, _> =
        UartTransport::new(EspUart::new(driver), TaskInterrupts::new());

    // Interrupts stay off until the console is ready, as after reset
    transport.interrupts().disable_interrupts();
    if let Err(err) = transport.init(&config) {
        log_error!(CONSOLE_LOG_STREAM, timestamp_us(), "uart init: {}", err);
        halt();
    }

    let mut console: Console = Console::new();

    thread::scope(|s| {
        let spawned = thread::Builder::new()
            .stack_size(DISPATCH_STACK_SIZE)
            .spawn_scoped(s, || loop {
                if !dispatch(&transport) {
                    // Nothing pending: yield one tick
                    // SAFETY: vTaskDelay is always safe to call from a task
                    unsafe { esp_idf_sys::vTaskDelay(1) };
                }
            });

        if spawned.is_err() {
            halt();
        }

        // Enable interrupts
        transport.interrupts().enable_interrupts();
        console.print_banner(&mut transport.writer());

        loop {
            if console.poll(&transport).is_none() {
                // SAFETY: vTaskDelay is always safe to call from a task
                unsafe { esp_idf_sys::vTaskDelay(1) };
            }
        }
    });
}

fn timestamp_us() -> i64 {
    // SAFETY: esp_timer_get_time is always safe to call
    unsafe { esp_idf_sys::esp_timer_get_time() }
}

/// Park the main task after an unrecoverable bring-up failure.
fn halt() -> ! {
    loop {
        // SAFETY: vTaskDelay is always safe to call from a task
        unsafe { esp_idf_sys::vTaskDelay(1000) };
    }
}
