//! # UartLineConsole
//!
//! Serial console front-end for a microcontroller.
//!
//! ## Architecture
//!
//! ```text
//! UART ISR ──▶ RingBuffer ──▶ LineEditor ──▶ command dispatch
//! UART ISR ◀── RingBuffer ◀── put() ◀──────── echo / command output
//! ```
//!
//! - Each ring has one producer and one consumer, no locks
//! - Main-loop reads of shared indices run in scoped atomic sections
//! - No heap, no scheduler: one main loop preempted by the UART handlers

#![cfg_attr(not(test), no_std)]

pub mod atomic;
pub mod config;
pub mod console;
pub mod hal;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod ring_buffer;
pub mod uart;

pub use atomic::{InterruptControl, InterruptFlag, InterruptGuard};
pub use config::UartConfig;
pub use console::{Console, LineEditor};
pub use hal::{RxFrame, UartHardware};
pub use log_globals::CONSOLE_LOG_STREAM;
pub use ring_buffer::RingBuffer;
pub use uart::{RxByte, SerialPort, UartError, UartTransport};
