//! End-to-end console sessions over the mock UART

mod common;

use common::{drain_tx, receive, Transport};
use uart_line_console::console::console::PROMPT;
use uart_line_console::console::{Console, ConsoleError};
use uart_line_console::hal::RxFrame;

fn session() -> (Transport<64, 1024>, Console) {
    (common::transport(), Console::new())
}

#[test]
fn test_hello_round_trip() {
    let (t, mut console) = session();

    receive(&t, b"hello\r");
    assert_eq!(console.poll(&t), Some(Ok(())));
    drain_tx(&t);

    assert_eq!(t.hardware().sent_string(), format!("hello\r\nHello, World!\r\n{}", PROMPT));
}

#[test]
fn test_partial_line_waits() {
    let (t, mut console) = session();

    receive(&t, b"hel");
    assert_eq!(console.poll(&t), None);
    assert_eq!(console.poll(&t), None);

    receive(&t, b"lo\r");
    assert_eq!(console.poll(&t), Some(Ok(())));
    drain_tx(&t);
    assert!(t.hardware().sent_string().contains("Hello, World!"));
}

#[test]
fn test_one_line_per_poll() {
    let (t, mut console) = session();

    receive(&t, b"hello\rfoo\r");

    assert_eq!(console.poll(&t), Some(Ok(())));
    assert_eq!(console.poll(&t), Some(Err(ConsoleError::UnknownCommand)));
    assert_eq!(console.poll(&t), None);

    drain_tx(&t);
    let wire = t.hardware().sent_string();
    assert!(wire.contains("foo\r\nE01: invalid command\r\n"));
    assert!(wire.ends_with(PROMPT));
}

#[test]
fn test_blank_line_reports_missing_command() {
    let (t, mut console) = session();

    receive(&t, b"   \r");
    assert_eq!(console.poll(&t), Some(Err(ConsoleError::MissingCommand)));

    drain_tx(&t);
    assert!(t.hardware().sent_string().contains("E02: missing command"));
}

#[test]
fn test_edited_line_dispatches_final_text() {
    let (t, mut console) = session();

    // "helo", cursor left, insert 'l'
    receive(&t, b"helo\x1b[Dl\r");
    assert_eq!(console.poll(&t), Some(Ok(())));

    // Backspace via DEL
    receive(&t, b"hellx\x7fo\r");
    assert_eq!(console.poll(&t), Some(Ok(())));

    drain_tx(&t);
    assert_eq!(t.hardware().sent_string().matches("Hello, World!").count(), 2);
}

#[test]
fn test_help_lists_commands() {
    let (t, mut console) = session();

    receive(&t, b"help\r");
    assert_eq!(console.poll(&t), Some(Ok(())));
    drain_tx(&t);

    let wire = t.hardware().sent_string();
    for name in uart_line_console::console::command_names() {
        assert!(wire.contains(name), "help output should list '{}'", name);
    }
}

#[test]
fn test_line_fault_does_not_drop_byte() {
    let (t, mut console) = session();

    receive(&t, b"hell");
    t.hardware().inject(RxFrame {
        byte: b'o',
        frame_error: true,
        overrun: false,
    });
    t.on_receive();
    receive(&t, b"\r");

    assert_eq!(console.poll(&t), Some(Ok(())));
    assert_eq!(t.last_error(), None, "error was handed out with the byte");
}

#[test]
fn test_banner_ends_with_prompt() {
    let (t, console) = session();

    console.print_banner(&mut t.writer());
    drain_tx(&t);

    let wire = t.hardware().sent_string();
    assert!(wire.contains(uart_line_console::console::commands::VERSION));
    assert!(wire.ends_with(PROMPT));
}

#[test]
fn test_crlf_is_one_terminator() {
    let (t, mut console) = session();

    receive(&t, b"hello\r\n");
    assert_eq!(console.poll(&t), Some(Ok(())));
    assert_eq!(console.poll(&t), None, "LF after CR is not a second line");

    // A lone LF still terminates
    receive(&t, b"hello\n");
    assert_eq!(console.poll(&t), Some(Ok(())));
}
