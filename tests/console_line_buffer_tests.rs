//! Line buffer tests

use uart_line_console::console::line_buffer::LineBuffer;

/// Type `text` at the end of the line, as the editor does one key at a time.
fn type_in<const L: usize>(buf: &mut LineBuffer<L>, text: &str) {
    for &c in text.as_bytes() {
        buf.push(c);
    }
}

#[test]
fn test_line_buffer_push() {
    let mut buf: LineBuffer = LineBuffer::new();

    buf.push(b'h');
    buf.push(b'e');
    buf.push(b'l');
    buf.push(b'p');

    assert_eq!(buf.as_str(), "help");
    assert_eq!(buf.as_bytes_with_nul(), b"help\0");
}

#[test]
fn test_line_buffer_remove() {
    let mut buf: LineBuffer = LineBuffer::new();
    type_in(&mut buf, "help");

    assert_eq!(buf.remove(3), Some(b'p'));
    assert_eq!(buf.remove(0), Some(b'h'));

    assert_eq!(buf.as_str(), "el");
    assert_eq!(buf.as_bytes_with_nul(), b"el\0");
}

#[test]
fn test_line_buffer_remove_past_end() {
    let mut buf: LineBuffer = LineBuffer::new();

    assert_eq!(buf.remove(0), None); // should not panic
    type_in(&mut buf, "ab");
    assert_eq!(buf.remove(2), None);
    assert_eq!(buf.as_str(), "ab");
}

#[test]
fn test_line_buffer_insert_middle() {
    let mut buf: LineBuffer = LineBuffer::new();
    type_in(&mut buf, "hllo");

    assert!(buf.insert(1, b'e'));
    assert_eq!(buf.as_str(), "hello");
    assert!(!buf.insert(9, b'!'), "insert past the end is rejected");
}

#[test]
fn test_line_buffer_clear() {
    let mut buf: LineBuffer = LineBuffer::new();

    type_in(&mut buf, "help");
    buf.clear();

    assert_eq!(buf.as_str(), "");
    assert!(buf.is_empty());
}

#[test]
fn test_line_buffer_tail() {
    let mut buf: LineBuffer = LineBuffer::new();
    type_in(&mut buf, "hello world");

    assert_eq!(buf.tail_str(6), "world");
    assert_eq!(buf.tail_str(11), "");
    assert_eq!(buf.tail_str(40), "");
}

#[test]
fn test_line_buffer_overflow() {
    let mut buf: LineBuffer = LineBuffer::new();

    // Push 70 characters (buffer is 64 with the NUL)
    for i in 0..70u8 {
        buf.push(b'a' + (i % 26));
    }

    assert_eq!(buf.len(), 63);
    assert!(buf.is_full());
    assert!(!buf.push(b'z'));
}

#[test]
fn test_line_buffer_small_capacity() {
    let mut buf = LineBuffer::<4>::new();
    type_in(&mut buf, "abcdef");

    assert_eq!(LineBuffer::<4>::capacity(), 3);
    assert_eq!(buf.as_str(), "abc");
}
