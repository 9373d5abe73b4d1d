//! Line buffer tests

use lpc1114_monitor::console::line_buffer::{LineBuffer, LINE_SIZE};

#[test]
fn test_line_buffer_push() {
    let mut buf = LineBuffer::new();

    assert!(buf.push(b'h'));
    assert!(buf.push(b'e'));
    assert!(buf.push(b'l'));
    assert!(buf.push(b'p'));

    assert_eq!(buf.as_str(), "help");
    assert_eq!(buf.len(), 4);
}

#[test]
fn test_line_buffer_backspace() {
    let mut buf = LineBuffer::new();

    buf.set("help");
    assert!(buf.backspace());
    assert!(buf.backspace());

    assert_eq!(buf.as_str(), "he");
}

#[test]
fn test_line_buffer_backspace_empty() {
    let mut buf = LineBuffer::new();

    assert!(!buf.backspace());
    assert_eq!(buf.as_str(), "");
}

#[test]
fn test_line_buffer_clear() {
    let mut buf = LineBuffer::new();

    buf.set("help");
    buf.clear();

    assert_eq!(buf.as_str(), "");
    assert!(buf.is_empty());
}

#[test]
fn test_line_buffer_set_from_str() {
    let mut buf = LineBuffer::new();

    buf.set("dump 1000 20");
    assert_eq!(buf.as_str(), "dump 1000 20");
}

#[test]
fn test_line_buffer_set_truncates() {
    let mut buf = LineBuffer::new();

    let long: String = "a".repeat(LINE_SIZE + 10);
    buf.set(&long);

    assert_eq!(buf.len(), LINE_SIZE);
    assert!(buf.is_full());
}

#[test]
fn test_line_buffer_rejects_overflow() {
    let mut buf = LineBuffer::new();

    for i in 0..LINE_SIZE as u8 {
        assert!(buf.push(b'a' + (i % 26)));
    }

    // 65th character does not fit and does not change the buffer
    assert!(!buf.push(b'z'));
    assert_eq!(buf.len(), LINE_SIZE);
    assert!(buf.is_full());
}
