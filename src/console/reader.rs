//! Line editor: escape-sequence recognition, echo, history recall.

use crate::transport::{ByteTransport, RxError, Timeout};

use super::history::{Direction, History, HistoryError};
use super::line_buffer::{LineBuffer, LINE_SIZE};

const CTRL_C: u8 = 0x03;
const BS: u8 = 0x08;
const ESC: u8 = 0x1B;

/// Erase-to-end-of-line, emitted when redrawing a recalled entry.
const ERASE_LINE: &[u8] = b"\x1b[K";

/// Cursor-right, the empty-buffer backspace acknowledgment: it undoes
/// the cursor movement of the backspace the terminal already echoed.
const CURSOR_RIGHT: &[u8] = b"\x1b[C";

/// Outcome of one [`read_line`] call.
#[derive(Debug)]
pub enum ReadResult {
    /// A complete line (possibly empty).
    Line(LineBuffer),
    /// The user hit Ctrl-C; the partial line is discarded.
    Cancelled,
    /// Input exceeded the line buffer. Everything up to the terminator
    /// was consumed; the truncated line went to history if requested.
    Overflow,
    /// The transport reported a hardware error.
    Hardware,
}

/// One logical input event after escape-sequence decoding.
enum InputEvent {
    Byte(u8),
    UpArrow,
    DownArrow,
}

/// Escape recognizer state.
#[derive(Clone, Copy, PartialEq)]
enum EscapeState {
    Idle,
    SawEsc,     // Got ESC
    SawBracket, // Got ESC [
}

/// Read the next logical event, echoing raw bytes as they arrive.
///
/// Bytes consumed by a recognized or attempted navigation sequence are
/// not echoed; a malformed sequence falls back to literal handling of
/// the offending byte (ESC itself stays swallowed).
fn next_event(transport: &mut dyn ByteTransport, echo: bool) -> Result<InputEvent, RxError> {
    let mut state = EscapeState::Idle;

    loop {
        let byte = transport.receive(Timeout::Forever)?;

        match state {
            EscapeState::Idle => {
                if byte == ESC {
                    state = EscapeState::SawEsc;
                    continue;
                }
            }
            EscapeState::SawEsc => {
                if byte == b'[' {
                    state = EscapeState::SawBracket;
                    continue;
                }
                state = EscapeState::Idle;
            }
            EscapeState::SawBracket => {
                state = EscapeState::Idle;
                match byte {
                    b'A' => return Ok(InputEvent::UpArrow),
                    b'B' => return Ok(InputEvent::DownArrow),
                    _ => {}
                }
            }
        }

        if echo {
            let _ = transport.send(&[byte]);
        }
        return Ok(InputEvent::Byte(byte));
    }
}

/// Get a whole line, end-of-line terminated, with echo.
///
/// `prompt` enables history recall: on up/down arrow the line is
/// erased, the prompt redrawn and the buffer replaced with the record
/// from the corresponding direction. Without a prompt the arrows are
/// consumed and ignored. With `store_history`, any non-cancelled,
/// non-empty line is stored on termination (truncated if overlong).
pub fn read_line(
    transport: &mut dyn ByteTransport,
    history: &mut History,
    prompt: Option<&str>,
    echo: bool,
    store_history: bool,
) -> ReadResult {
    let mut line = LineBuffer::new();
    let mut overflowed = false;

    let terminator = loop {
        let event = match next_event(transport, echo) {
            Ok(event) => event,
            Err(RxError::Hardware) => return ReadResult::Hardware,
            // Forever never times out; treat it as a spurious wakeup
            Err(RxError::Timeout) => continue,
        };

        match event {
            InputEvent::Byte(byte @ (b'\r' | b'\n')) => break byte,

            InputEvent::Byte(CTRL_C) => return ReadResult::Cancelled,

            InputEvent::UpArrow | InputEvent::DownArrow => {
                let Some(prompt) = prompt else { continue };

                let direction = match event {
                    InputEvent::UpArrow => Direction::Prev,
                    _ => Direction::Next,
                };

                let _ = transport.send(b"\r");
                let _ = transport.send(ERASE_LINE);
                let _ = transport.send(prompt.as_bytes());

                match history.navigate(direction) {
                    Ok(record) => line.set(record),
                    // No record in that direction: keep the line as-is
                    Err(HistoryError::NoRecord) => {}
                    Err(HistoryError::Corrupted) => {
                        log::warn!("history record failed checksum");
                    }
                }
                let _ = transport.send(line.as_bytes());
            }

            InputEvent::Byte(BS) => {
                // The terminal already echoed the backspace; either
                // finish the erase or push the cursor back right.
                if line.backspace() {
                    let _ = transport.send(b" \x08");
                } else {
                    let _ = transport.send(CURSOR_RIGHT);
                }
            }

            InputEvent::Byte(byte @ 0x20..=0x7E) => {
                if !line.push(byte) {
                    overflowed = true;
                }
            }

            // Other control bytes are consumed and ignored
            InputEvent::Byte(_) => {}
        }
    };

    // Complete the newline sequence, depending on what the host sent us
    if echo {
        match terminator {
            b'\r' => {
                let _ = transport.send(b"\n");
            }
            _ => {
                let _ = transport.send(b"\r");
            }
        }
    }

    if store_history && !line.is_empty() {
        history.put(line.as_str());
    }

    // A line that filled the buffer is over the limit even without a
    // 65th byte; the usable length is LINE_SIZE - 1.
    if overflowed || line.len() >= LINE_SIZE {
        return ReadResult::Overflow;
    }

    ReadResult::Line(line)
}
