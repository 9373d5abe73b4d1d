//! Command line parser.
//!
//! Splits a finished line into the command name and up to 10 argument
//! tokens. Tokens are borrowed subslices of the line buffer, so nothing
//! is copied and the buffer is never mutated; they stay valid until the
//! buffer goes out of scope at the end of the loop iteration.

use heapless::Vec;

/// Maximum number of parameters on the command line.
pub const MAX_ARGS: usize = 10;

/// A parsed command line.
#[derive(Debug)]
pub struct ParsedLine<'a> {
    /// The command name: everything before the first space. Not
    /// trimmed, so a line starting with a space yields an empty,
    /// unmatchable command.
    pub command: &'a str,
    /// Argument tokens, at most [`MAX_ARGS`]; the excess is silently
    /// discarded.
    pub args: Vec<&'a str, MAX_ARGS>,
}

impl<'a> ParsedLine<'a> {
    /// Number of arguments.
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    /// Get argument by index (0-based).
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied()
    }
}

/// Parse a line into command name and arguments.
///
/// Arguments split on runs of spaces; a double-quoted group (`"..."`)
/// forms one token with its spaces kept and its quotes removed. There
/// is no escaping of embedded quotes; an unterminated quote runs to the
/// end of the line.
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest),
        None => (line, ""),
    };

    let mut args = Vec::new();
    let bytes = rest.as_bytes();
    let mut i = 0;

    while i < bytes.len() && !args.is_full() {
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let token = if bytes[i] == b'"' {
            i += 1;
            let start = i;
            while i < bytes.len() && bytes[i] != b'"' {
                i += 1;
            }
            let end = i;
            if i < bytes.len() {
                i += 1; // closing quote
            }
            &rest[start..end]
        } else {
            let start = i;
            while i < bytes.len() && bytes[i] != b' ' {
                i += 1;
            }
            &rest[start..i]
        };

        // Capacity checked by the loop guard
        let _ = args.push(token);
    }

    ParsedLine { command, args }
}
