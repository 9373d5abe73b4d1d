//! Interactive serial command console.
//!
//! One blocking task, no heap - all static buffers. The console runs on
//! any [`ByteTransport`](crate::transport::ByteTransport) and reaches
//! the rest of the system only through the
//! [`SystemCtl`](crate::hal::SystemCtl) seam.

pub mod commands;
pub mod console;
pub mod error;
pub mod history;
pub mod line_buffer;
pub mod parser;
pub mod reader;

pub use commands::{dispatch, CommandDescriptor, COMMANDS, VERSION};
pub use console::{CommandCtx, Console, PROMPT};
pub use error::ConsoleError;
pub use history::{Direction, History, HistoryError, HISTORY_SIZE};
pub use line_buffer::{LineBuffer, LINE_SIZE};
pub use parser::{parse_line, ParsedLine, MAX_ARGS};
pub use reader::{read_line, ReadResult};
