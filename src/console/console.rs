//! The console loop: prompt, read, parse, dispatch, report.

use core::fmt::Write;

use crate::hal::SystemCtl;
use crate::transport::{ByteTransport, RxError, Timeout, TransportWriter};

use super::commands::dispatch;
use super::error::ConsoleError;
use super::history::History;
use super::parser::parse_line;
use super::reader::{read_line, ReadResult};

/// The prompt string.
pub const PROMPT: &str = ": ";

/// Everything a command handler may touch, bundled so handlers never
/// reach for globals: the transport for I/O, the system services, and
/// the session echo flag.
pub struct CommandCtx<'a> {
    pub transport: &'a mut dyn ByteTransport,
    pub system: &'a mut dyn SystemCtl,
    pub echo: &'a mut bool,
}

impl CommandCtx<'_> {
    /// Read one raw byte, blocking. Used for single-key confirmations.
    pub fn read_char(&mut self) -> Result<u8, ConsoleError> {
        self.transport.receive(Timeout::Forever).map_err(|e| match e {
            RxError::Hardware => ConsoleError::HardwareError,
            RxError::Timeout => ConsoleError::Internal,
        })
    }
}

/// The interactive serial console.
///
/// Owns the session state (history, echo); the transport and system
/// services are injected. [`Console::run`] blocks until the user issues
/// `exit` and may be called again afterwards; each run starts with
/// echo back at its default.
pub struct Console<'a, T: ByteTransport, S: SystemCtl> {
    transport: &'a mut T,
    system: &'a mut S,
    history: History,
    echo: bool,
}

impl<'a, T: ByteTransport, S: SystemCtl> Console<'a, T, S> {
    pub fn new(transport: &'a mut T, system: &'a mut S) -> Self {
        Self {
            transport,
            system,
            history: History::new(),
            echo: true,
        }
    }

    /// Run the console until an exit command.
    pub fn run(&mut self) {
        self.echo = true; // set echo

        log::debug!("console started");

        {
            let mut out = TransportWriter(&mut *self.transport);
            let _ = write!(
                out,
                "Type \"help\" for the list of available commands\r\n{}",
                PROMPT
            );
        }

        loop {
            let result = read_line(
                &mut *self.transport,
                &mut self.history,
                Some(PROMPT),
                self.echo,
                true,
            );

            let mut out = TransportWriter(&mut *self.transport);

            let line = match result {
                ReadResult::Overflow => {
                    let _ = write!(out, "\rERROR {}\r\n{}", ConsoleError::LineTooLong.code(), PROMPT);
                    continue;
                }
                ReadResult::Hardware => {
                    log::warn!("uart line error during read");
                    let _ = write!(out, "ERROR {}\r\n{}", ConsoleError::HardwareError.code(), PROMPT);
                    continue;
                }
                ReadResult::Cancelled => {
                    // Silent reprompt, no message
                    let _ = write!(out, "\r\n{}", PROMPT);
                    continue;
                }
                ReadResult::Line(line) => line,
            };

            if line.is_empty() {
                let _ = write!(out, "\r\n{}", PROMPT);
                continue;
            }

            let parsed = parse_line(line.as_str());

            let mut ctx = CommandCtx {
                transport: &mut *self.transport,
                system: &mut *self.system,
                echo: &mut self.echo,
            };

            match dispatch(&mut ctx, &parsed) {
                Ok(()) => {
                    let mut out = TransportWriter(&mut *self.transport);
                    let _ = write!(out, "{}", PROMPT);
                }
                Err(ConsoleError::ExitCommand) => {
                    log::debug!("console exited");
                    return;
                }
                Err(ConsoleError::Cancel) => {
                    let mut out = TransportWriter(&mut *self.transport);
                    let _ = write!(out, "{}", PROMPT);
                }
                Err(error) => {
                    let mut out = TransportWriter(&mut *self.transport);
                    let _ = write!(out, "ERROR {}\r\n{}", error.code(), PROMPT);
                }
            }
        }
    }
}
