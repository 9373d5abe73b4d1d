//! Byte-transport contract between the console and the serial driver.
//!
//! The console core never touches UART registers. It runs on whatever
//! implements [`ByteTransport`]: the interrupt-driven [`SerialPort`] on
//! hardware, scripted fakes in tests.
//!
//! [`SerialPort`]: crate::serial::SerialPort

use core::fmt;

/// How long a receive call may wait for a byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timeout {
    /// Return immediately if no byte is pending.
    Poll,
    /// Wait up to this many system ticks.
    Ticks(u32),
    /// Wait until a byte or a hardware error arrives.
    Forever,
}

/// Receive-side failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxError {
    /// No byte arrived within the allowed time.
    Timeout,
    /// The UART latched a line-status error since the last read.
    Hardware,
}

/// Bidirectional raw byte stream the console runs on.
pub trait ByteTransport {
    /// Receive one byte, waiting at most `timeout`.
    fn receive(&mut self, timeout: Timeout) -> Result<u8, RxError>;

    /// Queue bytes for transmission.
    ///
    /// Stops at the first full-queue condition and returns how many
    /// bytes were actually queued. The caller does not retry the rest.
    fn send(&mut self, bytes: &[u8]) -> usize;

    /// Number of received bytes waiting to be read.
    fn pending(&self) -> usize;
}

/// `core::fmt::Write` adapter over a transport.
///
/// Output that does not fit the TX queue is dropped, matching the
/// fail-fast `send` contract.
pub struct TransportWriter<'a>(pub &'a mut dyn ByteTransport);

impl fmt::Write for TransportWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let _ = self.0.send(s.as_bytes());
        Ok(())
    }
}
