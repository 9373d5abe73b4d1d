//! # lpc1114-monitor
//!
//! Serial command monitor core for the Olimex LPC-P1114 board.
//!
//! ## Architecture
//!
//! The UART interrupt and the console task share nothing but two
//! bounded byte queues and a single error flag:
//!
//! ```text
//! UART IRQ ──▶ SerialChannel ──▶ SerialPort ──▶ Console
//!              (lock-free)       (blocking)     (task)
//! ```
//!
//! Board bring-up (clocks, pin muxing, LEDs, RTOS start) stays in the
//! board crate and drives this core through the [`hal`] traits: the IRQ
//! entry calls [`SerialChannel::on_interrupt`], a console task calls
//! [`Console::run`], which returns when the user issues `exit`.
//!
//! [`SerialChannel::on_interrupt`]: serial::SerialChannel::on_interrupt
//! [`Console::run`]: console::Console::run

#![cfg_attr(not(test), no_std)]

pub mod console;
pub mod hal;
pub mod logging;
pub mod serial;
pub mod transport;

pub use console::{Console, ConsoleError};
pub use hal::{SerialHal, SystemCtl, UartRegs};
pub use logging::RingLogger;
pub use serial::{ByteQueue, SerialChannel, SerialPort};
pub use transport::{ByteTransport, RxError, Timeout, TransportWriter};
