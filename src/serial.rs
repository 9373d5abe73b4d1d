//! Interrupt-driven serial transport.
//!
//! Two bounded byte queues bridge the UART interrupt and the console
//! task; they are the only genuinely shared mutable state in the
//! system:
//!
//! ```text
//! UART IRQ ──▶ rx queue ──▶ console task
//! UART IRQ ◀── tx queue ◀── console task
//! ```
//!
//! # Rules
//!
//! - Each queue is single-producer/single-consumer: RX is pushed only
//!   from the interrupt and popped only from the task, TX the reverse.
//! - The interrupt path never blocks and never allocates.
//! - Only load/store atomics are used; the Cortex-M0 has no CAS.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::hal::{SerialHal, UartRegs};
use crate::transport::{ByteTransport, RxError, Timeout};

/// Serial queue depth per direction.
pub const QUEUE_SIZE: usize = 64;

/// Bounded SPSC byte queue.
///
/// # Safety
///
/// This type uses `UnsafeCell` internally but is safe to use because:
/// - Exactly one producer calls `push`, exactly one consumer calls
///   `pop` (enforced by design, not by the type system)
/// - Indices are monotonically increasing and wrap via mask
/// - All coordination through atomic load/store
///
/// # Memory Ordering
///
/// - Producer publishes a slot with a `Release` store of `write_idx`
/// - Consumer observes it with an `Acquire` load
/// - The mirrored pair on `read_idx` publishes freed slots
pub struct ByteQueue<const N: usize = QUEUE_SIZE> {
    /// Ring buffer of bytes.
    slots: UnsafeCell<[u8; N]>,

    /// Next write index (monotonically increasing, wraps via mask).
    write_idx: AtomicU32,

    /// Next read index (monotonically increasing, wraps via mask).
    read_idx: AtomicU32,
}

// SAFETY: Single producer, single consumer, atomic coordination.
// No mutable aliasing possible within the rules above.
unsafe impl<const N: usize> Sync for ByteQueue<N> {}
unsafe impl<const N: usize> Send for ByteQueue<N> {}

impl<const N: usize> ByteQueue<N> {
    /// Mask for wrapping an index to the buffer size.
    /// N must be a power of 2.
    const MASK: u32 = N as u32 - 1;

    /// Create a new empty queue.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Queue size must be power of 2");

        Self {
            slots: UnsafeCell::new([0u8; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
        }
    }

    /// Push a byte. Producer side only.
    ///
    /// Returns `false` if the queue is full; the byte is dropped.
    #[inline]
    pub fn push(&self, byte: u8) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            return false;
        }

        // SAFETY: Single producer; this slot stays outside the readable
        // window until write_idx is published below.
        unsafe {
            (*self.slots.get())[(write & Self::MASK) as usize] = byte;
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Pop a byte. Consumer side only.
    #[inline]
    pub fn pop(&self) -> Option<u8> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: Single consumer; the slot was published by the
        // producer's Release store observed above.
        let byte = unsafe { (*self.slots.get())[(read & Self::MASK) as usize] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Number of bytes currently queued.
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.write_idx.load(Ordering::Acquire);
        let read = self.read_idx.load(Ordering::Acquire);
        write.wrapping_sub(read) as usize
    }

    /// Check if the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the queue capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The shared half of the serial port: both queues plus the
/// hardware-error flag. Lives in a `static` so the UART interrupt can
/// reach it.
pub struct SerialChannel {
    rx: ByteQueue<QUEUE_SIZE>,
    tx: ByteQueue<QUEUE_SIZE>,

    /// Set by the interrupt on a line-status error, cleared by the task
    /// on the next read. Single writer, single reader; a missed or
    /// duplicated observation affects only error reporting, never data,
    /// so plain load/store is enough.
    line_error: AtomicBool,
}

impl SerialChannel {
    /// Create an idle channel.
    pub const fn new() -> Self {
        Self {
            rx: ByteQueue::new(),
            tx: ByteQueue::new(),
            line_error: AtomicBool::new(false),
        }
    }

    /// Service one UART interrupt. Interrupt context only.
    ///
    /// Transmit side: if the holding register is ready, send one queued
    /// byte; with nothing queued, disarm the transmit interrupt.
    /// Receive side: drain every ready byte into the RX queue. A full
    /// RX queue drops incoming bytes silently.
    pub fn on_interrupt(&self, uart: &mut dyn UartRegs) {
        if uart.tx_ready() {
            match self.tx.pop() {
                Some(byte) => uart.write_byte(byte),
                None => uart.disable_tx_irq(),
            }
        }

        while uart.rx_ready() {
            let byte = uart.read_byte();
            let _ = self.rx.push(byte);
        }

        if uart.line_error() {
            self.line_error.store(true, Ordering::Release);
        }
    }

    /// Pop one received byte. Task context only.
    #[inline]
    pub fn pop_rx(&self) -> Option<u8> {
        self.rx.pop()
    }

    /// Queue one byte for transmission. Task context only.
    #[inline]
    pub fn push_tx(&self, byte: u8) -> bool {
        self.tx.push(byte)
    }

    /// Received bytes waiting to be read.
    #[inline]
    pub fn rx_pending(&self) -> usize {
        self.rx.len()
    }

    /// Bytes waiting to go out.
    #[inline]
    pub fn tx_pending(&self) -> usize {
        self.tx.len()
    }

    /// Check-and-clear the line-error flag. Task context only.
    #[inline]
    pub fn take_line_error(&self) -> bool {
        if self.line_error.load(Ordering::Acquire) {
            self.line_error.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }
}

impl Default for SerialChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Task-side view of a [`SerialChannel`]: the blocking [`ByteTransport`]
/// the console runs on.
pub struct SerialPort<'a, H: SerialHal> {
    channel: &'a SerialChannel,
    hal: H,
}

impl<'a, H: SerialHal> SerialPort<'a, H> {
    pub fn new(channel: &'a SerialChannel, hal: H) -> Self {
        Self { channel, hal }
    }
}

impl<H: SerialHal> ByteTransport for SerialPort<'_, H> {
    /// Receive one byte.
    ///
    /// A pending line error is reported before any queued byte, so the
    /// byte stays queued and is delivered on the next call.
    fn receive(&mut self, timeout: Timeout) -> Result<u8, RxError> {
        let start = self.hal.now_ticks();

        loop {
            if self.channel.take_line_error() {
                return Err(RxError::Hardware);
            }
            if let Some(byte) = self.channel.pop_rx() {
                return Ok(byte);
            }

            match timeout {
                Timeout::Poll => return Err(RxError::Timeout),
                Timeout::Ticks(max) => {
                    if self.hal.now_ticks().wrapping_sub(start) >= max {
                        return Err(RxError::Timeout);
                    }
                }
                Timeout::Forever => {}
            }

            self.hal.idle();
        }
    }

    fn send(&mut self, bytes: &[u8]) -> usize {
        let mut count = 0;
        for &byte in bytes {
            if !self.channel.push_tx(byte) {
                break;
            }
            count += 1;
        }
        if count > 0 {
            self.hal.enable_tx_irq();
        }
        count
    }

    fn pending(&self) -> usize {
        self.channel.rx_pending()
    }
}
