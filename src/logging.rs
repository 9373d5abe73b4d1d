//! Deferred logging for the monitor.
//!
//! Log records are formatted into a fixed ring and drained later, so
//! the console task never blocks on log output and diagnostics are not
//! interleaved with the prompt:
//!
//! ```text
//! log::warn!() ──▶ [L0][L1][L2] ──▶ drain_into() ──▶ UART TX
//!                   lock-free        idle task
//!                   ring buffer      blocking ok
//! ```
//!
//! # Rules
//!
//! - Push never blocks; messages are dropped if the ring is full and
//!   counted in `dropped`
//! - Single producer (the console task), single consumer (the drain)
//! - Only load/store atomics; the Cortex-M0 has no CAS

use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 32;

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// System tick count at push time.
    pub ticks: u32,
    /// Log level.
    pub level: Level,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        ticks: 0,
        level: Level::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };
}

/// Lock-free SPSC ring of log entries.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: Single producer, single consumer, atomic coordination,
// same discipline as the serial byte queues.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: u32 = N as u32 - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry. Producer side only; never blocks.
    ///
    /// Returns `true` if the message was queued, `false` if dropped.
    pub fn push(&self, ticks: u32, level: Level, msg: &[u8]) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            let dropped = self.dropped.load(Ordering::Relaxed);
            self.dropped.store(dropped.wrapping_add(1), Ordering::Relaxed);
            return false;
        }

        // SAFETY: Single producer; slot is unpublished until the
        // Release store below.
        unsafe {
            let entry = &mut (*self.entries.get())[(write & Self::MASK) as usize];
            entry.ticks = ticks;
            entry.level = level;
            entry.len = msg.len().min(MAX_MSG_LEN) as u8;
            entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Drain the next log entry. Consumer side only.
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: Single consumer; the slot was published by the
        // producer's Release store observed above.
        let entry = unsafe { (*self.entries.get())[(read & Self::MASK) as usize] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Count of messages dropped because the ring was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset the dropped counter (e.g. after reporting).
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Number of entries waiting to be drained.
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer. Returns the number of bytes written;
/// overlong output is truncated.
pub fn format_to_buffer(buf: &mut [u8], args: fmt::Arguments<'_>) -> usize {
    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl fmt::Write for BufWriter<'_> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = fmt::write(&mut writer, args);
    writer.pos
}

/// `log` facade adapter over a [`LogStream`].
///
/// Timestamps come from a tick counter the board's timer hook advances
/// via [`RingLogger::set_ticks`].
pub struct RingLogger {
    stream: LogStream<LOG_BUFFER_SIZE>,
    ticks: AtomicU32,
}

impl RingLogger {
    pub const fn new() -> Self {
        Self {
            stream: LogStream::new(),
            ticks: AtomicU32::new(0),
        }
    }

    /// Install this logger as the global `log` sink.
    ///
    /// # Safety
    ///
    /// Must be called once, before any other context can log; only the
    /// racy setter is available without CAS.
    pub unsafe fn init(&'static self, level: LevelFilter) {
        let _ = log::set_logger_racy(self);
        log::set_max_level_racy(level);
    }

    /// Update the timestamp source. Called from the board's timer hook.
    pub fn set_ticks(&self, ticks: u32) {
        self.ticks.store(ticks, Ordering::Relaxed);
    }

    /// Drain all buffered entries into `out`, formatted as
    /// `[   ticks] LEVEL: message`.
    pub fn drain_into(&self, out: &mut dyn fmt::Write) {
        while let Some(entry) = self.stream.drain() {
            let _ = write!(
                out,
                "[{:8}] {}: {}\r\n",
                entry.ticks,
                entry.level,
                core::str::from_utf8(&entry.msg[..entry.len as usize]).unwrap_or("<invalid utf8>")
            );
        }

        let dropped = self.stream.dropped();
        if dropped > 0 {
            let _ = write!(
                out,
                "[{:8}] WARN: {} log messages dropped\r\n",
                self.ticks.load(Ordering::Relaxed),
                dropped
            );
            self.stream.reset_dropped();
        }
    }

    /// Entries waiting to be drained.
    pub fn pending(&self) -> u32 {
        self.stream.pending()
    }
}

impl Log for RingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = format_to_buffer(&mut buf, *record.args());
        self.stream
            .push(self.ticks.load(Ordering::Relaxed), record.level(), &buf[..len]);
    }

    fn flush(&self) {}
}
