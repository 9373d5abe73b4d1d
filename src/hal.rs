//! Hardware seams the monitor core is driven through.
//!
//! Board bring-up (clocks, pin muxing, LEDs, RTOS start, the UART IRQ
//! entry) lives in the board crate. The core only sees these traits;
//! business logic stays in the core modules, the HAL is just I/O.

use core::fmt;

/// Register-level UART operations used by the interrupt service path.
///
/// Implemented over the LPC1114 USART block on hardware; tests drive
/// [`SerialChannel::on_interrupt`] with a fake.
///
/// [`SerialChannel::on_interrupt`]: crate::serial::SerialChannel::on_interrupt
pub trait UartRegs {
    /// Transmit holding register empty: ready to accept a byte.
    fn tx_ready(&self) -> bool;

    /// At least one received byte is waiting in the FIFO.
    fn rx_ready(&self) -> bool;

    /// Pop one byte from the receive FIFO.
    fn read_byte(&mut self) -> u8;

    /// Push one byte into the transmit holding register.
    fn write_byte(&mut self, byte: u8);

    /// A line-status error (overrun, framing, parity) latched since the
    /// last call. Reading clears the latch.
    fn line_error(&mut self) -> bool;

    /// Stop the transmit-ready interrupt from firing.
    fn disable_tx_irq(&mut self);
}

/// Task-side serial services: interrupt arming and time.
pub trait SerialHal {
    /// Arm the transmit-ready interrupt after queueing outgoing bytes.
    fn enable_tx_irq(&mut self);

    /// Current system tick count. Wraps.
    fn now_ticks(&self) -> u32;

    /// Called between receive polls while waiting for data. WFI on
    /// hardware, a yield in tests.
    fn idle(&mut self);
}

/// System services exposed to command handlers.
pub trait SystemCtl {
    /// Seconds since boot.
    fn uptime_seconds(&self) -> u32;

    /// Free heap bytes as reported by the allocator.
    fn free_heap_bytes(&self) -> usize;

    /// Core clock frequency in Hz.
    fn core_clock_hz(&self) -> u32;

    /// Write per-task run-time statistics, one task per line.
    fn run_time_stats(&mut self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Write the scheduler task list, one task per line.
    fn task_list(&mut self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Read one byte of the address space; used by the memory dump
    /// command. A volatile read on hardware.
    fn peek(&self, addr: usize) -> u8;

    /// Request a hardware reset. Does not return on real hardware.
    fn reset(&mut self);
}
