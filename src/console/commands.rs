//! Command table and handlers.

use core::fmt::Write;

use crate::transport::TransportWriter;

use super::console::CommandCtx;
use super::error::ConsoleError;
use super::parser::ParsedLine;

/// Platform identity reported by `ver` (from the board support data).
pub const PLATFORM_NAME: &str = "LPC1114";
pub const HW_MODEL: &str = "Olimex LPC-P1114";
pub const HW_VERSION: &str = "A";
pub const COPYRIGHT: &str = "(c) 2015 Lixco Microsystems";

/// Version string (set by build.rs, includes git hash).
pub const VERSION: &str = env!("VERSION_STRING");

/// Build date (set by build.rs).
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Command descriptor: an entry in the static command table.
pub struct CommandDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: fn(&mut CommandCtx<'_>, &ParsedLine<'_>) -> Result<(), ConsoleError>,
}

/// The command table. Linearly scanned, first match wins.
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "ver",
        help: "Show version and other system parameters",
        handler: cmd_ver,
    },
    CommandDescriptor {
        name: "echo",
        help: "Set/unset echo",
        handler: cmd_echo,
    },
    CommandDescriptor {
        name: "sys",
        help: "Show scheduler statistics",
        handler: cmd_sys,
    },
    CommandDescriptor {
        name: "dump",
        help: "Dump a memory zone",
        handler: cmd_dump,
    },
    CommandDescriptor {
        name: "exit",
        help: "Exit monitor",
        handler: cmd_exit,
    },
    CommandDescriptor {
        name: "reboot",
        help: "Reboot the system",
        handler: cmd_reboot,
    },
    CommandDescriptor {
        name: "help",
        help: "Show this help panel; for individual command help, use <command> -h",
        handler: cmd_help,
    },
];

/// Execute a parsed command. Exact, case-sensitive name match.
pub fn dispatch(ctx: &mut CommandCtx<'_>, cmd: &ParsedLine<'_>) -> Result<(), ConsoleError> {
    let entry = COMMANDS
        .iter()
        .find(|c| c.name == cmd.command)
        .ok_or(ConsoleError::CommandNotFound)?;

    (entry.handler)(ctx, cmd)
}

// --- Command Implementations ---

fn cmd_ver(ctx: &mut CommandCtx<'_>, _cmd: &ParsedLine<'_>) -> Result<(), ConsoleError> {
    let clock_mhz = ctx.system.core_clock_hz() / 1_000_000;
    let mut out = TransportWriter(&mut *ctx.transport);

    let _ = write!(out, "{} firmware, ver. {}\r\n", PLATFORM_NAME, VERSION);
    let _ = write!(out, "Build on {}\r\n", BUILD_DATE);
    let _ = write!(out, "Hardware {} rev. {}\r\n", HW_MODEL, HW_VERSION);
    let _ = write!(out, "Core clock {} MHz\r\n", clock_mhz);
    let _ = write!(out, "{}\r\n", COPYRIGHT);
    Ok(())
}

fn cmd_echo(ctx: &mut CommandCtx<'_>, cmd: &ParsedLine<'_>) -> Result<(), ConsoleError> {
    if cmd.argc() == 0 {
        let state = if *ctx.echo { "on" } else { "off" };
        let mut out = TransportWriter(&mut *ctx.transport);
        let _ = write!(out, "Echo is {}\r\n", state);
    } else if cmd.argc() > 1 || cmd.arg(0) == Some("-h") {
        let mut out = TransportWriter(&mut *ctx.transport);
        let _ = write!(out, "Usage: echo {{on|off}}\r\n");
    } else {
        match cmd.arg(0) {
            Some("on") => *ctx.echo = true,
            Some("off") => *ctx.echo = false,
            _ => return Err(ConsoleError::InvalidParam),
        }
    }
    Ok(())
}

fn cmd_sys(ctx: &mut CommandCtx<'_>, cmd: &ParsedLine<'_>) -> Result<(), ConsoleError> {
    if cmd.argc() != 0 {
        let mut out = TransportWriter(&mut *ctx.transport);
        let _ = write!(out, "Usage: sys\r\n");
        return Ok(());
    }

    let total_min = ctx.system.uptime_seconds() / 60; // don't need the seconds
    let mins = total_min % 60;
    let hours = total_min / 60;
    let heap_free = ctx.system.free_heap_bytes();

    let mut out = TransportWriter(&mut *ctx.transport);
    let _ = write!(out, "up {} days, {}:{}\r\n", hours / 24, hours % 24, mins);
    let _ = write!(out, "Heap: {} bytes free\r\n\n", heap_free);

    let _ = write!(out, "{:<16}{:<16}% Time\r\n", "Task", "Abs Time");
    ctx.system
        .run_time_stats(&mut out)
        .map_err(|_| ConsoleError::Internal)?;

    let _ = write!(out, "Task\t\tState\tPrio.\tStack\tID\r\n");
    ctx.system
        .task_list(&mut out)
        .map_err(|_| ConsoleError::Internal)?;

    Ok(())
}

fn cmd_dump(ctx: &mut CommandCtx<'_>, cmd: &ParsedLine<'_>) -> Result<(), ConsoleError> {
    if cmd.argc() == 0 || cmd.argc() > 2 || cmd.arg(0) == Some("-h") {
        let mut out = TransportWriter(&mut *ctx.transport);
        let _ = write!(out, "Usage: dump start [size]\r\n");
        return Ok(());
    }

    let mut start = parse_hex(cmd.arg(0).unwrap_or(""))?;

    let mut remaining = 0x100; // default if no second parameter
    if let Some(arg) = cmd.arg(1) {
        remaining = parse_hex(arg)?;
    }

    while remaining > 0 {
        let count = remaining.min(16);

        let mut out = TransportWriter(&mut *ctx.transport);
        let _ = write!(out, "{:06X}  ", start);

        for i in 0..count {
            let _ = write!(out, "{:02X} ", ctx.system.peek(start + i));
        }

        let _ = write!(out, "  ");
        for i in 0..count {
            let byte = ctx.system.peek(start + i);
            let shown = if (0x20..=0x7E).contains(&byte) {
                byte as char
            } else {
                '.'
            };
            let _ = out.write_char(shown);
        }
        let _ = write!(out, "\r\n");

        start += count;
        remaining -= count;
    }

    Ok(())
}

/// Parse a hex token, with or without a leading `0x`.
fn parse_hex(token: &str) -> Result<usize, ConsoleError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);

    usize::from_str_radix(digits, 16).map_err(|_| ConsoleError::InvalidParam)
}

fn cmd_exit(ctx: &mut CommandCtx<'_>, _cmd: &ParsedLine<'_>) -> Result<(), ConsoleError> {
    let mut out = TransportWriter(&mut *ctx.transport);
    let _ = write!(out, "Exiting...\r\n");
    Err(ConsoleError::ExitCommand)
}

fn cmd_reboot(ctx: &mut CommandCtx<'_>, cmd: &ParsedLine<'_>) -> Result<(), ConsoleError> {
    if cmd.argc() > 1 || cmd.arg(0) == Some("-h") {
        let mut out = TransportWriter(&mut *ctx.transport);
        let _ = write!(out, "Usage: reboot\r\n");
        return Ok(());
    }

    {
        let mut out = TransportWriter(&mut *ctx.transport);
        let _ = write!(out, "Are you sure? (y/n) ");
    }

    // Raw confirmation byte, no escape processing
    let answer = ctx.read_char()?;

    let mut out = TransportWriter(&mut *ctx.transport);
    let _ = write!(out, "{}\r\n", answer as char);

    if answer == b'y' {
        let _ = write!(out, "System will now restart\r\n");
        log::info!("reboot requested from console");
        ctx.system.reset();
    }

    Ok(())
}

fn cmd_help(ctx: &mut CommandCtx<'_>, _cmd: &ParsedLine<'_>) -> Result<(), ConsoleError> {
    let mut out = TransportWriter(&mut *ctx.transport);
    for entry in COMMANDS {
        let _ = write!(out, "  {:<8}{}\r\n", entry.name, entry.help);
    }
    Ok(())
}
