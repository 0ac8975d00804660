use core::fmt;
use core::str;

use crate::constants::interrupts::{PIC_1_OFFSET, PIC_2_OFFSET};
use crate::constants::kernel::{LINE_BUF_LEN, NAME, TIMER_FREQUENCY_HZ, VERSION};
use crate::constants::vga::BUFFER_ADDR;
use crate::cpu::Cpu;
use crate::kernel::Kernel;
use crate::keyboard::{self, BACKSPACE};
use crate::port::PortIo;
use crate::{kprint, kprintln};

/// What the kernel loop does after a command has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Pulse the reset line; never returns.
    Reboot,
    /// Disable interrupts and stop; never returns.
    Halt,
}

/// Printed for any command token not in the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCommand<'a>(pub &'a str);

impl fmt::Display for UnknownCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command: {}", self.0)
    }
}

/// The line being typed. Lives for one shell iteration.
pub struct LineBuffer {
    buf: [u8; LINE_BUF_LEN],
    len: usize,
}

impl LineBuffer {
    pub const fn new() -> Self {
        LineBuffer {
            buf: [0; LINE_BUF_LEN],
            len: 0,
        }
    }

    /// `false` when the line is already full.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.len == LINE_BUF_LEN {
            return false;
        }
        self.buf[self.len] = byte;
        self.len += 1;
        true
    }

    /// `false` when there was nothing to remove.
    pub fn pop(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        self.len -= 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_str(&self) -> &str {
        str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        LineBuffer::new()
    }
}

pub fn prompt(kernel: &mut Kernel<'_>) {
    kprint!(kernel.console, "> ");
}

pub fn print_banner(kernel: &mut Kernel<'_>) {
    kprintln!(kernel.console, "{} kernel v{}", NAME, VERSION);
    kprintln!(kernel.console, "Type 'help' for available commands.");
}

/// Reads keys until Enter, echoing as it goes.
///
/// Bytes past the end of a full line are dropped without echo; backspace on
/// an empty line does nothing.
pub fn read_line(
    kernel: &mut Kernel<'_>,
    io: &mut impl PortIo,
    cpu: &mut impl Cpu,
    line: &mut LineBuffer,
) {
    let shared = kernel.shared;
    loop {
        let byte = keyboard::read_char(&shared.keyboard, cpu);
        match byte {
            b'\n' => {
                kernel.console.put_char(b'\n');
                kernel.console.sync_cursor(io);
                return;
            }
            BACKSPACE => {
                if line.pop() {
                    kernel.console.put_char(BACKSPACE);
                }
            }
            _ => {
                if line.push(byte) {
                    kernel.console.put_char(byte);
                }
            }
        }
        kernel.console.sync_cursor(io);
    }
}

/// Splits a line into the command token and the raw remainder after the
/// first space. `None` for a blank line.
pub fn tokenize(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start_matches(' ');
    if line.is_empty() {
        return None;
    }
    Some(line.split_once(' ').unwrap_or((line, "")))
}

/// Command function type
type CommandFn = fn(&mut Kernel<'_>, &str) -> Flow;

/// Command registry entry
struct Command {
    name: &'static str,
    aliases: &'static [&'static str],
    help: &'static str,
    func: CommandFn,
}

/// Command dispatch table - add new commands here
const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        aliases: &[],
        help: "Display this help message",
        func: cmd_help,
    },
    Command {
        name: "about",
        aliases: &[],
        help: "Show kernel identification",
        func: cmd_about,
    },
    Command {
        name: "cls",
        aliases: &["clear"],
        help: "Clear the screen",
        func: cmd_cls,
    },
    Command {
        name: "echo",
        aliases: &[],
        help: "Print the rest of the line",
        func: cmd_echo,
    },
    Command {
        name: "mem",
        aliases: &[],
        help: "Show fixed memory and vector locations",
        func: cmd_mem,
    },
    Command {
        name: "ticks",
        aliases: &[],
        help: "Show timer ticks since boot",
        func: cmd_ticks,
    },
    Command {
        name: "reboot",
        aliases: &[],
        help: "Reboot the system",
        func: cmd_reboot,
    },
    Command {
        name: "halt",
        aliases: &["quit"],
        help: "Stop the CPU",
        func: cmd_halt,
    },
];

/// Find command by name
fn find_command(name: &str) -> Option<&'static Command> {
    COMMANDS
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Runs one line. Blank lines are not dispatched.
pub fn execute(kernel: &mut Kernel<'_>, line: &str) -> Flow {
    let Some((name, args)) = tokenize(line) else {
        return Flow::Continue;
    };

    match find_command(name) {
        Some(cmd) => (cmd.func)(kernel, args),
        None => {
            log::debug!("shell: unknown command {:?}", name);
            kprintln!(kernel.console, "{}", UnknownCommand(name));
            Flow::Continue
        }
    }
}

// ============================================================================
// Command implementations
// ============================================================================

fn cmd_help(kernel: &mut Kernel<'_>, _args: &str) -> Flow {
    kprintln!(kernel.console, "Available commands:");
    for cmd in COMMANDS {
        match cmd.aliases {
            [] => kprintln!(kernel.console, "  {:<12} - {}", cmd.name, cmd.help),
            [alias, ..] => kprintln!(
                kernel.console,
                "  {:<12} - {} (also '{}')",
                cmd.name,
                cmd.help,
                alias
            ),
        }
    }
    Flow::Continue
}

fn cmd_about(kernel: &mut Kernel<'_>, _args: &str) -> Flow {
    print_banner(kernel);
    kprintln!(
        kernel.console,
        "Single-core, interrupt-driven; timer at {} Hz.",
        TIMER_FREQUENCY_HZ
    );
    Flow::Continue
}

fn cmd_cls(kernel: &mut Kernel<'_>, _args: &str) -> Flow {
    kernel.console.clear();
    Flow::Continue
}

fn cmd_echo(kernel: &mut Kernel<'_>, args: &str) -> Flow {
    kprintln!(kernel.console, "{}", args);
    Flow::Continue
}

fn cmd_mem(kernel: &mut Kernel<'_>, _args: &str) -> Flow {
    kprintln!(kernel.console, "vga text buffer : {:#010x}", BUFFER_ADDR);
    kprintln!(
        kernel.console,
        "irq vectors     : {:#04x}-{:#04x}",
        PIC_1_OFFSET,
        PIC_2_OFFSET + 7
    );
    kprintln!(kernel.console, "tick counter    : {:p}", &kernel.shared.ticks);
    kprintln!(kernel.console, "keyboard ring   : {:p}", &kernel.shared.keyboard);
    Flow::Continue
}

fn cmd_ticks(kernel: &mut Kernel<'_>, _args: &str) -> Flow {
    let ticks = kernel.shared.ticks.get();
    kprintln!(kernel.console, "{}", ticks);
    Flow::Continue
}

fn cmd_reboot(kernel: &mut Kernel<'_>, _args: &str) -> Flow {
    kprintln!(kernel.console, "Rebooting system...");
    Flow::Reboot
}

fn cmd_halt(kernel: &mut Kernel<'_>, _args: &str) -> Flow {
    kprintln!(kernel.console, "System halted.");
    Flow::Halt
}
