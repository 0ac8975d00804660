//! The kernel context and the boot sequence.

use crate::constants::kernel::TIMER_FREQUENCY_HZ;
use crate::cpu::Cpu;
use crate::idt::VectorTable;
use crate::keyboard::{self, KeyboardBuffer};
use crate::port::PortIo;
use crate::shell::{self, Flow, LineBuffer};
use crate::time::TickCounter;
use crate::vga_buffer::Console;
use crate::{pic, pit};

/// State reachable from interrupt handlers.
///
/// Nothing else is shared between interrupt and non-interrupt context. The
/// timer ISR is the only writer of `ticks`; the keyboard ISR is the only
/// producer into `keyboard` and the shell its only consumer. On a single
/// core that discipline is all the synchronisation needed.
pub struct Shared {
    pub ticks: TickCounter,
    pub keyboard: KeyboardBuffer,
}

impl Shared {
    pub const fn new() -> Self {
        Shared {
            ticks: TickCounter::new(),
            keyboard: KeyboardBuffer::new(),
        }
    }

    /// Zeroes every field. Runs first at boot, while interrupts are still off.
    pub fn reset(&self) {
        self.ticks.reset();
        self.keyboard.reset();
    }

    /// Timer ISR body.
    pub fn on_timer(&self) {
        self.ticks.tick();
    }

    /// Keyboard ISR body.
    pub fn on_keyboard(&self, scancode: u8) {
        keyboard::handle_scancode(&self.keyboard, scancode);
    }
}

impl Default for Shared {
    fn default() -> Self {
        Shared::new()
    }
}

/// Everything the shell and the drivers operate on, created once at boot and
/// alive until `halt` or `reboot`.
pub struct Kernel<'a> {
    pub console: Console<'a>,
    pub shared: &'a Shared,
}

impl<'a> Kernel<'a> {
    pub fn new(console: Console<'a>, shared: &'a Shared) -> Self {
        Kernel { console, shared }
    }

    /// Brings the machine from boot-stage handover to interrupts enabled.
    ///
    /// `selector` is the kernel code segment the interrupt gates run in.
    pub fn boot(
        console: Console<'a>,
        shared: &'a Shared,
        io: &mut impl PortIo,
        cpu: &mut impl Cpu,
        selector: u16,
    ) -> Self {
        shared.reset();

        let mut kernel = Kernel::new(console, shared);
        kernel.console.clear();
        shell::print_banner(&mut kernel);
        log::info!("console: cleared, banner printed");

        let table = VectorTable::with_device_gates(selector);
        cpu.load_vectors(&table);
        log::info!("idt: loaded {} gates (selector {:#x})", table.len(), selector);

        pic::remap_and_mask(io);
        pit::program(io, TIMER_FREQUENCY_HZ);

        cpu.enable_interrupts();
        log::info!("interrupts enabled");
        kernel
    }

    /// One shell iteration: prompt, read a line, dispatch it.
    pub fn step(&mut self, io: &mut impl PortIo, cpu: &mut impl Cpu) -> Flow {
        shell::prompt(self);
        self.console.sync_cursor(io);

        let mut line = LineBuffer::new();
        shell::read_line(self, io, cpu, &mut line);
        shell::execute(self, line.as_str())
    }

    /// Runs the shell until a terminal command.
    pub fn run(mut self, io: &mut impl PortIo, cpu: &mut impl Cpu) -> ! {
        loop {
            match self.step(io, cpu) {
                Flow::Continue => {}
                Flow::Reboot => {
                    log::info!("reboot requested");
                    keyboard::pulse_reset_line(io);
                    // the reset should never come back; halt if it does
                    cpu.halt()
                }
                Flow::Halt => {
                    log::info!("halt requested");
                    cpu.disable_interrupts();
                    cpu.halt()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    use crate::constants::interrupts::WAIT_PORT;
    use crate::constants::keyboard::STATUS_COMMAND_PORT;
    use crate::idt::Handler;
    use crate::testing::{blank_buffer, screen_lines, CpuEvent, RecordingPorts, ScriptedCpu};

    #[test]
    fn boot_loads_gates_programs_hardware_then_enables_interrupts() {
        let shared = Shared::new();
        let mut buffer = blank_buffer();
        let mut io = RecordingPorts::new();
        let mut cpu = ScriptedCpu::new(&shared);

        let kernel = Kernel::boot(Console::new(&mut buffer), &shared, &mut io, &mut cpu, 0x08);

        assert_eq!(
            cpu.events(),
            [
                CpuEvent::LoadVectors(vec![(32, Handler::Timer, 0x08), (33, Handler::Keyboard, 0x08)]),
                CpuEvent::EnableInterrupts,
            ]
        );

        let writes = io.writes_excluding(WAIT_PORT);
        let (pic, pit) = writes.split_at(10);
        assert_eq!(pic.first(), Some(&(0x20, 0x11)));
        assert_eq!(pic.last(), Some(&(0xA1, 0xFF)));
        assert_eq!(pit, [(0x43, 0x34), (0x40, 0x9B), (0x40, 0x2E)]);

        assert!(screen_lines(&kernel.console)[0].starts_with("Ember"));
    }

    #[test]
    fn boot_zeroes_shared_state() {
        let shared = Shared::new();
        shared.on_timer();
        shared.on_keyboard(0x1E);
        let mut buffer = blank_buffer();
        let mut io = RecordingPorts::new();
        let mut cpu = ScriptedCpu::new(&shared);

        Kernel::boot(Console::new(&mut buffer), &shared, &mut io, &mut cpu, 0x08);

        assert_eq!(shared.ticks.get(), 0);
        assert!(shared.keyboard.is_empty());
    }

    #[test]
    fn isr_bodies_feed_shared_state() {
        let shared = Shared::new();
        shared.on_timer();
        shared.on_timer();
        shared.on_keyboard(0x1E);
        shared.on_keyboard(0x9E);

        assert_eq!(shared.ticks.get(), 2);
        assert_eq!(shared.keyboard.pop(), Some(b'a'));
        assert_eq!(shared.keyboard.pop(), None);
    }

    #[test]
    fn step_echoes_input_and_moves_hardware_cursor() {
        let shared = Shared::new();
        let mut buffer = blank_buffer();
        let mut kernel = Kernel::new(Console::new(&mut buffer), &shared);
        let mut io = RecordingPorts::new();
        let mut cpu = ScriptedCpu::new(&shared);
        cpu.type_text("echo hi\n");

        assert_eq!(kernel.step(&mut io, &mut cpu), Flow::Continue);

        let lines = screen_lines(&kernel.console);
        assert_eq!(lines[0], "> echo hi");
        assert_eq!(lines[1], "hi");
        assert_eq!(kernel.console.cursor(), (0, 2));
        // hardware cursor last synced right after the echoed newline (row 1)
        assert_eq!(io.writes().last(), Some(&(0x3D5, 80)));
    }

    /// Runs the shell on `input` until the CPU halts; `ScriptedCpu::halt`
    /// panics, which stands in for the halt loop.
    fn run_until_halt(input: &str, status_reads: &[u8]) -> (Vec<CpuEvent>, RecordingPorts) {
        let shared = Shared::new();
        let mut buffer = blank_buffer();
        let kernel = Kernel::new(Console::new(&mut buffer), &shared);
        let mut io = RecordingPorts::new();
        io.queue_reads(STATUS_COMMAND_PORT, status_reads);
        let mut cpu = ScriptedCpu::new(&shared);
        cpu.type_text(input);

        let halted = panic::catch_unwind(AssertUnwindSafe(|| {
            kernel.run(&mut io, &mut cpu);
        }));

        assert!(halted.is_err());
        (cpu.events().to_vec(), io)
    }

    #[test]
    fn halt_and_quit_disable_interrupts_before_halting() {
        for input in ["halt\n", "quit\n"] {
            let (events, _) = run_until_halt(input, &[]);
            assert_eq!(events, [CpuEvent::DisableInterrupts], "{:?}", input);
        }
    }

    #[test]
    fn commands_before_a_halt_keep_the_loop_running() {
        let (events, io) = run_until_halt("echo a\nticks\nhalt\n", &[]);

        assert_eq!(events, [CpuEvent::DisableInterrupts]);
        assert_eq!(io.reads_from(STATUS_COMMAND_PORT), 0);
    }

    #[test]
    fn reboot_pulses_reset_line_after_controller_drains() {
        let (events, io) = run_until_halt("reboot\n", &[0x02, 0x00]);

        assert_eq!(io.reads_from(STATUS_COMMAND_PORT), 2);
        assert_eq!(io.writes().last(), Some(&(0x64, 0xFE)));
        assert!(!events.contains(&CpuEvent::DisableInterrupts));
    }
}
