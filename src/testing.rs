//! Host-side stand-ins for the hardware the kernel drives.

use std::collections::{HashMap, VecDeque};

use crate::constants::vga::{BUFFER_HEIGHT, BUFFER_WIDTH};
use crate::cpu::Cpu;
use crate::idt::{Handler, VectorTable};
use crate::kernel::Shared;
use crate::port::PortIo;
use crate::vga_buffer::{Buffer, Console, ScreenChar};

/// Records every port write and answers reads from per-port queues
/// (0 once a queue runs dry).
#[derive(Default)]
pub struct RecordingPorts {
    writes: Vec<(u16, u8)>,
    pending_reads: HashMap<u16, VecDeque<u8>>,
    reads: Vec<u16>,
}

impl RecordingPorts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_reads(&mut self, port: u16, values: &[u8]) {
        self.pending_reads
            .entry(port)
            .or_default()
            .extend(values.iter().copied());
    }

    pub fn writes(&self) -> &[(u16, u8)] {
        &self.writes
    }

    pub fn writes_excluding(&self, port: u16) -> Vec<(u16, u8)> {
        self.writes.iter().copied().filter(|(p, _)| *p != port).collect()
    }

    pub fn reads_from(&self, port: u16) -> usize {
        self.reads.iter().filter(|p| **p == port).count()
    }
}

impl PortIo for RecordingPorts {
    fn read_u8(&mut self, port: u16) -> u8 {
        self.reads.push(port);
        self.pending_reads
            .get_mut(&port)
            .and_then(VecDeque::pop_front)
            .unwrap_or(0)
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        self.writes.push((port, value));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Timer,
    Keyboard(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuEvent {
    LoadVectors(Vec<(u8, Handler, u16)>),
    EnableInterrupts,
    DisableInterrupts,
}

/// A CPU whose `hlt` delivers the next scripted interrupt through the real
/// ISR bodies.
pub struct ScriptedCpu<'a> {
    shared: &'a Shared,
    pending: VecDeque<Interrupt>,
    events: Vec<CpuEvent>,
}

impl<'a> ScriptedCpu<'a> {
    pub fn new(shared: &'a Shared) -> Self {
        ScriptedCpu {
            shared,
            pending: VecDeque::new(),
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[CpuEvent] {
        &self.events
    }

    pub fn timer_ticks(&mut self, count: usize) {
        self.pending.extend(core::iter::repeat(Interrupt::Timer).take(count));
    }

    /// Queues a press and a release for every character of `text`.
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            let make = make_code(c).unwrap_or_else(|| panic!("no scancode for {:?}", c));
            self.pending.push_back(Interrupt::Keyboard(make));
            self.pending.push_back(Interrupt::Keyboard(make | 0x80));
        }
    }

    pub fn type_scancodes(&mut self, scancodes: &[u8]) {
        self.pending
            .extend(scancodes.iter().map(|&code| Interrupt::Keyboard(code)));
    }
}

impl Cpu for ScriptedCpu<'_> {
    fn load_vectors(&mut self, table: &VectorTable) {
        let gates = table
            .gates()
            .map(|(vector, gate)| (vector, gate.handler, gate.selector))
            .collect();
        self.events.push(CpuEvent::LoadVectors(gates));
    }

    fn enable_interrupts(&mut self) {
        self.events.push(CpuEvent::EnableInterrupts);
    }

    fn disable_interrupts(&mut self) {
        self.events.push(CpuEvent::DisableInterrupts);
    }

    fn wait_for_interrupt(&mut self) {
        match self.pending.pop_front() {
            Some(Interrupt::Timer) => self.shared.on_timer(),
            Some(Interrupt::Keyboard(scancode)) => self.shared.on_keyboard(scancode),
            None => panic!("blocked waiting for an interrupt that was never scripted"),
        }
    }

    fn halt(&mut self) -> ! {
        panic!("cpu halted");
    }
}

/// Set 1 make code for the characters the keyboard table covers.
fn make_code(c: char) -> Option<u8> {
    const LETTERS: &[u8; 26] = &[
        0x1E, 0x30, 0x2E, 0x20, 0x12, 0x21, 0x22, 0x23, 0x17, 0x24, 0x25, 0x26, 0x32, 0x31, 0x18,
        0x19, 0x10, 0x13, 0x1F, 0x14, 0x16, 0x2F, 0x11, 0x2D, 0x15, 0x2C,
    ];
    let code = match c {
        'a'..='z' => LETTERS[c as usize - 'a' as usize],
        '1'..='9' => 0x02 + (c as u8 - b'1'),
        '0' => 0x0B,
        ' ' => 0x39,
        '\n' => 0x1C,
        '\u{8}' => 0x0E,
        '-' => 0x0C,
        '=' => 0x0D,
        ',' => 0x33,
        '.' => 0x34,
        '/' => 0x35,
        _ => return None,
    };
    Some(code)
}

pub fn blank_buffer() -> Buffer {
    Buffer::filled(ScreenChar {
        ascii_character: b' ',
        color_code: Console::DEFAULT_COLOR,
    })
}

/// Every row of the grid with trailing blanks removed.
pub fn screen_lines(console: &Console<'_>) -> Vec<String> {
    (0..BUFFER_HEIGHT)
        .map(|row| {
            let text: String = (0..BUFFER_WIDTH)
                .map(|col| console.char_at(row, col).ascii_character as char)
                .collect();
            text.trim_end().to_string()
        })
        .collect()
}
