use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use pc_keyboard::{KeyCode, KeyState, ScancodeSet, ScancodeSet1};

use crate::constants::kernel::KEYBOARD_BUFFER_SIZE;
use crate::constants::keyboard::{
    CMD_RESET_CPU, RELEASE_BIT, STATUS_COMMAND_PORT, STATUS_INPUT_BUFFER_FULL,
};
use crate::cpu::Cpu;
use crate::port::PortIo;

pub const BACKSPACE: u8 = 0x08;

/// Returned when a byte is pushed into a full [`KeyboardBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFull;

impl fmt::Display for BufferFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("keyboard buffer full")
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: AtomicU8 = AtomicU8::new(0);

/// Translated characters waiting for the shell.
///
/// Single producer (the keyboard ISR, sole writer of `head`) and single
/// consumer (the shell, sole writer of `tail`). One slot always stays free
/// so that `head == tail` means empty.
pub struct KeyboardBuffer<const N: usize = KEYBOARD_BUFFER_SIZE> {
    slots: [AtomicU8; N],
    head: AtomicUsize,
    tail: AtomicUsize,
    overflow: AtomicBool,
}

impl<const N: usize> KeyboardBuffer<N> {
    pub const fn new() -> Self {
        KeyboardBuffer {
            slots: [EMPTY_SLOT; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            overflow: AtomicBool::new(false),
        }
    }

    /// Producer side. On a full buffer the byte is dropped, the overflow
    /// flag is raised and the queued bytes are left as they were.
    pub fn push(&self, byte: u8) -> Result<(), BufferFull> {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) % N;
        if next == self.tail.load(Ordering::Acquire) {
            self.overflow.store(true, Ordering::Relaxed);
            return Err(BufferFull);
        }
        self.slots[head].store(byte, Ordering::Relaxed);
        self.head.store(next, Ordering::Release);
        Ok(())
    }

    /// Consumer side.
    pub fn pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        let byte = self.slots[tail].load(Ordering::Relaxed);
        self.tail.store((tail + 1) % N, Ordering::Release);
        Some(byte)
    }

    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + N - tail) % N
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Bytes the buffer can hold at once.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Whether a byte has ever been dropped. Nothing clears or acts on this;
    /// it is kept for inspection only.
    pub fn has_overflowed(&self) -> bool {
        self.overflow.load(Ordering::Relaxed)
    }

    pub(crate) fn reset(&self) {
        for slot in &self.slots {
            slot.store(0, Ordering::Relaxed);
        }
        self.head.store(0, Ordering::Relaxed);
        self.tail.store(0, Ordering::Relaxed);
        self.overflow.store(false, Ordering::Relaxed);
    }
}

impl<const N: usize> Default for KeyboardBuffer<N> {
    fn default() -> Self {
        KeyboardBuffer::new()
    }
}

/// Translates a set 1 make code into the byte the shell sees.
///
/// Releases and keys outside the fixed table yield `None`.
pub fn translate(scancode: u8) -> Option<u8> {
    if scancode & RELEASE_BIT != 0 {
        return None;
    }

    // A fresh decoder per byte: prefixes (0xE0, 0xE1) carry the release bit
    // and never get here, so the decoder never has to keep state.
    let mut decoder = ScancodeSet1::new();
    let event = decoder.advance_state(scancode).ok()??;
    if event.state != KeyState::Down {
        return None;
    }
    key_to_byte(event.code)
}

fn key_to_byte(code: KeyCode) -> Option<u8> {
    let byte = match code {
        KeyCode::Key1 => b'1',
        KeyCode::Key2 => b'2',
        KeyCode::Key3 => b'3',
        KeyCode::Key4 => b'4',
        KeyCode::Key5 => b'5',
        KeyCode::Key6 => b'6',
        KeyCode::Key7 => b'7',
        KeyCode::Key8 => b'8',
        KeyCode::Key9 => b'9',
        KeyCode::Key0 => b'0',
        KeyCode::A => b'a',
        KeyCode::B => b'b',
        KeyCode::C => b'c',
        KeyCode::D => b'd',
        KeyCode::E => b'e',
        KeyCode::F => b'f',
        KeyCode::G => b'g',
        KeyCode::H => b'h',
        KeyCode::I => b'i',
        KeyCode::J => b'j',
        KeyCode::K => b'k',
        KeyCode::L => b'l',
        KeyCode::M => b'm',
        KeyCode::N => b'n',
        KeyCode::O => b'o',
        KeyCode::P => b'p',
        KeyCode::Q => b'q',
        KeyCode::R => b'r',
        KeyCode::S => b's',
        KeyCode::T => b't',
        KeyCode::U => b'u',
        KeyCode::V => b'v',
        KeyCode::W => b'w',
        KeyCode::X => b'x',
        KeyCode::Y => b'y',
        KeyCode::Z => b'z',
        KeyCode::Spacebar => b' ',
        KeyCode::Return => b'\n',
        KeyCode::Backspace => BACKSPACE,
        KeyCode::OemMinus => b'-',
        KeyCode::OemPlus => b'=',
        KeyCode::OemComma => b',',
        KeyCode::OemPeriod => b'.',
        KeyCode::Oem2 => b'/',
        _ => return None,
    };
    Some(byte)
}

/// Body of the keyboard interrupt handler.
///
/// Must stay short and non-blocking: no console output, no logging.
pub fn handle_scancode<const N: usize>(buffer: &KeyboardBuffer<N>, scancode: u8) {
    if let Some(byte) = translate(scancode) {
        // A full buffer drops the byte; `push` has already raised the flag.
        let _ = buffer.push(byte);
    }
}

/// Blocks until the ISR has queued a character and returns it.
pub fn read_char<const N: usize>(buffer: &KeyboardBuffer<N>, cpu: &mut impl Cpu) -> u8 {
    loop {
        if let Some(byte) = buffer.pop() {
            return byte;
        }
        cpu.wait_for_interrupt();
    }
}

/// Asks the keyboard controller to pulse the CPU reset line.
///
/// Waits for the controller's input buffer to drain first, otherwise the
/// command can be lost.
pub fn pulse_reset_line(io: &mut impl PortIo) {
    while io.read_u8(STATUS_COMMAND_PORT) & STATUS_INPUT_BUFFER_FULL != 0 {
        core::hint::spin_loop();
    }
    io.write_u8(STATUS_COMMAND_PORT, CMD_RESET_CPU);
}
