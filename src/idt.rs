//! Interrupt vector table as plain data.
//!
//! Gates name the handler they dispatch to with a [`Handler`] tag instead of
//! a function address; the tags are only bound to entry points when the
//! table is committed to the CPU (see `interrupts::load_table`).

use crate::constants::interrupts::{GATE_INTERRUPT_RING0, PIC_1_OFFSET};

pub const VECTOR_COUNT: usize = 256;

/// Interrupt sources the kernel services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Handler {
    Timer = PIC_1_OFFSET,
    Keyboard,
}

impl Handler {
    /// Vector the source is delivered on after the PIC remap.
    pub fn vector(self) -> u8 {
        self as u8
    }

    /// Physical IRQ line on the master PIC.
    pub fn irq_line(self) -> u8 {
        self.vector() - PIC_1_OFFSET
    }
}

/// The type/attribute byte of a gate descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct GateFlags(u8);

impl GateFlags {
    pub const INTERRUPT_RING0: GateFlags = GateFlags(GATE_INTERRUPT_RING0);

    pub const fn from_bits(bits: u8) -> Self {
        GateFlags(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_present(self) -> bool {
        self.0 & 0x80 != 0
    }

    /// Descriptor privilege level, 0..=3.
    pub fn privilege_level(self) -> u8 {
        (self.0 >> 5) & 0b11
    }

    pub fn gate_type(self) -> u8 {
        self.0 & 0x0F
    }

    /// Interrupt gates clear IF on entry; trap gates leave it alone.
    pub fn is_interrupt_gate(self) -> bool {
        matches!(self.gate_type(), 0x6 | 0xE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub handler: Handler,
    pub selector: u16,
    pub flags: GateFlags,
}

/// 256 gate slots; empty slots are unhandled and fatal if they ever fire.
pub struct VectorTable {
    gates: [Option<Gate>; VECTOR_COUNT],
}

impl VectorTable {
    pub const fn new() -> Self {
        VectorTable {
            gates: [None; VECTOR_COUNT],
        }
    }

    /// The boot table: the timer and keyboard gates and nothing else.
    pub fn with_device_gates(selector: u16) -> Self {
        let mut table = VectorTable::new();
        for handler in [Handler::Timer, Handler::Keyboard] {
            table.install_gate(handler.vector(), handler, selector, GateFlags::INTERRUPT_RING0);
        }
        table
    }

    /// Binds `vector` to `handler`. Vectors below 32 belong to CPU
    /// exceptions and must not be used.
    ///
    /// # Panics
    ///
    /// Installing does not check the vector, but loading a table with a gate
    /// on an exception vector whose entry takes an error code or diverges
    /// (8, 14, ...) panics in `interrupts::load_table`.
    pub fn install_gate(&mut self, vector: u8, handler: Handler, selector: u16, flags: GateFlags) {
        self.gates[usize::from(vector)] = Some(Gate {
            handler,
            selector,
            flags,
        });
    }

    pub fn gate(&self, vector: u8) -> Option<&Gate> {
        self.gates[usize::from(vector)].as_ref()
    }

    /// Populated slots in ascending vector order.
    pub fn gates(&self) -> impl Iterator<Item = (u8, &Gate)> + '_ {
        self.gates
            .iter()
            .enumerate()
            .filter_map(|(vector, gate)| gate.as_ref().map(|gate| (vector as u8, gate)))
    }

    pub fn len(&self) -> usize {
        self.gates().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for VectorTable {
    fn default() -> Self {
        VectorTable::new()
    }
}
