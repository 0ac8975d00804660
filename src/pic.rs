//! 8259 PIC remapping.
//!
//! Out of reset the two chips deliver IRQ 0-15 on vectors 8-15 and
//! 0x70-0x77, on top of the CPU exceptions. The remap moves them to
//! `PIC_1_OFFSET..PIC_1_OFFSET + 16` and closes every line except the
//! timer and the keyboard.

use crate::constants::interrupts::{
    PIC_1_COMMAND, PIC_1_DATA, PIC_1_OFFSET, PIC_2_COMMAND, PIC_2_DATA, PIC_2_OFFSET,
};
use crate::idt::Handler;
use crate::port::{io_wait, PortIo};

/// ICW1: edge triggered, cascade mode, ICW4 follows.
const ICW1_INIT: u8 = 0x11;
/// ICW3 (master): slave attached to IRQ2.
const ICW3_MASTER_SLAVE_ON_IRQ2: u8 = 0x04;
/// ICW3 (slave): cascade identity 2.
const ICW3_SLAVE_IDENTITY: u8 = 0x02;
/// ICW4: 8086/88 mode.
const ICW4_8086: u8 = 0x01;

/// Mask with every line closed except those in `open`.
pub fn mask_except(open: &[Handler]) -> u8 {
    open.iter()
        .fold(0xFF, |mask, handler| mask & !(1 << handler.irq_line()))
}

/// Reinitialises both controllers and leaves only IRQ0 and IRQ1 unmasked.
pub fn remap_and_mask(io: &mut impl PortIo) {
    let steps = [
        (PIC_1_COMMAND, ICW1_INIT),
        (PIC_2_COMMAND, ICW1_INIT),
        (PIC_1_DATA, PIC_1_OFFSET),
        (PIC_2_DATA, PIC_2_OFFSET),
        (PIC_1_DATA, ICW3_MASTER_SLAVE_ON_IRQ2),
        (PIC_2_DATA, ICW3_SLAVE_IDENTITY),
        (PIC_1_DATA, ICW4_8086),
        (PIC_2_DATA, ICW4_8086),
    ];
    for (port, value) in steps {
        io.write_u8(port, value);
        io_wait(io);
    }

    let master = mask_except(&[Handler::Timer, Handler::Keyboard]);
    io.write_u8(PIC_1_DATA, master);
    io.write_u8(PIC_2_DATA, 0xFF);
    log::info!("pic: remapped to {}/{}, mask {:#04x}", PIC_1_OFFSET, PIC_2_OFFSET, master);
}
