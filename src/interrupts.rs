//! Binding of [`Handler`] tags to interrupt service routines.

use x86_64::instructions::port::Port;
use x86_64::structures::gdt::SegmentSelector;
use x86_64::structures::idt::{HandlerFunc, InterruptDescriptorTable, InterruptStackFrame};
use x86_64::PrivilegeLevel;
use pic8259::ChainedPics;
use spin::{Mutex, Once};
use crate::constants::interrupts::{PIC_1_OFFSET, PIC_2_OFFSET};
use crate::constants::keyboard::DATA_PORT;
use crate::idt::{Handler, VectorTable};
use crate::kernel::Shared;

/// The only state interrupt handlers can reach.
pub static SHARED: Shared = Shared::new();

/// Used for end-of-interrupt only; remapping is done by `pic::remap_and_mask`.
static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

static IDT: Once<InterruptDescriptorTable> = Once::new();

fn entry_point(handler: Handler) -> HandlerFunc {
    match handler {
        Handler::Timer => timer_interrupt_handler,
        Handler::Keyboard => keyboard_interrupt_handler,
    }
}

/// Materialises `table` as a CPU descriptor table and loads it.
///
/// Only the first call builds the table; it is never modified afterwards.
pub fn load_table(table: &VectorTable) {
    let idt = IDT.call_once(|| {
        let mut idt = InterruptDescriptorTable::new();
        for (vector, gate) in table.gates() {
            let options = idt[vector].set_handler_fn(entry_point(gate.handler));
            options
                .set_present(gate.flags.is_present())
                .set_privilege_level(PrivilegeLevel::from_u16(u16::from(
                    gate.flags.privilege_level(),
                )))
                .disable_interrupts(gate.flags.is_interrupt_gate());
            // SAFETY: the selector comes from CS at boot and names a valid
            // 64-bit code segment
            unsafe {
                options.set_code_selector(SegmentSelector(gate.selector));
            }
        }
        idt
    });
    idt.load();
}

fn end_of_interrupt(handler: Handler) {
    // SAFETY: called once at the end of the handler for `handler`'s vector
    unsafe {
        PICS.lock().notify_end_of_interrupt(handler.vector());
    }
}

// Both handlers acknowledge the PIC; without it the line stays in service and
// no further timer or keyboard interrupts are delivered.

extern "x86-interrupt" fn timer_interrupt_handler(_stack_frame: InterruptStackFrame) {
    SHARED.on_timer();
    end_of_interrupt(Handler::Timer);
}

extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
    let mut port = Port::new(DATA_PORT);
    let scancode: u8 = unsafe { port.read() };

    SHARED.on_keyboard(scancode);

    end_of_interrupt(Handler::Keyboard);
}
