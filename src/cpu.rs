//! CPU control the kernel needs beyond port I/O.

use crate::idt::VectorTable;

pub trait Cpu {
    /// Commits the vector table to the interrupt-table register.
    fn load_vectors(&mut self, table: &VectorTable);

    fn enable_interrupts(&mut self);
    fn disable_interrupts(&mut self);

    /// Suspends the core until the next interrupt of any kind arrives.
    ///
    /// This is the only blocking primitive in the kernel: it has no return
    /// value, no timeout and no way to be cancelled.
    fn wait_for_interrupt(&mut self);

    /// Stops executing kernel code for good.
    fn halt(&mut self) -> !;
}

#[cfg(target_os = "none")]
pub use hardware::X86Cpu;

#[cfg(target_os = "none")]
mod hardware {
    use super::Cpu;
    use crate::idt::VectorTable;
    use x86_64::instructions::{hlt, interrupts};

    pub struct X86Cpu;

    impl Cpu for X86Cpu {
        fn load_vectors(&mut self, table: &VectorTable) {
            crate::interrupts::load_table(table);
        }

        fn enable_interrupts(&mut self) {
            interrupts::enable();
        }

        fn disable_interrupts(&mut self) {
            interrupts::disable();
        }

        fn wait_for_interrupt(&mut self) {
            hlt();
        }

        fn halt(&mut self) -> ! {
            crate::hlt_loop()
        }
    }
}
