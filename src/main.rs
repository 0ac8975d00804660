#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod entry {
    use core::panic::PanicInfo;
    use ember::cpu::X86Cpu;
    use ember::interrupts::SHARED;
    use ember::port::HardwarePorts;
    use ember::vga_buffer::{Buffer, Console};
    use ember::{logger, Kernel};
    use x86_64::instructions::segmentation::{Segment, CS};

    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        log::error!("{}", info);
        ember::hlt_loop()
    }

    #[no_mangle]
    pub extern "C" fn _start() -> ! {
        // runs ahead of the `Shared` reset in `Kernel::boot`; the logger owns no
        // `Shared` state. Fails only when a logger is already installed.
        let _ = logger::init();

        // SAFETY: the boot stage identity maps the text buffer and nothing
        // else holds a reference to it
        let console = Console::new(unsafe { Buffer::vga() });
        let selector = CS::get_reg().0;

        let mut io = HardwarePorts;
        let mut cpu = X86Cpu;
        let kernel = Kernel::boot(console, &SHARED, &mut io, &mut cpu, selector);
        kernel.run(&mut io, &mut cpu)
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    eprintln!("ember is a bare-metal kernel; build it for an x86_64 `target_os = \"none\"` target");
}
