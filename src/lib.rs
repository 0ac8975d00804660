#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_os = "none", feature(abi_x86_interrupt))]

pub mod constants;
pub mod cpu;
pub mod idt;
pub mod kernel;
pub mod keyboard;
pub mod logger;
pub mod pic;
pub mod pit;
pub mod port;
pub mod shell;
pub mod time;
pub mod vga_buffer;

#[cfg(target_os = "none")]
pub mod interrupts;

#[cfg(test)]
mod testing;

pub use kernel::{Kernel, Shared};

#[cfg(target_os = "none")]
pub fn hlt_loop() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}
