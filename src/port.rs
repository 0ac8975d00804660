//! Port-mapped I/O.
//!
//! Every driver talks to hardware through [`PortIo`] so the register
//! sequences can be checked without a machine underneath.

use crate::constants::interrupts::WAIT_PORT;

/// Byte-wide access to the x86 I/O port space.
pub trait PortIo {
    fn read_u8(&mut self, port: u16) -> u8;
    fn write_u8(&mut self, port: u16, value: u8);
}

/// Gives slow devices (the PICs in particular) one bus cycle to settle.
pub fn io_wait(io: &mut impl PortIo) {
    io.write_u8(WAIT_PORT, 0);
}

#[cfg(target_os = "none")]
pub use hardware::HardwarePorts;

#[cfg(target_os = "none")]
mod hardware {
    use super::PortIo;
    use x86_64::instructions::port::Port;

    /// The real I/O port space.
    pub struct HardwarePorts;

    impl PortIo for HardwarePorts {
        fn read_u8(&mut self, port: u16) -> u8 {
            // SAFETY: callers only pass the fixed device ports in `constants`
            unsafe { Port::<u8>::new(port).read() }
        }

        fn write_u8(&mut self, port: u16, value: u8) {
            // SAFETY: see `read_u8`
            unsafe { Port::<u8>::new(port).write(value) }
        }
    }
}
