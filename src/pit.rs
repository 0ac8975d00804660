//! Channel 0 of the 8253/8254 programmable interval timer.

use crate::constants::pit::{
    BASE_FREQUENCY_HZ, CHANNEL_0_PORT, CMD_CHANNEL_0_RATE_GENERATOR, COMMAND_PORT,
};
use crate::port::PortIo;

/// Reload value for `frequency_hz`, clamped into what the 16-bit counter
/// can hold. `None` for a zero frequency.
pub fn divisor(frequency_hz: u32) -> Option<u16> {
    if frequency_hz == 0 {
        return None;
    }
    let divisor = (BASE_FREQUENCY_HZ / frequency_hz).clamp(1, u32::from(u16::MAX));
    Some(divisor as u16)
}

/// Puts channel 0 into rate generator mode at `frequency_hz`.
///
/// A frequency of zero leaves the timer untouched.
pub fn program(io: &mut impl PortIo, frequency_hz: u32) {
    let Some(divisor) = divisor(frequency_hz) else {
        log::warn!("pit: zero frequency requested, timer left unprogrammed");
        return;
    };

    let [low, high] = divisor.to_le_bytes();
    io.write_u8(COMMAND_PORT, CMD_CHANNEL_0_RATE_GENERATOR);
    io.write_u8(CHANNEL_0_PORT, low);
    io.write_u8(CHANNEL_0_PORT, high);
    log::info!("pit: {} Hz (divisor {})", frequency_hz, divisor);
}
