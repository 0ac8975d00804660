//! `log` backend writing to the first serial port.
//!
//! Interrupt handlers never log: the port sits behind a spinlock the main
//! line may already hold.

use core::fmt::{self, Write};

fn level_tag(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

/// Formats one record as `[LEVEL][module:line] > message`.
pub fn write_record(out: &mut impl Write, record: &log::Record<'_>) -> fmt::Result {
    writeln!(
        out,
        "[{}][{}:{}] > {}",
        level_tag(record.level()),
        record.module_path().unwrap_or(""),
        record.line().unwrap_or(0),
        record.args(),
    )
}

#[cfg(target_os = "none")]
pub use serial::init;

#[cfg(target_os = "none")]
mod serial {
    use lazy_static::lazy_static;
    use spin::Mutex;
    use uart_16550::SerialPort;

    use crate::constants::kernel::LOG_LEVEL;
    use crate::constants::serial::COM1;

    lazy_static! {
        static ref SERIAL1: Mutex<SerialPort> = {
            // SAFETY: COM1 is only ever touched through this mutex
            let mut serial_port = unsafe { SerialPort::new(COM1) };
            serial_port.init();
            Mutex::new(serial_port)
        };
    }

    struct SerialLogger;
    static LOGGER: SerialLogger = SerialLogger;

    impl log::Log for SerialLogger {
        fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
            metadata.level() <= LOG_LEVEL
        }

        fn log(&self, record: &log::Record<'_>) {
            if !self.enabled(record.metadata()) {
                return;
            }
            x86_64::instructions::interrupts::without_interrupts(|| {
                let _ = super::write_record(&mut *SERIAL1.lock(), record);
            });
        }

        fn flush(&self) {}
    }

    pub fn init() -> Result<(), log::SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(LOG_LEVEL);
        Ok(())
    }
}
