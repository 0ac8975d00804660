/// System-wide constants to avoid magic numbers

/// VGA text mode constants
pub mod vga {
    /// VGA text buffer physical address
    pub const BUFFER_ADDR: usize = 0xb8000;

    /// VGA text mode dimensions
    pub const BUFFER_HEIGHT: usize = 25;
    pub const BUFFER_WIDTH: usize = 80;

    /// CRT controller ports
    pub const COMMAND_PORT: u16 = 0x3D4;
    pub const DATA_PORT: u16 = 0x3D5;

    /// Cursor location registers
    pub const CURSOR_LOCATION_HIGH: u8 = 0x0E;
    pub const CURSOR_LOCATION_LOW: u8 = 0x0F;
}

/// PS/2 Keyboard controller constants
pub mod keyboard {
    /// PS/2 keyboard data port
    pub const DATA_PORT: u16 = 0x60;

    /// PS/2 keyboard status/command port
    pub const STATUS_COMMAND_PORT: u16 = 0x64;

    /// Set while the controller has not yet consumed the last command byte
    pub const STATUS_INPUT_BUFFER_FULL: u8 = 0x02;

    /// Command to reset CPU via keyboard controller
    pub const CMD_RESET_CPU: u8 = 0xFE;

    /// Scancodes with this bit set are key releases
    pub const RELEASE_BIT: u8 = 0x80;
}

/// Interrupt constants
pub mod interrupts {
    /// PIC (Programmable Interrupt Controller) offset
    /// We remap PIC interrupts to start at 32 to avoid conflicts with CPU exceptions
    pub const PIC_1_OFFSET: u8 = 32;
    pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

    /// Master and slave command/data ports
    pub const PIC_1_COMMAND: u16 = 0x20;
    pub const PIC_1_DATA: u16 = 0x21;
    pub const PIC_2_COMMAND: u16 = 0xA0;
    pub const PIC_2_DATA: u16 = 0xA1;

    /// Unused port, written to give the PICs time to settle
    pub const WAIT_PORT: u16 = 0x80;

    /// Present, ring 0, 32-bit interrupt gate
    pub const GATE_INTERRUPT_RING0: u8 = 0x8E;
}

/// PIT (Programmable Interval Timer) constants
pub mod pit {
    /// Input clock of the 8253/8254 in Hz
    pub const BASE_FREQUENCY_HZ: u32 = 1_193_182;

    pub const CHANNEL_0_PORT: u16 = 0x40;
    pub const COMMAND_PORT: u16 = 0x43;

    /// Channel 0, lobyte/hibyte access, mode 2 (rate generator), binary
    pub const CMD_CHANNEL_0_RATE_GENERATOR: u8 = 0x34;
}

/// Serial port used for log output
pub mod serial {
    pub const COM1: u16 = 0x3F8;
}

/// Kernel tunables
pub mod kernel {
    pub const NAME: &str = "Ember";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Rate at which the timer interrupt fires
    pub const TIMER_FREQUENCY_HZ: u32 = 100;

    /// Slots in the keyboard ring buffer (one is always kept free)
    pub const KEYBOARD_BUFFER_SIZE: usize = 128;

    /// Longest command line the shell accepts
    pub const LINE_BUF_LEN: usize = 128;

    pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
}
