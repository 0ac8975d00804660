use core::fmt;
use volatile::Volatile;
use crate::constants::vga::{
    BUFFER_ADDR, BUFFER_HEIGHT, BUFFER_WIDTH, COMMAND_PORT, CURSOR_LOCATION_HIGH,
    CURSOR_LOCATION_LOW, DATA_PORT,
};
use crate::keyboard::BACKSPACE;
use crate::port::PortIo;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenChar {
    pub ascii_character: u8,
    pub color_code: ColorCode,
}

/// The text-mode cell grid, laid out exactly like video memory.
#[repr(transparent)]
pub struct Buffer {
    chars: [[Volatile<ScreenChar>; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

impl Buffer {
    /// The memory-mapped VGA text buffer.
    ///
    /// # Safety
    ///
    /// `BUFFER_ADDR` must be identity mapped, and the returned reference must
    /// be the only one in use.
    pub unsafe fn vga() -> &'static mut Buffer {
        &mut *(BUFFER_ADDR as *mut Buffer)
    }

    /// An off-screen grid filled with `fill`.
    pub fn filled(fill: ScreenChar) -> Buffer {
        Buffer {
            chars: core::array::from_fn(|_| core::array::from_fn(|_| Volatile::new(fill))),
        }
    }
}

/// Cursor position, display attribute and the grid they refer to.
///
/// Only the main line writes to the console; interrupt handlers never do.
pub struct Console<'a> {
    column_position: usize,
    row_position: usize,
    color_code: ColorCode,
    buffer: &'a mut Buffer,
}

impl<'a> Console<'a> {
    pub const DEFAULT_COLOR: ColorCode = ColorCode::new(Color::White, Color::Black);

    pub fn new(buffer: &'a mut Buffer) -> Self {
        Console {
            column_position: 0,
            row_position: 0,
            color_code: Self::DEFAULT_COLOR,
            buffer,
        }
    }

    /// `(column, row)` of the next cell to be written.
    pub fn cursor(&self) -> (usize, usize) {
        (self.column_position, self.row_position)
    }

    pub fn set_color(&mut self, foreground: Color, background: Color) {
        self.color_code = ColorCode::new(foreground, background);
    }

    pub fn char_at(&self, row: usize, col: usize) -> ScreenChar {
        self.buffer.chars[row][col].read()
    }

    pub fn put_char(&mut self, byte: u8) {
        match byte {
            b'\n' => self.new_line(),
            BACKSPACE => self.backspace(),
            _ => {
                let row = self.row_position;
                let col = self.column_position;
                self.buffer.chars[row][col].write(ScreenChar {
                    ascii_character: byte,
                    color_code: self.color_code,
                });
                self.column_position += 1;
                if self.column_position >= BUFFER_WIDTH {
                    self.new_line();
                }
            }
        }
    }

    fn new_line(&mut self) {
        if self.row_position < BUFFER_HEIGHT - 1 {
            self.row_position += 1;
        } else {
            self.scroll_up();
        }
        self.column_position = 0;
    }

    /// Moves every row up by one, dropping the top row and blanking the
    /// bottom one. The cursor stays on the last row.
    pub fn scroll_up(&mut self) {
        for row in 1..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                let character = self.buffer.chars[row][col].read();
                self.buffer.chars[row - 1][col].write(character);
            }
        }
        self.clear_row(BUFFER_HEIGHT - 1);
        self.row_position = BUFFER_HEIGHT - 1;
    }

    fn clear_row(&mut self, row: usize) {
        let blank = ScreenChar {
            ascii_character: b' ',
            color_code: self.color_code,
        };
        for col in 0..BUFFER_WIDTH {
            self.buffer.chars[row][col].write(blank);
        }
    }

    pub fn write_string(&mut self, s: &str) {
        for byte in s.bytes() {
            match byte {
                0x20..=0x7e | b'\n' => self.put_char(byte),
                _ => self.put_char(0xfe),
            }
        }
    }

    // never crosses back into the previous row
    fn backspace(&mut self) {
        if self.column_position > 0 {
            self.column_position -= 1;
            let row = self.row_position;
            let col = self.column_position;
            self.buffer.chars[row][col].write(ScreenChar {
                ascii_character: b' ',
                color_code: self.color_code,
            });
        }
    }

    pub fn clear(&mut self) {
        for row in 0..BUFFER_HEIGHT {
            self.clear_row(row);
        }
        self.column_position = 0;
        self.row_position = 0;
    }

    /// Moves the blinking hardware cursor to the logical cursor.
    pub fn sync_cursor(&self, io: &mut impl PortIo) {
        let offset = (self.row_position * BUFFER_WIDTH + self.column_position) as u16;
        let [low, high] = offset.to_le_bytes();
        io.write_u8(COMMAND_PORT, CURSOR_LOCATION_HIGH);
        io.write_u8(DATA_PORT, high);
        io.write_u8(COMMAND_PORT, CURSOR_LOCATION_LOW);
        io.write_u8(DATA_PORT, low);
    }
}

impl fmt::Write for Console<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}

#[macro_export]
macro_rules! kprint {
    ($console:expr, $($arg:tt)*) => ($crate::vga_buffer::_print(&mut $console, format_args!($($arg)*)));
}

#[macro_export]
macro_rules! kprintln {
    ($console:expr) => ($crate::kprint!($console, "\n"));
    ($console:expr, $($arg:tt)*) => ($crate::kprint!($console, "{}\n", format_args!($($arg)*)));
}

#[doc(hidden)]
pub fn _print(console: &mut Console<'_>, args: fmt::Arguments) {
    use core::fmt::Write;
    // writing to the grid cannot fail
    let _ = console.write_fmt(args);
}
