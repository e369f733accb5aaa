mod i2c;

use crate::{I2cError, I2cResult};
pub use i2c::*;
use std::fmt::Debug;

pub trait HD44780Driver: Debug {
    /// Runs the 4-bit bring-up sequence and leaves the display on with the
    /// cursor hidden.
    fn init(&mut self, multiline: bool, alt_font: bool) -> I2cResult<()>;

    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> I2cResult<()> {
        self.send_command(0b00000001)
    }

    /// Sets the cursor to the home position.
    fn return_home(&mut self) -> I2cResult<()> {
        self.send_command(0b00000010)
    }

    /// Sets the cursor movement direction and whether the display shifts
    /// along with each written character.
    fn set_entry_mode(&mut self, direction: CursorDirection, shift_display: bool) -> I2cResult<()> {
        let command = 0b00000100
            | (u8::from(direction == CursorDirection::Right) << 1)
            | u8::from(shift_display);
        self.send_command(command)
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off.
    fn set_display_control(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> I2cResult<()> {
        let command = 0b00001000
            | (u8::from(display_on) << 2)
            | (u8::from(cursor_on) << 1)
            | u8::from(blink_on);
        self.send_command(command)
    }

    /// Moves the cursor or shifts the display without writing data.
    fn cursor_shift(&mut self, shift_display: bool, direction: CursorDirection) -> I2cResult<()> {
        let command = 0b00010000
            | (u8::from(shift_display) << 3)
            | (u8::from(direction == CursorDirection::Right) << 2);
        self.send_command(command)
    }

    /// Sets the interface width, line count and font.
    fn function_set(&mut self, eight_bit: bool, two_lines: bool, alt_font: bool) -> I2cResult<()> {
        let command = 0b00100000
            | (u8::from(eight_bit) << 4)
            | (u8::from(two_lines) << 3)
            | (u8::from(alt_font) << 2);
        self.send_command(command)
    }

    /// Sets the CGRAM address (6 bits).
    fn set_cgram_address(&mut self, address: u8) -> I2cResult<()> {
        if address > 0b00111111 {
            return Err(I2cError::InvalidArgument);
        }
        self.send_command(0b01000000 | address)
    }

    /// Sets the DDRAM address (7 bits).
    fn set_ddram_address(&mut self, address: u8) -> I2cResult<()> {
        if address > 0b01111111 {
            return Err(I2cError::InvalidArgument);
        }
        self.send_command(0b10000000 | address)
    }

    // Low-level commands.
    // The builders above compose the command byte and go through these, which
    // are left to the transport implementation.

    /// Sends a command byte to the controller (RS = 0).
    fn send_command(&mut self, command: u8) -> I2cResult<()>;

    /// Sends a data byte to the controller (RS = 1).
    fn send_data(&mut self, data: u8) -> I2cResult<()>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}
