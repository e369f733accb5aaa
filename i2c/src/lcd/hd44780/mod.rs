//! HD44780 LCD module.
//!
//! Covers the ubiquitous 16x2 character modules (LCD1602) sold with a PCF8574
//! I2C backpack soldered to the 4-bit parallel interface. The backpack wires
//! the expander's upper four outputs to D4–D7 and the lower four to RS, RW, E
//! and the backlight transistor, so every controller byte is delivered as two
//! expander writes per nibble.

pub mod driver;
