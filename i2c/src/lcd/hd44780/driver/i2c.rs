use crate::lcd::hd44780::driver::HD44780Driver;
use crate::{I2cBus, I2cError, I2cResult};
use log::{debug, trace};
use std::thread::sleep;
use std::time::Duration;

/// Backlight control bit of the backpack expander.
const BACKLIGHT: u8 = 0b00001000;
/// Enable (clock) bit; the controller latches a nibble on its falling edge.
const ENABLE: u8 = 0b00000100;
/// Register select bit; clear for commands, set for data.
const REGISTER_SELECT: u8 = 0b00000001;

/// Addresses the common backpack boards ship with, tried in order.
pub const DEFAULT_ADDRESSES: [u8; 2] = [0x27, 0x3F];

/// Number of character columns on the display.
pub const COLUMNS: u8 = 16;
/// Number of character rows on the display.
pub const ROWS: u8 = 2;

/// DDRAM address of the first cell of each row.
const ROW_OFFSETS: [u8; ROWS as usize] = [0x00, 0x40];

/// Resolves the backpack address on `bus`.
///
/// An explicitly requested address must be present on the bus, otherwise
/// [DEFAULT_ADDRESSES] are tried in order against the scan results.
pub fn resolve_address(bus: &mut dyn I2cBus, requested: Option<u8>) -> I2cResult<u8> {
    let devices = bus.scan()?;
    debug!("Bus scan found: {devices:02X?}");

    if devices.is_empty() {
        return Err(I2cError::NoDevice);
    }

    if let Some(address) = requested {
        return if devices.contains(&address) {
            Ok(address)
        } else {
            Err(I2cError::NoDeviceAt(address))
        };
    }

    DEFAULT_ADDRESSES
        .into_iter()
        .find(|address| devices.contains(address))
        .ok_or(I2cError::NoDevice)
}

/// HD44780 driver talking through a PCF8574-style I2C backpack.
///
/// The backpack is wired write-only, so the busy flag cannot be polled and
/// every transfer is paced with fixed delays instead.
#[derive(Debug)]
pub struct I2cHD44780Driver<'a> {
    bus: &'a mut dyn I2cBus,
    address: u8,
    backlight: bool,
}

impl<'a> I2cHD44780Driver<'a> {
    /// Creates a driver for a known device address. No bus traffic happens
    /// until [HD44780Driver::init] is called.
    pub fn new(bus: &'a mut dyn I2cBus, address: u8) -> Self {
        I2cHD44780Driver {
            bus,
            address,
            backlight: true,
        }
    }

    /// Scans the bus and creates a driver for the resolved address.
    ///
    /// See [resolve_address] for the resolution rules.
    pub fn new_resolved(bus: &'a mut dyn I2cBus, requested: Option<u8>) -> I2cResult<Self> {
        let address = resolve_address(bus, requested)?;
        Ok(Self::new(bus, address))
    }

    /// The resolved 7-bit device address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Whether the backlight is currently on.
    pub fn backlight(&self) -> bool {
        self.backlight
    }

    /// Turns the backlight on or off. Takes effect immediately and sticks to
    /// every following transfer.
    pub fn set_backlight(&mut self, on: bool) -> I2cResult<()> {
        self.backlight = on;
        let word = if on { BACKLIGHT } else { 0 };
        self.bus.write_byte(self.address, word)
    }

    /// Moves the cursor to the given cell and writes the bytes of `text`
    /// there as raw character codes.
    ///
    /// `x` is the column (`0..COLUMNS`), `y` the row (`0..ROWS`).
    pub fn write_at(&mut self, x: u8, y: u8, text: &str) -> I2cResult<()> {
        if x >= COLUMNS || y >= ROWS {
            return Err(I2cError::InvalidArgument);
        }

        self.set_ddram_address(ROW_OFFSETS[y as usize] + x)?;
        for byte in text.bytes() {
            self.send_data(byte)?;
        }
        Ok(())
    }

    /// Writes `text` from the current cursor position. A `'\n'` moves the
    /// cursor to the start of the second row.
    pub fn message(&mut self, text: &str) -> I2cResult<()> {
        for byte in text.bytes() {
            if byte == b'\n' {
                self.set_ddram_address(ROW_OFFSETS[1])?;
            } else {
                self.send_data(byte)?;
            }
        }
        Ok(())
    }

    fn write_word(&mut self, word: u8) -> I2cResult<()> {
        let word = if self.backlight {
            word | BACKLIGHT
        } else {
            word & !BACKLIGHT
        };
        self.bus.write_byte(self.address, word)
    }

    fn send(&mut self, byte: u8, rs: bool) -> I2cResult<()> {
        trace!("Sending byte: {byte:08b}, RS: {rs}");

        let rs_bit = if rs { REGISTER_SELECT } else { 0 };
        for nibble in [byte & 0xF0, byte << 4] {
            // Raise E with the nibble on the data lines, then drop E to
            // latch it.
            self.write_word(nibble | ENABLE | rs_bit)?;
            sleep(Duration::from_millis(2));
            self.write_word(nibble)?;
        }
        Ok(())
    }
}

impl HD44780Driver for I2cHD44780Driver<'_> {
    fn init(&mut self, multiline: bool, alt_font: bool) -> I2cResult<()> {
        debug!("Initializing LCD at 0x{:02X}", self.address);

        // The first two writes resynchronize the controller into 4-bit mode
        // regardless of the state it was left in.
        self.send_command(0b00110011)?;
        sleep(Duration::from_millis(5));
        self.send_command(0b00110010)?;
        sleep(Duration::from_millis(5));
        self.function_set(false, multiline, alt_font)?;
        sleep(Duration::from_millis(5));
        self.set_display_control(true, false, false)?;
        sleep(Duration::from_millis(5));
        self.clear_display()?;
        self.set_backlight(self.backlight)?;
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> I2cResult<()> {
        self.send(command, false)
    }

    fn send_data(&mut self, data: u8) -> I2cResult<()> {
        self.send(data, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soft::SoftI2cBus;

    /// Reassembles `(rs, byte)` transfers from the raw backpack write log.
    fn decode(written: &[(u8, u8)]) -> Vec<(bool, u8)> {
        assert_eq!(written.len() % 4, 0);
        written
            .chunks(4)
            .map(|chunk| {
                assert_ne!(chunk[0].1 & ENABLE, 0);
                assert_eq!(chunk[1].1 & ENABLE, 0);
                assert_ne!(chunk[2].1 & ENABLE, 0);
                assert_eq!(chunk[3].1 & ENABLE, 0);

                let rs = chunk[0].1 & REGISTER_SELECT != 0;
                let hi = chunk[0].1 & 0xF0;
                let lo = chunk[2].1 & 0xF0;
                assert_eq!(chunk[1].1 & 0xF0, hi);
                assert_eq!(chunk[3].1 & 0xF0, lo);

                (rs, hi | (lo >> 4))
            })
            .collect()
    }

    #[test]
    fn resolve_prefers_requested_address() {
        let mut bus = SoftI2cBus::new(&[0x27, 0x3F, 0x50]);
        assert_eq!(resolve_address(&mut bus, Some(0x50)), Ok(0x50));
    }

    #[test]
    fn resolve_fails_for_missing_requested_address() {
        let mut bus = SoftI2cBus::new(&[0x27]);
        assert_eq!(
            resolve_address(&mut bus, Some(0x26)),
            Err(I2cError::NoDeviceAt(0x26))
        );
    }

    #[test]
    fn resolve_tries_defaults_in_order() {
        let mut bus = SoftI2cBus::new(&[0x3F, 0x27]);
        assert_eq!(resolve_address(&mut bus, None), Ok(0x27));

        let mut bus = SoftI2cBus::new(&[0x3F, 0x42]);
        assert_eq!(resolve_address(&mut bus, None), Ok(0x3F));
    }

    #[test]
    fn resolve_fails_without_known_devices() {
        let mut bus = SoftI2cBus::new(&[]);
        assert_eq!(resolve_address(&mut bus, None), Err(I2cError::NoDevice));

        let mut bus = SoftI2cBus::new(&[0x42]);
        assert_eq!(resolve_address(&mut bus, None), Err(I2cError::NoDevice));
    }

    #[test]
    fn new_resolved_picks_a_default_address() {
        let mut bus = SoftI2cBus::new(&[0x3F]);
        let lcd = I2cHD44780Driver::new_resolved(&mut bus, None).unwrap();
        assert_eq!(lcd.address(), 0x3F);
    }

    #[test]
    fn commands_are_sent_as_two_backlit_nibbles() {
        let mut bus = SoftI2cBus::new(&[0x27]);
        let mut lcd = I2cHD44780Driver::new(&mut bus, 0x27);
        lcd.send_command(0x33).unwrap();

        assert_eq!(
            bus.written(),
            &[(0x27, 0x3C), (0x27, 0x38), (0x27, 0x3C), (0x27, 0x38)]
        );
    }

    #[test]
    fn data_carries_register_select_and_backlight_state() {
        let mut bus = SoftI2cBus::new(&[0x27]);
        let mut lcd = I2cHD44780Driver::new(&mut bus, 0x27);
        lcd.set_backlight(false).unwrap();
        lcd.send_data(0x41).unwrap();

        assert_eq!(
            bus.written(),
            &[
                (0x27, 0x00),
                (0x27, 0x45),
                (0x27, 0x40),
                (0x27, 0x15),
                (0x27, 0x10),
            ]
        );
    }

    #[test]
    fn init_runs_the_four_bit_bring_up() {
        let mut bus = SoftI2cBus::new(&[0x27]);
        let mut lcd = I2cHD44780Driver::new(&mut bus, 0x27);
        lcd.init(true, false).unwrap();

        let (tail, body) = bus.written().split_last().unwrap();
        // The sequence ends with the bare backlight refresh.
        assert_eq!(*tail, (0x27, 0x08));
        assert_eq!(
            decode(body),
            vec![
                (false, 0x33),
                (false, 0x32),
                (false, 0x28),
                (false, 0x0C),
                (false, 0x01),
            ]
        );
    }

    #[test]
    fn write_at_validates_coordinates() {
        let mut bus = SoftI2cBus::new(&[0x27]);
        let mut lcd = I2cHD44780Driver::new(&mut bus, 0x27);
        assert_eq!(lcd.write_at(16, 0, "x"), Err(I2cError::InvalidArgument));
        assert_eq!(lcd.write_at(0, 2, "x"), Err(I2cError::InvalidArgument));

        assert!(bus.written().is_empty());
    }

    #[test]
    fn write_at_addresses_the_target_cell() {
        let mut bus = SoftI2cBus::new(&[0x27]);
        let mut lcd = I2cHD44780Driver::new(&mut bus, 0x27);
        lcd.write_at(3, 1, "Hi").unwrap();

        assert_eq!(
            decode(bus.written()),
            vec![(false, 0xC3), (true, b'H'), (true, b'i')]
        );
    }

    #[test]
    fn message_newline_jumps_to_second_row() {
        let mut bus = SoftI2cBus::new(&[0x27]);
        let mut lcd = I2cHD44780Driver::new(&mut bus, 0x27);
        lcd.message("A\nB").unwrap();

        assert_eq!(
            decode(bus.written()),
            vec![(true, b'A'), (false, 0xC0), (true, b'B')]
        );
    }
}
