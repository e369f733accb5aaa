pub mod lcd;
pub mod raw;
pub mod soft;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum I2cError {
    #[error("no device found on the bus")]
    NoDevice,
    #[error("no device at address 0x{0:02X}")]
    NoDeviceAt(u8),
    #[error("invalid argument")]
    InvalidArgument,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
}

impl From<std::io::Error> for I2cError {
    fn from(err: std::io::Error) -> Self {
        I2cError::Io(err.kind())
    }
}

pub type I2cResult<T> = Result<T, I2cError>;

/// First assignable 7-bit device address; 0x00–0x02 are reserved.
pub const ADDRESS_MIN: u8 = 0x03;
/// Last assignable 7-bit device address; 0x78 and up are reserved.
pub const ADDRESS_MAX: u8 = 0x77;

pub trait I2cBus: Debug {
    /// Writes a single byte to the device at the given 7-bit address.
    fn write_byte(&mut self, address: u8, byte: u8) -> I2cResult<()>;

    /// Checks whether a device acknowledges the given 7-bit address.
    fn probe(&mut self, address: u8) -> I2cResult<bool>;

    /// Scans the assignable address range and returns every address that
    /// acknowledged, in ascending order.
    fn scan(&mut self) -> I2cResult<Vec<u8>> {
        let mut devices = Vec::new();
        for address in ADDRESS_MIN..=ADDRESS_MAX {
            if self.probe(address)? {
                devices.push(address);
            }
        }
        Ok(devices)
    }
}
