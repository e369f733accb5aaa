use crate::{I2cBus, I2cError, I2cResult};
use std::fmt::{Debug, Formatter};

/// Software I2C bus for tests and development away from the hardware.
///
/// Acknowledges a fixed set of addresses and records every byte written.
pub struct SoftI2cBus {
    devices: Vec<u8>,
    written: Vec<(u8, u8)>,
}

impl SoftI2cBus {
    pub fn new(devices: &[u8]) -> Self {
        SoftI2cBus {
            devices: devices.to_vec(),
            written: Vec::new(),
        }
    }

    /// Every `(address, byte)` write so far, oldest first.
    pub fn written(&self) -> &[(u8, u8)] {
        &self.written
    }

    /// Drains the write log.
    pub fn take_written(&mut self) -> Vec<(u8, u8)> {
        std::mem::take(&mut self.written)
    }
}

impl Debug for SoftI2cBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SoftI2cBus({:02X?})", self.devices)
    }
}

impl I2cBus for SoftI2cBus {
    fn write_byte(&mut self, address: u8, byte: u8) -> I2cResult<()> {
        if !self.devices.contains(&address) {
            return Err(I2cError::NoDeviceAt(address));
        }

        self.written.push((address, byte));
        Ok(())
    }

    fn probe(&mut self, address: u8) -> I2cResult<bool> {
        Ok(self.devices.contains(&address))
    }
}
