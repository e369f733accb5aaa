use crate::{ADDRESS_MAX, I2cBus, I2cError, I2cResult};
use log::trace;
use std::fmt::{Debug, Formatter};
use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;

/// i2c-dev ioctl selecting the slave address for subsequent transfers.
const I2C_SLAVE: libc::c_ulong = 0x0703;

/// I2C bus backed by the Linux i2c-dev character device.
pub struct RawI2cBus {
    file: File,
    path: String,
    selected: Option<u8>,
}

impl RawI2cBus {
    fn create(path: &str) -> I2cResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        Ok(RawI2cBus {
            file,
            path: path.to_string(),
            selected: None,
        })
    }

    /// Opens `/dev/i2c-{index}`.
    pub fn new(index: u8) -> I2cResult<Self> {
        Self::create(&format!("/dev/i2c-{index}"))
    }

    /// Opens an i2c-dev node at an explicit path.
    pub fn new_path(path: &str) -> I2cResult<Self> {
        Self::create(path)
    }

    fn select(&mut self, address: u8) -> I2cResult<()> {
        if address > ADDRESS_MAX {
            return Err(I2cError::InvalidArgument);
        }

        if self.selected == Some(address) {
            return Ok(());
        }

        let ret = unsafe {
            libc::ioctl(self.file.as_raw_fd(), I2C_SLAVE, address as libc::c_ulong)
        };
        if ret < 0 {
            return Err(std::io::Error::last_os_error().into());
        }

        self.selected = Some(address);
        Ok(())
    }
}

impl Debug for RawI2cBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawI2cBus({})", self.path)
    }
}

impl I2cBus for RawI2cBus {
    fn write_byte(&mut self, address: u8, byte: u8) -> I2cResult<()> {
        self.select(address)?;

        let buf = [byte];
        let ret = unsafe {
            libc::write(
                self.file.as_raw_fd(),
                buf.as_ptr() as *const libc::c_void,
                1,
            )
        };
        if ret != 1 {
            return Err(std::io::Error::last_os_error().into());
        }

        Ok(())
    }

    fn probe(&mut self, address: u8) -> I2cResult<bool> {
        if address > ADDRESS_MAX {
            return Err(I2cError::InvalidArgument);
        }

        // The kernel refuses I2C_SLAVE for addresses claimed by another
        // driver; i2cdetect skips those as well.
        if self.select(address).is_err() {
            return Ok(false);
        }

        // Zero-length write: the address byte goes out and the ACK comes
        // back without touching any device register.
        let ret = unsafe { libc::write(self.file.as_raw_fd(), std::ptr::null(), 0) };
        if ret < 0 {
            trace!(
                "Probe of 0x{address:02X} failed: {}",
                std::io::Error::last_os_error()
            );
            return Ok(false);
        }

        Ok(true)
    }
}
