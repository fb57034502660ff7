//! Linux I²C bus implementation

use super::RegisterBus;
use crate::error::{Error, Result};
use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;

/// SMBus transport over a Linux `/dev/i2c-N` character device
pub struct LinuxI2cBus {
    device: LinuxI2CDevice,
}

impl LinuxI2cBus {
    /// Open an I²C bus and bind it to a slave address
    ///
    /// # Arguments
    /// * `path` - Bus device path (e.g., "/dev/i2c-1")
    /// * `address` - 7-bit slave address (e.g., 0x68)
    pub fn open(path: &str, address: u16) -> Result<Self> {
        let device = LinuxI2CDevice::new(path, address).map_err(|e| {
            Error::Initialization(format!(
                "cannot open {} at address {:#04x}: {}",
                path, address, e
            ))
        })?;

        log::info!("Opened I2C bus: {} (address {:#04x})", path, address);

        Ok(LinuxI2cBus { device })
    }
}

fn bus_error(register: u8, err: impl std::fmt::Display) -> Error {
    Error::Bus {
        register,
        message: err.to_string(),
    }
}

impl RegisterBus for LinuxI2cBus {
    fn read_byte(&mut self, register: u8) -> Result<u8> {
        self.device
            .smbus_read_byte_data(register)
            .map_err(|e| bus_error(register, e))
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<()> {
        self.device
            .smbus_write_byte_data(register, value)
            .map_err(|e| bus_error(register, e))
    }

    fn read_block(&mut self, register: u8, buffer: &mut [u8]) -> Result<usize> {
        // SMBus I2C-block transfers are capped at 32 bytes
        let len = buffer.len().min(32) as u8;
        let data = self
            .device
            .smbus_read_i2c_block_data(register, len)
            .map_err(|e| bus_error(register, e))?;

        let n = data.len().min(buffer.len());
        buffer[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }
}
