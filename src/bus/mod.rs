//! Register bus abstraction
//!
//! The sensor is driven through three SMBus primitives: read one byte at a
//! register, write one byte at a register, and read a block starting at a
//! register. [`RegisterBus`] is the seam between the sensor controller and
//! the platform, with a Linux `/dev/i2c-N` implementation for hardware and
//! [`MockBus`] for tests.

use crate::error::Result;

mod i2c;
mod mock;

pub use i2c::LinuxI2cBus;
pub use mock::{BusOp, MockBus};

/// Register-addressed bus transactions against a single slave device
pub trait RegisterBus: Send {
    /// Read one byte from `register`
    fn read_byte(&mut self, register: u8) -> Result<u8>;

    /// Write one byte to `register`
    fn write_byte(&mut self, register: u8, value: u8) -> Result<()>;

    /// Read `buffer.len()` bytes starting at `register`
    ///
    /// Returns the number of bytes actually read, which may be fewer than
    /// requested if the platform truncates the transfer.
    fn read_block(&mut self, register: u8, buffer: &mut [u8]) -> Result<usize>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for Box<B> {
    fn read_byte(&mut self, register: u8) -> Result<u8> {
        (**self).read_byte(register)
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<()> {
        (**self).write_byte(register, value)
    }

    fn read_block(&mut self, register: u8, buffer: &mut [u8]) -> Result<usize> {
        (**self).read_block(register, buffer)
    }
}
