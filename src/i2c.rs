//! Register transport backed by an `embedded-hal` I2C bus.
//!
//! The sensor uses 16-bit big-endian register addresses; multi-byte values
//! are big-endian on the wire. Reads are a combined write-read transaction.

use embedded_hal::i2c::I2c;

use crate::traits::{RegWidth, RegisterTransport, TransportError};

/// Default 7-bit I2C address of the sensor.
pub const DEFAULT_ADDRESS: u8 = 0x1A;

/// `RegisterTransport` over an I2C bus.
#[derive(Debug)]
pub struct I2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cTransport<I2C> {
    /// Create a transport talking to the sensor at its default address.
    pub const fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Create a transport for a non-default device address.
    pub const fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Release the underlying bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn bus_error<E: core::fmt::Debug>(address: u16, err: &E) -> TransportError {
        TransportError::Bus {
            address,
            message: format!("{err:?}"),
        }
    }
}

impl<I2C: I2c> RegisterTransport for I2cTransport<I2C> {
    fn read(&mut self, address: u16, width: RegWidth) -> Result<u32, TransportError> {
        let mut buf = [0u8; 4];
        let len = width.bytes();

        self.i2c
            .write_read(self.address, &address.to_be_bytes(), &mut buf[..len])
            .map_err(|err| Self::bus_error(address, &err))?;

        Ok(buf
            .iter()
            .take(len)
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte)))
    }

    fn write(&mut self, address: u16, width: RegWidth, value: u32) -> Result<(), TransportError> {
        if value > width.max_value() {
            return Err(TransportError::InvalidArgument { width, value });
        }

        let val = value.to_be_bytes();
        let len = width.bytes();

        // 16-bit address followed by the value, both big-endian.
        let mut buf = [0u8; 6];
        buf[..2].copy_from_slice(&address.to_be_bytes());
        buf[2..2 + len].copy_from_slice(&val[4 - len..]);

        self.i2c
            .write(self.address, &buf[..2 + len])
            .map_err(|err| Self::bus_error(address, &err))
    }
}
