//! Register access over SCCB, the I2C dialect of OmniVision sensors.
//!
//! Registers have 16 bit addresses and hold 8 bit values. Multi-byte values
//! are stored big-endian at consecutive addresses.

use crate::sensor::IsiError;
use embedded_hal::i2c::{Error as _, I2c};

/// An SCCB device on an I2C bus.
#[derive(Debug)]
pub struct Sccb<I2C> {
    i2c: I2C,
    address: u8,
}

fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> IsiError {
    IsiError::Bus(e.kind())
}

impl<I2C: I2c> Sccb<I2C> {
    /// Creates a device at the 7 bit `address`.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// 7 bit address of the device.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Returns the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Reads one register.
    pub fn read_reg(&mut self, reg: u16) -> Result<u8, IsiError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), &mut buf)
            .map_err(bus_error)?;
        isi_trace!("SCCB {:#06x} -> {:#04x}", reg, buf[0]);
        Ok(buf[0])
    }

    /// Writes one register.
    pub fn write_reg(&mut self, reg: u16, value: u8) -> Result<(), IsiError> {
        let [hi, lo] = reg.to_be_bytes();
        self.i2c
            .write(self.address, &[hi, lo, value])
            .map_err(bus_error)?;
        isi_trace!("SCCB {:#06x} <- {:#04x}", reg, value);
        Ok(())
    }

    /// Reads a big-endian 16 bit value from `reg` and `reg + 1`.
    pub fn read_reg16(&mut self, reg: u16) -> Result<u16, IsiError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), &mut buf)
            .map_err(bus_error)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Writes a big-endian 16 bit value to `reg` and `reg + 1`.
    pub fn write_reg16(&mut self, reg: u16, value: u16) -> Result<(), IsiError> {
        let [hi, lo] = reg.to_be_bytes();
        let [v_hi, v_lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[hi, lo, v_hi, v_lo])
            .map_err(bus_error)
    }

    /// Writes a list of registers in order. Stops at the first failure.
    pub fn write_regs(&mut self, regs: &[(u16, u8)]) -> Result<(), IsiError> {
        regs.iter()
            .try_for_each(|(reg, value)| self.write_reg(*reg, *value))
    }

    /// Replaces the bits of `mask` in `reg` with those of `value`.
    pub fn update_bits(&mut self, reg: u16, mask: u8, value: u8) -> Result<(), IsiError> {
        let old = self.read_reg(reg)?;
        self.write_reg(reg, (old & !mask) | (value & mask))
    }
}
