//! OmniVision OX08B40, an 8 MP automotive sensor.

use crate::{
    omnivision::{Descriptor, OvSensor},
    sensor::{
        BayerPattern, BlackLevel, Gain, HdrMode, IsiError, SensorCaps, SensorMode, WbGains,
    },
};
use embedded_hal::i2c::I2c;

/// Chip id of the OX08B40.
pub const CHIP_ID: u16 = 0x5308;
/// Default 7 bit SCCB address.
pub const DEFAULT_ADDRESS: u8 = 0x36;

static MODES: [SensorMode; 2] = [
    SensorMode {
        index: 0,
        width: 3840,
        height: 2160,
        fps: 30,
        hdr: HdrMode::Dcg,
        bayer: BayerPattern::Bggr,
        bit_width: 12,
        pclk_hz: 297_000_000,
        hts: 4400,
        vts: 2250,
    },
    SensorMode {
        index: 1,
        width: 1920,
        height: 1080,
        fps: 60,
        hdr: HdrMode::Linear,
        bayer: BayerPattern::Bggr,
        bit_width: 12,
        pclk_hz: 148_500_000,
        hts: 2200,
        vts: 1125,
    },
];

static DESCRIPTOR: Descriptor = Descriptor {
    name: "OX08B40",
    chip_id: CHIP_ID,
    modes: &MODES,
    caps: SensorCaps {
        lanes: 4,
        hdr: true,
        digital_gain: true,
        white_balance: true,
        black_level: true,
        test_pattern: false,
    },
    min_gain: Gain::ONE,
    max_gain: Gain::from_q10(15 * 1024 + 512),
    max_digital_gain: Gain::from_q10(0x3FFF),
    exposure_margin: 8,
};

/// Driver of an OX08B40.
#[derive(Debug)]
pub struct Ox08b40<I2C>(OvSensor<I2C>);

impl<I2C: I2c> Ox08b40<I2C> {
    /// Creates the driver for the sensor at the 7 bit `address`. The bus is
    /// not accessed.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self(OvSensor::new(i2c, address, &DESCRIPTOR))
    }

    /// Returns the bus.
    pub fn release(self) -> I2C {
        self.0.release()
    }
}

omnivision_sensor!(Ox08b40, {
    fn set_digital_gain(&mut self, gain: Gain) -> Result<Gain, IsiError> {
        self.0.set_digital_gain(gain)
    }

    fn digital_gain(&self) -> Result<Gain, IsiError> {
        self.0.digital_gain()
    }

    fn set_white_balance(&mut self, gains: WbGains) -> Result<(), IsiError> {
        self.0.set_white_balance(gains)
    }

    fn white_balance(&self) -> Result<WbGains, IsiError> {
        self.0.white_balance()
    }

    fn set_black_level(&mut self, level: BlackLevel) -> Result<(), IsiError> {
        self.0.set_black_level(level)
    }

    fn black_level(&self) -> Result<BlackLevel, IsiError> {
        self.0.black_level()
    }
});
