//! OmniVision OX03F10, a 3 MP automotive sensor with dual conversion gain.

use crate::{
    omnivision::{Descriptor, OvSensor},
    sensor::{
        BayerPattern, BlackLevel, Gain, HdrMode, IsiError, SensorCaps, SensorMode, WbGains,
    },
};
use embedded_hal::i2c::I2c;

/// Chip id of the OX03F10.
pub const CHIP_ID: u16 = 0x5803;
/// Default 7 bit SCCB address.
pub const DEFAULT_ADDRESS: u8 = 0x36;

static MODES: [SensorMode; 2] = [
    SensorMode {
        index: 0,
        width: 1920,
        height: 1536,
        fps: 30,
        hdr: HdrMode::Dcg,
        bayer: BayerPattern::Bggr,
        bit_width: 12,
        pclk_hz: 126_720_000,
        hts: 2640,
        vts: 1600,
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
    name: "OX03F10",
    chip_id: CHIP_ID,
    modes: &MODES,
    caps: SensorCaps {
        lanes: 4,
        hdr: true,
        digital_gain: false,
        white_balance: true,
        black_level: true,
        test_pattern: false,
    },
    min_gain: Gain::ONE,
    max_gain: Gain::from_q10(15 * 1024 + 512),
    max_digital_gain: Gain::ONE,
    exposure_margin: 8,
};

/// Driver of an OX03F10.
#[derive(Debug)]
pub struct Ox03f10<I2C>(OvSensor<I2C>);

impl<I2C: I2c> Ox03f10<I2C> {
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

omnivision_sensor!(Ox03f10, {
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
