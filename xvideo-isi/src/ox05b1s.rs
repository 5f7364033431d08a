//! OmniVision OX05B1S, a 5 MP RGB-IR sensor for driver monitoring.

use crate::{
    omnivision::{Descriptor, OvSensor},
    sensor::{BayerPattern, Gain, HdrMode, IsiError, SensorCaps, SensorMode, TestPattern},
};
use embedded_hal::i2c::I2c;

/// Chip id of the OX05B1S.
pub const CHIP_ID: u16 = 0x5805;
/// Default 7 bit SCCB address.
pub const DEFAULT_ADDRESS: u8 = 0x36;

static MODES: [SensorMode; 2] = [
    SensorMode {
        index: 0,
        width: 2592,
        height: 1944,
        fps: 30,
        hdr: HdrMode::Linear,
        bayer: BayerPattern::RgbIr,
        bit_width: 10,
        pclk_hz: 162_000_000,
        hts: 2700,
        vts: 2000,
    },
    SensorMode {
        index: 1,
        width: 1920,
        height: 1080,
        fps: 60,
        hdr: HdrMode::Linear,
        bayer: BayerPattern::RgbIr,
        bit_width: 10,
        pclk_hz: 162_000_000,
        hts: 2400,
        vts: 1125,
    },
];

static DESCRIPTOR: Descriptor = Descriptor {
    name: "OX05B1S",
    chip_id: CHIP_ID,
    modes: &MODES,
    caps: SensorCaps {
        lanes: 2,
        hdr: false,
        digital_gain: false,
        white_balance: false,
        black_level: false,
        test_pattern: true,
    },
    min_gain: Gain::ONE,
    max_gain: Gain::from_q10(0xFF << 6),
    max_digital_gain: Gain::ONE,
    exposure_margin: 16,
};

/// Driver of an OX05B1S.
#[derive(Debug)]
pub struct Ox05b1s<I2C>(OvSensor<I2C>);

impl<I2C: I2c> Ox05b1s<I2C> {
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

omnivision_sensor!(Ox05b1s, {
    fn set_test_pattern(&mut self, pattern: TestPattern) -> Result<(), IsiError> {
        self.0.set_test_pattern(pattern)
    }
});
