//! The sensor interface implemented by every camera driver.

use core::fmt::{Display, Formatter};
use embedded_hal::i2c::ErrorKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Generic failure.
pub const RET_FAILURE: u32 = 1;
/// Operation not supported by the sensor.
pub const RET_NOTSUPP: u32 = 2;
/// Value out of range.
pub const RET_OUTOFRANGE: u32 = 6;
/// Resource not available.
pub const RET_NOTAVAILABLE: u32 = 10;
/// Operation not allowed in the current state.
pub const RET_WRONG_STATE: u32 = 12;
/// Invalid parameter.
pub const RET_INVALID_PARM: u32 = 13;

/// Errors reported by sensor drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsiError {
    /// The I2C transfer failed.
    Bus(ErrorKind),
    /// The chip id does not match the driver.
    ChipId {
        /// Id of the driver
        expected: u32,
        /// Id read from the sensor
        found: u32,
    },
    /// The sensor does not implement the operation.
    NotSupported,
    /// A value is outside of the sensor limits.
    OutOfRange,
    /// The mode index does not exist.
    InvalidMode,
    /// The operation is not allowed in the current state.
    WrongState,
    /// No driver is registered for the chip.
    NotAvailable,
}

impl IsiError {
    /// Status code of this error.
    pub fn code(&self) -> u32 {
        match self {
            Self::Bus(_) | Self::ChipId { .. } => RET_FAILURE,
            Self::NotSupported => RET_NOTSUPP,
            Self::OutOfRange => RET_OUTOFRANGE,
            Self::InvalidMode => RET_INVALID_PARM,
            Self::WrongState => RET_WRONG_STATE,
            Self::NotAvailable => RET_NOTAVAILABLE,
        }
    }
}

impl Display for IsiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(kind) => write!(f, "Bus error: {kind}"),
            Self::ChipId { expected, found } => {
                write!(f, "Chip id {found:#06x} does not match {expected:#06x}")
            }
            Self::NotSupported => write!(f, "Not supported"),
            Self::OutOfRange => write!(f, "Value out of range"),
            Self::InvalidMode => write!(f, "Invalid mode"),
            Self::WrongState => write!(f, "Wrong state"),
            Self::NotAvailable => write!(f, "No driver available"),
        }
    }
}

/// Gain in Q10 fixed point. `1024` is a gain of 1.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gain(u32);

impl Gain {
    /// Fractional bits
    pub const FRACTION_BITS: u32 = 10;
    /// Unity gain
    pub const ONE: Gain = Gain(1 << Self::FRACTION_BITS);

    /// Creates a gain from its Q10 representation.
    pub const fn from_q10(q10: u32) -> Self {
        Self(q10)
    }

    /// Creates a gain from an integer factor.
    pub const fn from_int(factor: u32) -> Self {
        Self(factor << Self::FRACTION_BITS)
    }

    /// Q10 representation.
    pub const fn q10(self) -> u32 {
        self.0
    }

    /// Converts to a fixed point value with `bits` fractional bits,
    /// truncating.
    pub const fn to_fixed(self, bits: u32) -> u32 {
        if bits >= Self::FRACTION_BITS {
            self.0 << (bits - Self::FRACTION_BITS)
        } else {
            self.0 >> (Self::FRACTION_BITS - bits)
        }
    }

    /// Converts from a fixed point value with `bits` fractional bits.
    pub const fn from_fixed(value: u32, bits: u32) -> Self {
        if bits >= Self::FRACTION_BITS {
            Self(value >> (bits - Self::FRACTION_BITS))
        } else {
            Self(value << (Self::FRACTION_BITS - bits))
        }
    }

    /// Limits the gain to `min..=max`.
    pub fn clamp_to(self, min: Gain, max: Gain) -> Self {
        self.max(min).min(max)
    }
}

/// High dynamic range mode of a sensor mode.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HdrMode {
    /// Single exposure
    #[default]
    Linear,
    /// Dual conversion gain
    Dcg,
    /// Two staggered exposures
    Stagger2,
}

/// Color filter array of the sensor output.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BayerPattern {
    #[default]
    Rggb,
    Grbg,
    Gbrg,
    Bggr,
    /// 4x4 RGB-IR pattern
    RgbIr,
}

/// An output mode of a sensor.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorMode {
    /// Index in the mode table of the driver.
    pub index: usize,
    /// Output width in pixels.
    pub width: u16,
    /// Output height in lines.
    pub height: u16,
    /// Native frame rate.
    pub fps: u32,
    /// HDR mode.
    pub hdr: HdrMode,
    /// Color filter array.
    pub bayer: BayerPattern,
    /// Bits per pixel.
    pub bit_width: u8,
    /// Pixel clock in Hz.
    pub pclk_hz: u32,
    /// Pixels per line including blanking.
    pub hts: u16,
    /// Lines per frame including blanking at the native frame rate.
    pub vts: u16,
}

impl SensorMode {
    /// Duration of one line in nanoseconds.
    pub fn line_time_ns(&self) -> u32 {
        if self.pclk_hz == 0 {
            return 0;
        }
        (self.hts as u64 * 1_000_000_000 / self.pclk_hz as u64) as u32
    }
}

/// Optional features of a sensor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorCaps {
    /// Number of MIPI CSI-2 lanes.
    pub lanes: u8,
    /// At least one HDR mode.
    pub hdr: bool,
    /// Digital gain.
    pub digital_gain: bool,
    /// White balance gains.
    pub white_balance: bool,
    /// Black level correction.
    pub black_level: bool,
    /// Test pattern output.
    pub test_pattern: bool,
}

/// Limits for the auto exposure in the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AeBaseInfo {
    /// Smallest analog gain.
    pub min_gain: Gain,
    /// Largest analog gain.
    pub max_gain: Gain,
    /// Smallest analog gain increment.
    pub gain_step: Gain,
    /// Largest digital gain, [Gain::ONE] if the sensor has none.
    pub max_digital_gain: Gain,
    /// Shortest integration time in microseconds.
    pub min_integration_time_us: u32,
    /// Longest integration time in microseconds at the current frame rate.
    pub max_integration_time_us: u32,
    /// Duration of one line in nanoseconds.
    pub one_line_time_ns: u32,
}

/// White balance gains in Q10.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct WbGains {
    pub r: Gain,
    pub gr: Gain,
    pub gb: Gain,
    pub b: Gain,
}

/// Black level per color channel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct BlackLevel {
    pub r: u16,
    pub gr: u16,
    pub gb: u16,
    pub b: u16,
}

/// Test pattern output by the sensor instead of the image.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestPattern {
    /// Normal image
    #[default]
    Off,
    /// Color bars
    ColorBars,
    /// Color bars fading to black
    FadeColorBars,
    /// Random data
    Random,
    /// Color squares
    Squares,
}

/// Interface to a camera sensor.
///
/// Optional operations have a default implementation returning
/// [IsiError::NotSupported].
pub trait IsiSensor {
    /// Name of the sensor model.
    fn name(&self) -> &'static str;

    /// Reads the chip id from the sensor.
    fn chip_id(&mut self) -> Result<u32, IsiError>;

    /// Checks that the sensor answers with the expected chip id.
    fn check_connection(&mut self) -> Result<(), IsiError>;

    /// Reads the silicon revision.
    fn revision(&mut self) -> Result<u8, IsiError>;

    /// Modes supported by the driver.
    fn modes(&self) -> &'static [SensorMode];

    /// Optional features of the sensor.
    fn caps(&self) -> SensorCaps;

    /// Programs the mode with `index`. The sensor must not be streaming.
    fn set_mode(&mut self, index: usize) -> Result<(), IsiError>;

    /// The programmed mode.
    fn current_mode(&self) -> Option<&'static SensorMode>;

    /// Starts or stops the output.
    fn set_streaming(&mut self, on: bool) -> Result<(), IsiError>;

    /// Exposure limits in the current mode.
    fn ae_base_info(&self) -> Result<AeBaseInfo, IsiError>;

    /// Sets the analog gain and returns the gain actually applied.
    fn set_analog_gain(&mut self, gain: Gain) -> Result<Gain, IsiError>;

    /// The applied analog gain.
    fn analog_gain(&self) -> Result<Gain, IsiError>;

    /// Sets the integration time and returns the time actually applied.
    fn set_integration_time(&mut self, time_us: u32) -> Result<u32, IsiError>;

    /// The applied integration time in microseconds.
    fn integration_time(&self) -> Result<u32, IsiError>;

    /// Lowers the frame rate below the native rate of the mode.
    fn set_fps(&mut self, fps: u32) -> Result<(), IsiError>;

    /// The current frame rate.
    fn fps(&self) -> Result<u32, IsiError>;

    /// Powers the sensor up and resets it.
    fn power_up(&mut self) -> Result<(), IsiError> {
        Err(IsiError::NotSupported)
    }

    /// Powers the sensor down.
    fn power_down(&mut self) -> Result<(), IsiError> {
        Err(IsiError::NotSupported)
    }

    /// Sets the digital gain and returns the gain actually applied.
    fn set_digital_gain(&mut self, _gain: Gain) -> Result<Gain, IsiError> {
        Err(IsiError::NotSupported)
    }

    /// The applied digital gain.
    fn digital_gain(&self) -> Result<Gain, IsiError> {
        Err(IsiError::NotSupported)
    }

    /// Sets the white balance gains.
    fn set_white_balance(&mut self, _gains: WbGains) -> Result<(), IsiError> {
        Err(IsiError::NotSupported)
    }

    /// The applied white balance gains.
    fn white_balance(&self) -> Result<WbGains, IsiError> {
        Err(IsiError::NotSupported)
    }

    /// Selects a test pattern.
    fn set_test_pattern(&mut self, _pattern: TestPattern) -> Result<(), IsiError> {
        Err(IsiError::NotSupported)
    }

    /// Sets the black level.
    fn set_black_level(&mut self, _level: BlackLevel) -> Result<(), IsiError> {
        Err(IsiError::NotSupported)
    }

    /// The applied black level.
    fn black_level(&self) -> Result<BlackLevel, IsiError> {
        Err(IsiError::NotSupported)
    }
}
