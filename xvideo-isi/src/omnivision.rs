//! Register conventions shared by the OmniVision automotive sensors.

use crate::{
    sccb::Sccb,
    sensor::{
        AeBaseInfo, BlackLevel, Gain, IsiError, SensorCaps, SensorMode, TestPattern, WbGains,
    },
};
use embedded_hal::i2c::I2c;

/// Register addresses.
pub mod regs {
    /// Streaming control
    pub const STREAM: u16 = 0x0100;
    /// Software reset
    pub const SOFT_RESET: u16 = 0x0103;
    /// Chip id, 16 bit
    pub const CHIP_ID: u16 = 0x300A;
    /// Silicon revision
    pub const REVISION: u16 = 0x302A;
    /// Exposure in lines, 16 bit
    pub const EXPOSURE: u16 = 0x3501;
    /// Analog gain, integer part in bits 3:0
    pub const AGAIN_HI: u16 = 0x3508;
    /// Analog gain, fraction in bits 7:4
    pub const AGAIN_LO: u16 = 0x3509;
    /// Digital gain, integer part in bits 3:0
    pub const DGAIN_HI: u16 = 0x350A;
    /// Digital gain, fraction bits 9:2
    pub const DGAIN_MID: u16 = 0x350B;
    /// Digital gain, fraction bits 1:0 in bits 7:6
    pub const DGAIN_LO: u16 = 0x350C;
    /// Output width, 16 bit
    pub const X_OUTPUT: u16 = 0x3808;
    /// Output height, 16 bit
    pub const Y_OUTPUT: u16 = 0x380A;
    /// Pixels per line, 16 bit
    pub const HTS: u16 = 0x380C;
    /// Lines per frame, 16 bit
    pub const VTS: u16 = 0x380E;
    /// Black level of R, Gr, Gb and B, 16 bit each
    pub const BLACK_LEVEL: u16 = 0x4026;
    /// Test pattern control
    pub const TEST_PATTERN: u16 = 0x5080;
    /// White balance gains of R, Gr, Gb and B, 16 bit each
    pub const WB_GAIN: u16 = 0x5280;
}

const WB_GAIN_MAX: u32 = 0x3FFF;
const BLACK_LEVEL_MAX: u16 = 0x3FF;
const AGAIN_FRACTION_BITS: u32 = 4;

/// Static description of a sensor model.
#[derive(Debug)]
pub(crate) struct Descriptor {
    pub(crate) name: &'static str,
    pub(crate) chip_id: u16,
    pub(crate) modes: &'static [SensorMode],
    pub(crate) caps: SensorCaps,
    pub(crate) min_gain: Gain,
    pub(crate) max_gain: Gain,
    pub(crate) max_digital_gain: Gain,
    /// Lines between the end of the exposure and the end of the frame.
    pub(crate) exposure_margin: u16,
}

/// State of one OmniVision sensor.
#[derive(Debug)]
pub(crate) struct OvSensor<I2C> {
    sccb: Sccb<I2C>,
    desc: &'static Descriptor,
    mode: Option<&'static SensorMode>,
    streaming: bool,
    vts: u16,
    exposure_lines: u32,
    again: Gain,
    dgain: Gain,
    wb: WbGains,
    black_level: BlackLevel,
}

impl<I2C: I2c> OvSensor<I2C> {
    pub(crate) fn new(i2c: I2C, address: u8, desc: &'static Descriptor) -> Self {
        Self {
            sccb: Sccb::new(i2c, address),
            desc,
            mode: None,
            streaming: false,
            vts: 0,
            exposure_lines: 0,
            again: desc.min_gain,
            dgain: Gain::ONE,
            wb: WbGains {
                r: Gain::ONE,
                gr: Gain::ONE,
                gb: Gain::ONE,
                b: Gain::ONE,
            },
            black_level: BlackLevel::default(),
        }
    }

    pub(crate) fn release(self) -> I2C {
        self.sccb.release()
    }

    fn mode(&self) -> Result<&'static SensorMode, IsiError> {
        self.mode.ok_or(IsiError::WrongState)
    }

    fn max_exposure_lines(&self) -> u32 {
        self.vts.saturating_sub(self.desc.exposure_margin) as u32
    }

    pub(crate) fn name(&self) -> &'static str {
        self.desc.name
    }

    pub(crate) fn chip_id(&mut self) -> Result<u32, IsiError> {
        Ok(self.sccb.read_reg16(regs::CHIP_ID)? as u32)
    }

    pub(crate) fn check_connection(&mut self) -> Result<(), IsiError> {
        let found = self.chip_id()?;
        let expected = self.desc.chip_id as u32;
        if found != expected {
            isi_warn!("{}: unexpected chip id {:#06x}", self.desc.name, found);
            return Err(IsiError::ChipId { expected, found });
        }
        Ok(())
    }

    pub(crate) fn revision(&mut self) -> Result<u8, IsiError> {
        self.sccb.read_reg(regs::REVISION)
    }

    pub(crate) fn modes(&self) -> &'static [SensorMode] {
        self.desc.modes
    }

    pub(crate) fn caps(&self) -> SensorCaps {
        self.desc.caps
    }

    pub(crate) fn set_mode(&mut self, index: usize) -> Result<(), IsiError> {
        if self.streaming {
            return Err(IsiError::WrongState);
        }
        let mode = self.desc.modes.get(index).ok_or(IsiError::InvalidMode)?;
        self.sccb.write_reg16(regs::X_OUTPUT, mode.width)?;
        self.sccb.write_reg16(regs::Y_OUTPUT, mode.height)?;
        self.sccb.write_reg16(regs::HTS, mode.hts)?;
        self.sccb.write_reg16(regs::VTS, mode.vts)?;
        self.mode = Some(mode);
        self.vts = mode.vts;
        let lines = self.max_exposure_lines() / 2;
        self.write_exposure(lines)?;
        _ = self.set_analog_gain(self.desc.min_gain)?;
        isi_debug!(
            "{}: mode {} {}x{}@{}",
            self.desc.name,
            index,
            mode.width,
            mode.height,
            mode.fps
        );
        Ok(())
    }

    pub(crate) fn current_mode(&self) -> Option<&'static SensorMode> {
        self.mode
    }

    pub(crate) fn set_streaming(&mut self, on: bool) -> Result<(), IsiError> {
        _ = self.mode()?;
        self.sccb.write_reg(regs::STREAM, on as u8)?;
        self.streaming = on;
        isi_debug!("{}: streaming {}", self.desc.name, on);
        Ok(())
    }

    pub(crate) fn ae_base_info(&self) -> Result<AeBaseInfo, IsiError> {
        let mode = self.mode()?;
        let line = mode.line_time_ns();
        let max_digital_gain = if self.desc.caps.digital_gain {
            self.desc.max_digital_gain
        } else {
            Gain::ONE
        };
        Ok(AeBaseInfo {
            min_gain: self.desc.min_gain,
            max_gain: self.desc.max_gain,
            gain_step: Gain::from_fixed(1, AGAIN_FRACTION_BITS),
            max_digital_gain,
            min_integration_time_us: line.div_ceil(1000),
            max_integration_time_us: (self.max_exposure_lines() as u64 * line as u64 / 1000)
                as u32,
            one_line_time_ns: line,
        })
    }

    pub(crate) fn set_analog_gain(&mut self, gain: Gain) -> Result<Gain, IsiError> {
        if gain < self.desc.min_gain || gain > self.desc.max_gain {
            return Err(IsiError::OutOfRange);
        }
        let q4 = gain.to_fixed(AGAIN_FRACTION_BITS);
        self.sccb.write_regs(&[
            (regs::AGAIN_HI, (q4 >> 4) as u8 & 0x0F),
            (regs::AGAIN_LO, ((q4 & 0x0F) << 4) as u8),
        ])?;
        self.again = Gain::from_fixed(q4, AGAIN_FRACTION_BITS);
        Ok(self.again)
    }

    pub(crate) fn analog_gain(&self) -> Result<Gain, IsiError> {
        Ok(self.again)
    }

    fn write_exposure(&mut self, lines: u32) -> Result<(), IsiError> {
        self.sccb.write_reg16(regs::EXPOSURE, lines as u16)?;
        self.exposure_lines = lines;
        Ok(())
    }

    pub(crate) fn set_integration_time(&mut self, time_us: u32) -> Result<u32, IsiError> {
        let line = self.mode()?.line_time_ns() as u64;
        if line == 0 {
            return Err(IsiError::WrongState);
        }
        let lines = time_us as u64 * 1000 / line;
        if lines == 0 || lines > self.max_exposure_lines() as u64 {
            return Err(IsiError::OutOfRange);
        }
        self.write_exposure(lines as u32)?;
        Ok((lines * line / 1000) as u32)
    }

    pub(crate) fn integration_time(&self) -> Result<u32, IsiError> {
        let line = self.mode()?.line_time_ns() as u64;
        Ok((self.exposure_lines as u64 * line / 1000) as u32)
    }

    pub(crate) fn set_fps(&mut self, fps: u32) -> Result<(), IsiError> {
        let mode = self.mode()?;
        if fps == 0 || fps > mode.fps {
            return Err(IsiError::OutOfRange);
        }
        let vts = mode.pclk_hz as u64 / (mode.hts as u64 * fps as u64);
        let vts = u16::try_from(vts)
            .or(Err(IsiError::OutOfRange))?
            .max(mode.vts);
        self.sccb.write_reg16(regs::VTS, vts)?;
        self.vts = vts;
        if self.exposure_lines > self.max_exposure_lines() {
            self.write_exposure(self.max_exposure_lines())?;
        }
        isi_debug!("{}: {} fps, VTS {}", self.desc.name, fps, vts);
        Ok(())
    }

    pub(crate) fn fps(&self) -> Result<u32, IsiError> {
        let mode = self.mode()?;
        let frame = mode.hts as u64 * self.vts as u64;
        if frame == 0 {
            return Err(IsiError::WrongState);
        }
        Ok((mode.pclk_hz as u64 / frame) as u32)
    }

    pub(crate) fn power_up(&mut self) -> Result<(), IsiError> {
        self.sccb.write_reg(regs::SOFT_RESET, 1)?;
        self.mode = None;
        self.streaming = false;
        Ok(())
    }

    pub(crate) fn power_down(&mut self) -> Result<(), IsiError> {
        self.sccb.write_reg(regs::STREAM, 0)?;
        self.streaming = false;
        Ok(())
    }

    pub(crate) fn set_digital_gain(&mut self, gain: Gain) -> Result<Gain, IsiError> {
        if gain < Gain::ONE || gain > self.desc.max_digital_gain {
            return Err(IsiError::OutOfRange);
        }
        let q10 = gain.q10();
        self.sccb.write_regs(&[
            (regs::DGAIN_HI, (q10 >> 10) as u8 & 0x0F),
            (regs::DGAIN_MID, (q10 >> 2) as u8),
            (regs::DGAIN_LO, ((q10 & 0x3) << 6) as u8),
        ])?;
        self.dgain = gain;
        Ok(gain)
    }

    pub(crate) fn digital_gain(&self) -> Result<Gain, IsiError> {
        Ok(self.dgain)
    }

    pub(crate) fn set_white_balance(&mut self, gains: WbGains) -> Result<(), IsiError> {
        let channels = [gains.r, gains.gr, gains.gb, gains.b];
        if channels.iter().any(|g| g.q10() > WB_GAIN_MAX) {
            return Err(IsiError::OutOfRange);
        }
        for (i, g) in channels.iter().enumerate() {
            self.sccb
                .write_reg16(regs::WB_GAIN + 2 * i as u16, g.q10() as u16)?;
        }
        self.wb = gains;
        Ok(())
    }

    pub(crate) fn white_balance(&self) -> Result<WbGains, IsiError> {
        Ok(self.wb)
    }

    pub(crate) fn set_test_pattern(&mut self, pattern: TestPattern) -> Result<(), IsiError> {
        let value = match pattern {
            TestPattern::Off => 0x00,
            TestPattern::ColorBars => 0x80,
            TestPattern::FadeColorBars => 0x84,
            TestPattern::Random => 0x88,
            TestPattern::Squares => 0x8C,
        };
        self.sccb.write_reg(regs::TEST_PATTERN, value)
    }

    pub(crate) fn set_black_level(&mut self, level: BlackLevel) -> Result<(), IsiError> {
        let channels = [level.r, level.gr, level.gb, level.b];
        if channels.iter().any(|l| *l > BLACK_LEVEL_MAX) {
            return Err(IsiError::OutOfRange);
        }
        for (i, l) in channels.iter().enumerate() {
            self.sccb
                .write_reg16(regs::BLACK_LEVEL + 2 * i as u16, *l)?;
        }
        self.black_level = level;
        Ok(())
    }

    pub(crate) fn black_level(&self) -> Result<BlackLevel, IsiError> {
        Ok(self.black_level)
    }
}

/// Implements [crate::sensor::IsiSensor] for a newtype around [OvSensor].
/// Optional operations supported by the model are passed in the block.
macro_rules! omnivision_sensor {
    ($name:ident, { $($optional:tt)* }) => {
        impl<I2C: embedded_hal::i2c::I2c> $crate::sensor::IsiSensor for $name<I2C> {
            fn name(&self) -> &'static str {
                self.0.name()
            }

            fn chip_id(&mut self) -> Result<u32, $crate::sensor::IsiError> {
                self.0.chip_id()
            }

            fn check_connection(&mut self) -> Result<(), $crate::sensor::IsiError> {
                self.0.check_connection()
            }

            fn revision(&mut self) -> Result<u8, $crate::sensor::IsiError> {
                self.0.revision()
            }

            fn modes(&self) -> &'static [$crate::sensor::SensorMode] {
                self.0.modes()
            }

            fn caps(&self) -> $crate::sensor::SensorCaps {
                self.0.caps()
            }

            fn set_mode(&mut self, index: usize) -> Result<(), $crate::sensor::IsiError> {
                self.0.set_mode(index)
            }

            fn current_mode(&self) -> Option<&'static $crate::sensor::SensorMode> {
                self.0.current_mode()
            }

            fn set_streaming(&mut self, on: bool) -> Result<(), $crate::sensor::IsiError> {
                self.0.set_streaming(on)
            }

            fn ae_base_info(&self) -> Result<$crate::sensor::AeBaseInfo, $crate::sensor::IsiError> {
                self.0.ae_base_info()
            }

            fn set_analog_gain(
                &mut self,
                gain: $crate::sensor::Gain,
            ) -> Result<$crate::sensor::Gain, $crate::sensor::IsiError> {
                self.0.set_analog_gain(gain)
            }

            fn analog_gain(&self) -> Result<$crate::sensor::Gain, $crate::sensor::IsiError> {
                self.0.analog_gain()
            }

            fn set_integration_time(&mut self, time_us: u32) -> Result<u32, $crate::sensor::IsiError> {
                self.0.set_integration_time(time_us)
            }

            fn integration_time(&self) -> Result<u32, $crate::sensor::IsiError> {
                self.0.integration_time()
            }

            fn set_fps(&mut self, fps: u32) -> Result<(), $crate::sensor::IsiError> {
                self.0.set_fps(fps)
            }

            fn fps(&self) -> Result<u32, $crate::sensor::IsiError> {
                self.0.fps()
            }

            fn power_up(&mut self) -> Result<(), $crate::sensor::IsiError> {
                self.0.power_up()
            }

            fn power_down(&mut self) -> Result<(), $crate::sensor::IsiError> {
                self.0.power_down()
            }

            $($optional)*
        }
    };
}
