//! Sensor lifecycle on top of [IsiSensor] and runtime selection of drivers.

use crate::{
    ox03f10::{self, Ox03f10},
    ox05b1s::{self, Ox05b1s},
    ox08b40::{self, Ox08b40},
    sccb::Sccb,
    sensor::{
        AeBaseInfo, BlackLevel, Gain, IsiError, IsiSensor, SensorCaps, SensorMode, TestPattern,
        WbGains,
    },
};
use embedded_hal::i2c::I2c;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle state of a sensor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IssState {
    /// Driver created, sensor not touched
    #[default]
    Created,
    /// Sensor checked and mode programmed
    Opened,
    /// Sensor delivers frames
    Streaming,
}

/// Forwards a sensor operation and logs its failure.
macro_rules! forward {
    ($(#[$doc:meta])* $name:ident(&mut self $(, $arg:ident: $ty:ty)*) -> $ret:ty) => {
        $(#[$doc])*
        pub fn $name(&mut self $(, $arg: $ty)*) -> Result<$ret, IsiError> {
            let result = self.sensor.$name($($arg),*);
            self.logged(stringify!($name), result)
        }
    };
    ($(#[$doc:meta])* $name:ident(&self) -> $ret:ty) => {
        $(#[$doc])*
        pub fn $name(&self) -> Result<$ret, IsiError> {
            self.logged(stringify!($name), self.sensor.$name())
        }
    };
}

/// Handle to a sensor that enforces the open, stream, close order.
#[derive(Debug)]
pub struct Iss<S> {
    sensor: S,
    state: IssState,
}

fn tolerate_unsupported(result: Result<(), IsiError>) -> Result<(), IsiError> {
    match result {
        Err(IsiError::NotSupported) => Ok(()),
        r => r,
    }
}

impl<S: IsiSensor> Iss<S> {
    /// Wraps a sensor driver.
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            state: IssState::Created,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> IssState {
        self.state
    }

    /// The driver.
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// The driver. Changing the mode or the streaming state through it
    /// bypasses the lifecycle checks.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Returns the driver.
    pub fn into_inner(self) -> S {
        self.sensor
    }

    /// Checks the connection, powers the sensor up and programs `mode`.
    pub fn open(&mut self, mode: usize) -> Result<(), IsiError> {
        if self.state != IssState::Created {
            return Err(IsiError::WrongState);
        }
        self.sensor.check_connection()?;
        tolerate_unsupported(self.sensor.power_up())?;
        self.sensor.set_mode(mode)?;
        self.state = IssState::Opened;
        isi_info!("{} opened in mode {}", self.sensor.name(), mode);
        Ok(())
    }

    /// Stops streaming and powers the sensor down.
    ///
    /// The state follows every step that succeeded, so a failed power down
    /// leaves a sensor that is opened but no longer streaming.
    pub fn close(&mut self) -> Result<(), IsiError> {
        match self.state {
            IssState::Created => return Ok(()),
            IssState::Streaming => {
                self.sensor.set_streaming(false)?;
                self.state = IssState::Opened;
            }
            IssState::Opened => {}
        }
        tolerate_unsupported(self.sensor.power_down())?;
        self.state = IssState::Created;
        isi_info!("{} closed", self.sensor.name());
        Ok(())
    }

    /// Changes the mode of an open sensor that is not streaming.
    pub fn set_mode(&mut self, mode: usize) -> Result<(), IsiError> {
        if self.state != IssState::Opened {
            return Err(IsiError::WrongState);
        }
        self.sensor.set_mode(mode)
    }

    /// Starts or stops streaming. Repeating the current state is a no-op.
    pub fn set_streaming(&mut self, on: bool) -> Result<(), IsiError> {
        match (self.state, on) {
            (IssState::Created, _) => Err(IsiError::WrongState),
            (IssState::Opened, false) | (IssState::Streaming, true) => Ok(()),
            (IssState::Opened, true) => {
                self.sensor.set_streaming(true)?;
                self.state = IssState::Streaming;
                Ok(())
            }
            (IssState::Streaming, false) => {
                self.sensor.set_streaming(false)?;
                self.state = IssState::Opened;
                Ok(())
            }
        }
    }

    /// Applies an exposure request after clamping it to the limits of the
    /// current mode. Returns the applied gain and integration time.
    ///
    /// The integration time is written before the gain. If the gain cannot be
    /// written, the previous integration time is restored and the gain is left
    /// as it was.
    pub fn exposure_control(&mut self, gain: Gain, time_us: u32) -> Result<(Gain, u32), IsiError> {
        if self.state == IssState::Created {
            return Err(IsiError::WrongState);
        }
        let info = self.sensor.ae_base_info()?;
        if info.min_gain > info.max_gain
            || info.min_integration_time_us > info.max_integration_time_us
        {
            return Err(IsiError::OutOfRange);
        }
        let gain = gain.clamp_to(info.min_gain, info.max_gain);
        let time_us = time_us.clamp(info.min_integration_time_us, info.max_integration_time_us);
        let previous_time = self.sensor.integration_time()?;

        let time_us = self.sensor.set_integration_time(time_us).inspect_err(|e| {
            isi_warn!("{}: integration time failed: {}", self.sensor.name(), e);
        })?;
        match self.sensor.set_analog_gain(gain) {
            Ok(gain) => Ok((gain, time_us)),
            Err(e) => {
                isi_warn!("{}: analog gain failed: {}", self.sensor.name(), e);
                if let Err(restore) = self.sensor.set_integration_time(previous_time) {
                    isi_warn!(
                        "{}: integration time not restored: {}",
                        self.sensor.name(),
                        restore
                    );
                }
                Err(e)
            }
        }
    }

    fn logged<T>(&self, op: &str, result: Result<T, IsiError>) -> Result<T, IsiError> {
        match &result {
            Err(IsiError::NotSupported) => {
                isi_debug!("{}: {} not supported", self.sensor.name(), op)
            }
            Err(e) => isi_warn!("{}: {} failed: {}", self.sensor.name(), op, e),
            Ok(_) => {}
        }
        result
    }

    /// Name of the sensor model.
    pub fn name(&self) -> &'static str {
        self.sensor.name()
    }

    /// Modes of the sensor.
    pub fn modes(&self) -> &'static [SensorMode] {
        self.sensor.modes()
    }

    /// Capabilities of the sensor.
    pub fn caps(&self) -> SensorCaps {
        self.sensor.caps()
    }

    /// The programmed mode.
    pub fn current_mode(&self) -> Option<&'static SensorMode> {
        self.sensor.current_mode()
    }

    forward!(
        /// Reads the chip id.
        chip_id(&mut self) -> u32
    );
    forward!(
        /// Reads the silicon revision.
        revision(&mut self) -> u8
    );
    forward!(
        /// Exposure limits of the current mode.
        ae_base_info(&self) -> AeBaseInfo
    );
    forward!(
        /// Sets the analog gain. Returns the gain after quantization.
        set_analog_gain(&mut self, gain: Gain) -> Gain
    );
    forward!(
        /// The analog gain.
        analog_gain(&self) -> Gain
    );
    forward!(
        /// Sets the integration time. Returns the applied time.
        set_integration_time(&mut self, time_us: u32) -> u32
    );
    forward!(
        /// The integration time in us.
        integration_time(&self) -> u32
    );
    forward!(
        /// Lowers the frame rate below the native rate of the mode.
        set_fps(&mut self, fps: u32) -> ()
    );
    forward!(
        /// The frame rate.
        fps(&self) -> u32
    );
    forward!(
        /// Sets the digital gain. Returns the applied gain.
        set_digital_gain(&mut self, gain: Gain) -> Gain
    );
    forward!(
        /// The digital gain.
        digital_gain(&self) -> Gain
    );
    forward!(
        /// Sets the white balance gains.
        set_white_balance(&mut self, gains: WbGains) -> ()
    );
    forward!(
        /// The white balance gains.
        white_balance(&self) -> WbGains
    );
    forward!(
        /// Replaces the image with a test pattern.
        set_test_pattern(&mut self, pattern: TestPattern) -> ()
    );
    forward!(
        /// Sets the black level.
        set_black_level(&mut self, level: BlackLevel) -> ()
    );
    forward!(
        /// The black level.
        black_level(&self) -> BlackLevel
    );
}

/// Supported sensor models.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorModel {
    /// OmniVision OX03F10
    Ox03f10,
    /// OmniVision OX05B1S
    Ox05b1s,
    /// OmniVision OX08B40
    Ox08b40,
}

impl SensorModel {
    /// All models with a driver.
    pub const ALL: [SensorModel; 3] = [Self::Ox03f10, Self::Ox05b1s, Self::Ox08b40];

    /// Chip id reported by the model.
    pub fn chip_id(&self) -> u32 {
        let id = match self {
            Self::Ox03f10 => ox03f10::CHIP_ID,
            Self::Ox05b1s => ox05b1s::CHIP_ID,
            Self::Ox08b40 => ox08b40::CHIP_ID,
        };
        id as u32
    }

    /// Model with the chip id `id`.
    pub fn from_chip_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.chip_id() == id)
    }

    /// Creates the driver for the sensor at `address`.
    pub fn create<I2C: I2c>(self, i2c: I2C, address: u8) -> AnySensor<I2C> {
        match self {
            Self::Ox03f10 => AnySensor::Ox03f10(Ox03f10::new(i2c, address)),
            Self::Ox05b1s => AnySensor::Ox05b1s(Ox05b1s::new(i2c, address)),
            Self::Ox08b40 => AnySensor::Ox08b40(Ox08b40::new(i2c, address)),
        }
    }
}

/// Reads the chip id at `address` and creates the matching driver.
///
/// The bus is consumed. Pass `&mut bus` to keep it on failure.
pub fn probe<I2C: I2c>(i2c: I2C, address: u8) -> Result<AnySensor<I2C>, IsiError> {
    let mut sccb = Sccb::new(i2c, address);
    let id = sccb.read_reg16(crate::omnivision::regs::CHIP_ID)? as u32;
    let Some(model) = SensorModel::from_chip_id(id) else {
        isi_warn!("No driver for chip id {:#06x} at {:#04x}", id, address);
        return Err(IsiError::NotAvailable);
    };
    isi_info!("Found {:?} at {:#04x}", model, address);
    Ok(model.create(sccb.release(), address))
}

/// Sensor attached to a board.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorConfig {
    /// Sensor model
    pub model: SensorModel,
    /// 7 bit SCCB address
    pub address: u8,
    /// Mode to open the sensor in
    pub mode: usize,
}

impl SensorConfig {
    /// Creates the driver and opens the sensor.
    pub fn open<I2C: I2c>(&self, i2c: I2C) -> Result<Iss<AnySensor<I2C>>, IsiError> {
        let mut iss = Iss::new(self.model.create(i2c, self.address));
        iss.open(self.mode)?;
        Ok(iss)
    }
}

/// Any of the supported sensor drivers.
#[derive(Debug)]
pub enum AnySensor<I2C> {
    /// OX03F10 driver
    Ox03f10(Ox03f10<I2C>),
    /// OX05B1S driver
    Ox05b1s(Ox05b1s<I2C>),
    /// OX08B40 driver
    Ox08b40(Ox08b40<I2C>),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $e:expr) => {
        match $self {
            AnySensor::Ox03f10($s) => $e,
            AnySensor::Ox05b1s($s) => $e,
            AnySensor::Ox08b40($s) => $e,
        }
    };
}

impl<I2C: I2c> AnySensor<I2C> {
    /// Model of the driver.
    pub fn model(&self) -> SensorModel {
        match self {
            Self::Ox03f10(_) => SensorModel::Ox03f10,
            Self::Ox05b1s(_) => SensorModel::Ox05b1s,
            Self::Ox08b40(_) => SensorModel::Ox08b40,
        }
    }

    /// Returns the bus.
    pub fn release(self) -> I2C {
        dispatch!(self, s => s.release())
    }
}

impl<I2C: I2c> IsiSensor for AnySensor<I2C> {
    fn name(&self) -> &'static str {
        dispatch!(self, s => s.name())
    }

    fn chip_id(&mut self) -> Result<u32, IsiError> {
        dispatch!(self, s => s.chip_id())
    }

    fn check_connection(&mut self) -> Result<(), IsiError> {
        dispatch!(self, s => s.check_connection())
    }

    fn revision(&mut self) -> Result<u8, IsiError> {
        dispatch!(self, s => s.revision())
    }

    fn modes(&self) -> &'static [SensorMode] {
        dispatch!(self, s => s.modes())
    }

    fn caps(&self) -> SensorCaps {
        dispatch!(self, s => s.caps())
    }

    fn set_mode(&mut self, index: usize) -> Result<(), IsiError> {
        dispatch!(self, s => s.set_mode(index))
    }

    fn current_mode(&self) -> Option<&'static SensorMode> {
        dispatch!(self, s => s.current_mode())
    }

    fn set_streaming(&mut self, on: bool) -> Result<(), IsiError> {
        dispatch!(self, s => s.set_streaming(on))
    }

    fn ae_base_info(&self) -> Result<AeBaseInfo, IsiError> {
        dispatch!(self, s => s.ae_base_info())
    }

    fn set_analog_gain(&mut self, gain: Gain) -> Result<Gain, IsiError> {
        dispatch!(self, s => s.set_analog_gain(gain))
    }

    fn analog_gain(&self) -> Result<Gain, IsiError> {
        dispatch!(self, s => s.analog_gain())
    }

    fn set_integration_time(&mut self, time_us: u32) -> Result<u32, IsiError> {
        dispatch!(self, s => s.set_integration_time(time_us))
    }

    fn integration_time(&self) -> Result<u32, IsiError> {
        dispatch!(self, s => s.integration_time())
    }

    fn set_fps(&mut self, fps: u32) -> Result<(), IsiError> {
        dispatch!(self, s => s.set_fps(fps))
    }

    fn fps(&self) -> Result<u32, IsiError> {
        dispatch!(self, s => s.fps())
    }

    fn power_up(&mut self) -> Result<(), IsiError> {
        dispatch!(self, s => s.power_up())
    }

    fn power_down(&mut self) -> Result<(), IsiError> {
        dispatch!(self, s => s.power_down())
    }

    fn set_digital_gain(&mut self, gain: Gain) -> Result<Gain, IsiError> {
        dispatch!(self, s => s.set_digital_gain(gain))
    }

    fn digital_gain(&self) -> Result<Gain, IsiError> {
        dispatch!(self, s => s.digital_gain())
    }

    fn set_white_balance(&mut self, gains: WbGains) -> Result<(), IsiError> {
        dispatch!(self, s => s.set_white_balance(gains))
    }

    fn white_balance(&self) -> Result<WbGains, IsiError> {
        dispatch!(self, s => s.white_balance())
    }

    fn set_test_pattern(&mut self, pattern: TestPattern) -> Result<(), IsiError> {
        dispatch!(self, s => s.set_test_pattern(pattern))
    }

    fn set_black_level(&mut self, level: BlackLevel) -> Result<(), IsiError> {
        dispatch!(self, s => s.set_black_level(level))
    }

    fn black_level(&self) -> Result<BlackLevel, IsiError> {
        dispatch!(self, s => s.black_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        omnivision::regs,
        sccb::testing::FakeBus,
        sensor::{BayerPattern, HdrMode},
    };
    use embedded_hal::i2c::ErrorKind;

    static FIXED_MODE: [SensorMode; 1] = [SensorMode {
        index: 0,
        width: 640,
        height: 480,
        fps: 30,
        hdr: HdrMode::Linear,
        bayer: BayerPattern::Grbg,
        bit_width: 8,
        pclk_hz: 12_000_000,
        hts: 800,
        vts: 500,
    }];

    /// Sensor with only the mandatory operations.
    #[derive(Debug, Default)]
    struct FixedSensor {
        mode: Option<&'static SensorMode>,
        streaming: bool,
    }

    impl IsiSensor for FixedSensor {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn chip_id(&mut self) -> Result<u32, IsiError> {
            Ok(1)
        }

        fn check_connection(&mut self) -> Result<(), IsiError> {
            Ok(())
        }

        fn revision(&mut self) -> Result<u8, IsiError> {
            Ok(0)
        }

        fn modes(&self) -> &'static [SensorMode] {
            &FIXED_MODE
        }

        fn caps(&self) -> SensorCaps {
            SensorCaps::default()
        }

        fn set_mode(&mut self, index: usize) -> Result<(), IsiError> {
            self.mode = Some(FIXED_MODE.get(index).ok_or(IsiError::InvalidMode)?);
            Ok(())
        }

        fn current_mode(&self) -> Option<&'static SensorMode> {
            self.mode
        }

        fn set_streaming(&mut self, on: bool) -> Result<(), IsiError> {
            self.streaming = on;
            Ok(())
        }

        fn ae_base_info(&self) -> Result<AeBaseInfo, IsiError> {
            Err(IsiError::NotSupported)
        }

        fn set_analog_gain(&mut self, _gain: Gain) -> Result<Gain, IsiError> {
            Ok(Gain::ONE)
        }

        fn analog_gain(&self) -> Result<Gain, IsiError> {
            Ok(Gain::ONE)
        }

        fn set_integration_time(&mut self, _time_us: u32) -> Result<u32, IsiError> {
            Err(IsiError::NotSupported)
        }

        fn integration_time(&self) -> Result<u32, IsiError> {
            Err(IsiError::NotSupported)
        }

        fn set_fps(&mut self, _fps: u32) -> Result<(), IsiError> {
            Err(IsiError::NotSupported)
        }

        fn fps(&self) -> Result<u32, IsiError> {
            Ok(30)
        }
    }

    #[test]
    fn lifecycle() {
        let mut iss = Iss::new(FixedSensor::default());
        assert_eq!(iss.set_streaming(true), Err(IsiError::WrongState));
        iss.open(0).unwrap();
        assert_eq!(iss.open(0), Err(IsiError::WrongState));
        iss.set_streaming(true).unwrap();
        iss.set_streaming(true).unwrap();
        assert_eq!(iss.state(), IssState::Streaming);
        assert_eq!(iss.set_mode(0), Err(IsiError::WrongState));
        iss.close().unwrap();
        assert_eq!(iss.state(), IssState::Created);
        assert!(!iss.sensor().streaming);
    }

    #[test]
    fn forwards_to_driver() {
        let mut iss = Iss::new(FixedSensor::default());
        iss.open(0).unwrap();
        assert_eq!(iss.name(), "fixed");
        assert_eq!(iss.chip_id(), Ok(1));
        assert_eq!(iss.fps(), Ok(30));
        assert_eq!(iss.current_mode().map(|m| m.vts), Some(500));
        assert_eq!(iss.set_fps(25), Err(IsiError::NotSupported));
        assert_eq!(
            iss.set_white_balance(WbGains::default()),
            Err(IsiError::NotSupported)
        );
        assert_eq!(iss.black_level(), Err(IsiError::NotSupported));
        assert_eq!(iss.state(), IssState::Opened);
    }

    #[test]
    fn exposure_is_clamped() {
        let bus = FakeBus::with_chip_id(0x36, ox03f10::CHIP_ID);
        let mut iss = Iss::new(Ox03f10::new(bus, 0x36));
        assert_eq!(
            iss.exposure_control(Gain::ONE, 1000),
            Err(IsiError::WrongState)
        );
        iss.open(0).unwrap();
        let (gain, time) = iss.exposure_control(Gain::from_int(40), 1_000_000).unwrap();
        assert_eq!(gain, Gain::from_q10(15 * 1024 + 512));
        assert_eq!(time, 33_145);
        let (gain, time) = iss.exposure_control(Gain::from_q10(100), 0).unwrap();
        assert_eq!(gain, Gain::ONE);
        assert_eq!(time, 20);
        let bus = iss.into_inner().release();
        assert_eq!(bus.reg16(regs::EXPOSURE), 1);
    }

    #[test]
    fn probe_finds_driver() {
        for model in SensorModel::ALL {
            let bus = FakeBus::with_chip_id(0x10, model.chip_id() as u16);
            let mut sensor = probe(bus, 0x10).unwrap();
            assert_eq!(sensor.model(), model);
            sensor.check_connection().unwrap();
        }
        let mut bus = FakeBus::with_chip_id(0x10, 0x7750);
        assert_eq!(probe(&mut bus, 0x10).err(), Some(IsiError::NotAvailable));
        assert_eq!(probe(&mut bus, 0x11).err(), Some(IsiError::Bus(ErrorKind::Other)));
    }

    #[test]
    fn open_from_config() {
        let config = SensorConfig {
            model: SensorModel::Ox08b40,
            address: 0x36,
            mode: 1,
        };
        let mut iss = config
            .open(FakeBus::with_chip_id(0x36, ox08b40::CHIP_ID))
            .unwrap();
        assert_eq!(iss.state(), IssState::Opened);
        assert_eq!(iss.sensor().current_mode().map(|m| m.width), Some(1920));
        assert_eq!(
            iss.set_digital_gain(Gain::from_int(2)),
            Ok(Gain::from_int(2))
        );
        iss.set_streaming(true).unwrap();
        iss.close().unwrap();
        assert_eq!(iss.into_inner().release().reg(regs::STREAM), 0);

        let wrong = SensorConfig {
            model: SensorModel::Ox05b1s,
            ..config
        };
        assert!(matches!(
            wrong.open(FakeBus::with_chip_id(0x36, ox08b40::CHIP_ID)),
            Err(IsiError::ChipId { .. })
        ));
    }
}
