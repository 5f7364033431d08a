//! Demosaic driver. Converts a raw Bayer stream from a sensor into RGB.

use crate::{
    config::DemosaicConfig,
    error::{Error, XST_INVALID_PARAM},
    hls::{HlsCore, HlsError},
    mmio::RegisterIo,
    video::VideoStream,
};
use core::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Register map of the demosaic core.
pub mod regs {
    /// Frame width
    pub const WIDTH: usize = 0x10;
    /// Frame height
    pub const HEIGHT: usize = 0x18;
    /// Bayer phase of the first pixel
    pub const BAYER_PHASE: usize = 0x20;
}

/// Reads of the control register before [Demosaic::stop] gives up.
pub const STOP_POLL_LIMIT: u32 = 100_000;

/// Color of the first two pixels of the first two lines.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BayerPhase {
    /// R G / G B
    #[default]
    Rggb = 0,
    /// G R / B G
    Grbg = 1,
    /// G B / R G
    Gbrg = 2,
    /// B G / G R
    Bggr = 3,
}

impl BayerPhase {
    fn from_register(value: u32) -> Self {
        match value & 0x3 {
            1 => Self::Grbg,
            2 => Self::Gbrg,
            3 => Self::Bggr,
            _ => Self::Rggb,
        }
    }
}

/// Errors reported by the demosaic core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemosaicError {
    /// A parameter is out of range.
    InvalidParameter,
}

impl DemosaicError {
    /// Status code of this error.
    pub fn code(&self) -> u32 {
        XST_INVALID_PARAM
    }
}

impl Display for DemosaicError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "Invalid parameter"),
        }
    }
}

/// A demosaic instance.
#[derive(Debug, Clone)]
pub struct Demosaic<R: RegisterIo> {
    hls: HlsCore<R>,
    config: DemosaicConfig,
}

impl<R: RegisterIo> Demosaic<R> {
    /// Initializes the driver for the core described by `config`.
    pub fn initialize(config: DemosaicConfig, io: R) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            hls: HlsCore::new(io),
            config,
        })
    }

    /// Hardware configuration of this instance.
    pub fn config(&self) -> &DemosaicConfig {
        &self.config
    }

    /// Starts the core in free-running mode.
    pub fn start(&self) {
        self.hls.enable_auto_restart();
        self.hls.start();
    }

    /// Stops the core after the current frame.
    pub fn stop(&self) -> Result<(), HlsError> {
        self.hls.stop(STOP_POLL_LIMIT)
    }

    /// Sets the frame size. The width must be a multiple of the pixels per
    /// clock.
    pub fn set_size(&self, width: u32, height: u32) -> Result<(), DemosaicError> {
        if width == 0
            || height == 0
            || width > self.config.max_width
            || height > self.config.max_height
            || width % self.config.ppc.count() != 0
        {
            xv_warn!("Rejected demosaic size {}x{}", width, height);
            return Err(DemosaicError::InvalidParameter);
        }
        self.hls.io().write(regs::WIDTH, width);
        self.hls.io().write(regs::HEIGHT, height);
        Ok(())
    }

    /// Frame size as width and height.
    pub fn size(&self) -> (u32, u32) {
        (
            self.hls.io().read(regs::WIDTH),
            self.hls.io().read(regs::HEIGHT),
        )
    }

    /// Sets the Bayer phase of the sensor.
    pub fn set_bayer_phase(&self, phase: BayerPhase) {
        self.hls.io().write(regs::BAYER_PHASE, phase as u32);
    }

    /// Bayer phase of the sensor.
    pub fn bayer_phase(&self) -> BayerPhase {
        BayerPhase::from_register(self.hls.io().read(regs::BAYER_PHASE))
    }

    /// Sets size and Bayer phase for `stream`.
    pub fn configure(&self, stream: &VideoStream, phase: BayerPhase) -> Result<(), DemosaicError> {
        if stream.ppc != self.config.ppc || stream.color_depth > self.config.max_data_width {
            return Err(DemosaicError::InvalidParameter);
        }
        self.set_size(stream.width(), stream.height())?;
        self.set_bayer_phase(phase);
        xv_debug!(
            "Demosaic {} set to {}x{} {:?}",
            self.config.device_id,
            stream.width(),
            stream.height(),
            phase
        );
        Ok(())
    }
}
