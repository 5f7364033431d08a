//! Hardware configuration of the video IP cores.
//!
//! Every IP instance of a design is described by a `*Config` struct holding
//! its device id, the base address of its register window, and the
//! capabilities selected when the core was synthesized. A board is described
//! by a [HardwareConfig] which is either read from YAML, decoded from
//! `postcard`, or built with [HardwareConfigBuilder].

use crate::video::{ColorDepth, ColorFormat, PixelsPerClock};
use core::fmt::{Display, Formatter};
use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of overlay layers of the mixer, not counting the master
/// layer and the logo layer.
pub const MAX_OVERLAY_LAYERS: usize = 16;

/// Upper bound of the maximum width and height of any core.
pub const MAX_RESOLUTION: u32 = 8192;

/// Identifies one IP instance of a design.
pub type DeviceId = u16;

/// How an overlay layer receives its pixels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerInterface {
    /// The layer reads a frame buffer over AXI4 memory-mapped.
    Memory,
    /// The layer receives an AXI4-Stream.
    Stream,
}

/// Capabilities of one overlay layer of the mixer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerConfig {
    /// Interface of the layer.
    pub interface: LayerInterface,
    /// Color format of the layer.
    pub color_format: ColorFormat,
    /// Layer has a global alpha register.
    #[cfg_attr(feature = "serde", serde(default))]
    pub alpha: bool,
    /// Layer can be upscaled by 2 or 4.
    #[cfg_attr(feature = "serde", serde(default))]
    pub scale: bool,
    /// Maximum width of the layer window in pixels.
    pub max_width: u32,
}

impl LayerConfig {
    /// A memory layer with alpha and scaling.
    pub const fn memory(color_format: ColorFormat, max_width: u32) -> Self {
        Self {
            interface: LayerInterface::Memory,
            color_format,
            alpha: true,
            scale: true,
            max_width,
        }
    }

    /// A stream layer with alpha and scaling.
    pub const fn stream(color_format: ColorFormat, max_width: u32) -> Self {
        Self {
            interface: LayerInterface::Stream,
            color_format,
            alpha: true,
            scale: true,
            max_width,
        }
    }
}

/// Capabilities of the mixer logo layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogoConfig {
    /// Maximum logo width. Multiple of 4.
    pub max_width: u32,
    /// Maximum logo height.
    pub max_height: u32,
    /// Logo supports a color key.
    #[cfg_attr(feature = "serde", serde(default))]
    pub color_key: bool,
    /// Logo has a per-pixel alpha memory.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pixel_alpha: bool,
}

/// Video mixer instance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixerConfig {
    /// Device id.
    pub device_id: DeviceId,
    /// Base address of the register window.
    pub base_address: usize,
    /// Pixels per clock.
    pub ppc: PixelsPerClock,
    /// Maximum stream width.
    pub max_width: u32,
    /// Maximum stream height.
    pub max_height: u32,
    /// Maximum bits per component.
    pub max_data_width: ColorDepth,
    /// Color format of the master layer and the output stream.
    pub color_format: ColorFormat,
    /// Mixer has colorimetry coefficient registers.
    #[cfg_attr(feature = "serde", serde(default))]
    pub csc_coeffs_regs: bool,
    /// Logo layer, if synthesized.
    #[cfg_attr(feature = "serde", serde(default))]
    pub logo: Option<LogoConfig>,
    /// Overlay layers 1..=16 in order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub layers: Vec<LayerConfig, MAX_OVERLAY_LAYERS>,
}

impl MixerConfig {
    /// Creates a mixer without overlay layers and without logo.
    pub fn new(
        device_id: DeviceId,
        base_address: usize,
        ppc: PixelsPerClock,
        max_width: u32,
        max_height: u32,
        max_data_width: ColorDepth,
        color_format: ColorFormat,
    ) -> Self {
        Self {
            device_id,
            base_address,
            ppc,
            max_width,
            max_height,
            max_data_width,
            color_format,
            csc_coeffs_regs: false,
            logo: None,
            layers: Vec::new(),
        }
    }

    /// Appends an overlay layer.
    ///
    /// # Errors
    /// Returns an error if all 16 overlay layers are in use.
    pub fn layer(&mut self, layer: LayerConfig) -> Result<&mut Self, HardwareConfigError> {
        self.layers
            .push(layer)
            .or(Err(HardwareConfigError::Layers))?;
        Ok(self)
    }

    /// Number of layers including the master layer.
    pub fn num_layers(&self) -> usize {
        self.layers.len() + 1
    }

    /// Checks the capabilities for consistency.
    pub fn validate(&self) -> Result<(), HardwareConfigError> {
        validate_common(self.base_address, self.max_width, self.max_height)?;
        if !self.color_format.is_stream() {
            return Err(HardwareConfigError::ColorFormat);
        }
        for layer in self.layers.iter() {
            if layer.max_width == 0 || layer.max_width > self.max_width {
                return Err(HardwareConfigError::Resolution);
            }
            let stream = layer.interface == LayerInterface::Stream;
            if stream != layer.color_format.is_stream() {
                return Err(HardwareConfigError::ColorFormat);
            }
        }
        if let Some(logo) = &self.logo {
            if logo.max_width == 0
                || logo.max_height == 0
                || logo.max_width % 4 != 0
                || logo.max_width > self.max_width
                || logo.max_height > self.max_height
            {
                return Err(HardwareConfigError::Logo);
            }
        }
        Ok(())
    }
}

/// Video timing controller instance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VtcConfig {
    /// Device id.
    pub device_id: DeviceId,
    /// Base address of the register window.
    pub base_address: usize,
    /// Timing generator is synthesized.
    pub generator: bool,
    /// Timing detector is synthesized.
    pub detector: bool,
}

impl VtcConfig {
    /// Checks the capabilities for consistency.
    pub fn validate(&self) -> Result<(), HardwareConfigError> {
        if !self.generator && !self.detector {
            return Err(HardwareConfigError::Capability);
        }
        validate_common(self.base_address, 1, 1)
    }
}

/// Test pattern generator instance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TpgConfig {
    /// Device id.
    pub device_id: DeviceId,
    /// Base address of the register window.
    pub base_address: usize,
    /// Pixels per clock.
    pub ppc: PixelsPerClock,
    /// Maximum frame width.
    pub max_width: u32,
    /// Maximum frame height.
    pub max_height: u32,
    /// Maximum bits per component.
    pub max_data_width: ColorDepth,
    /// Core has a video input and can pass it through.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pass_through: bool,
}

impl TpgConfig {
    /// Checks the capabilities for consistency.
    pub fn validate(&self) -> Result<(), HardwareConfigError> {
        validate_common(self.base_address, self.max_width, self.max_height)
    }
}

/// Demosaic instance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemosaicConfig {
    /// Device id.
    pub device_id: DeviceId,
    /// Base address of the register window.
    pub base_address: usize,
    /// Pixels per clock.
    pub ppc: PixelsPerClock,
    /// Maximum frame width.
    pub max_width: u32,
    /// Maximum frame height.
    pub max_height: u32,
    /// Maximum bits per component.
    pub max_data_width: ColorDepth,
}

impl DemosaicConfig {
    /// Checks the capabilities for consistency.
    pub fn validate(&self) -> Result<(), HardwareConfigError> {
        validate_common(self.base_address, self.max_width, self.max_height)
    }
}

fn validate_common(
    base_address: usize,
    max_width: u32,
    max_height: u32,
) -> Result<(), HardwareConfigError> {
    if base_address == 0 || base_address % 4 != 0 {
        return Err(HardwareConfigError::BaseAddress);
    }
    if max_width == 0 || max_height == 0 || max_width > MAX_RESOLUTION || max_height > MAX_RESOLUTION
    {
        return Err(HardwareConfigError::Resolution);
    }
    Ok(())
}

/// All video IP instances of a design.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HardwareConfig<const MIX: usize, const VTC: usize, const TPG: usize, const DMS: usize>
{
    /// Video mixers
    #[cfg_attr(feature = "serde", serde(default))]
    pub mixers: Vec<MixerConfig, MIX>,
    /// Video timing controllers
    #[cfg_attr(feature = "serde", serde(default))]
    pub vtcs: Vec<VtcConfig, VTC>,
    /// Test pattern generators
    #[cfg_attr(feature = "serde", serde(default))]
    pub tpgs: Vec<TpgConfig, TPG>,
    /// Demosaic cores
    #[cfg_attr(feature = "serde", serde(default))]
    pub demosaics: Vec<DemosaicConfig, DMS>,
}

impl<const MIX: usize, const VTC: usize, const TPG: usize, const DMS: usize>
    HardwareConfig<MIX, VTC, TPG, DMS>
{
    /// Creates a new builder for a configuration.
    pub fn builder() -> HardwareConfigBuilder<MIX, VTC, TPG, DMS> {
        HardwareConfigBuilder::default()
    }

    /// Looks up the mixer with `device_id`.
    pub fn lookup_mixer(&self, device_id: DeviceId) -> Option<&MixerConfig> {
        self.mixers.iter().find(|c| c.device_id == device_id)
    }

    /// Looks up the timing controller with `device_id`.
    pub fn lookup_vtc(&self, device_id: DeviceId) -> Option<&VtcConfig> {
        self.vtcs.iter().find(|c| c.device_id == device_id)
    }

    /// Looks up the test pattern generator with `device_id`.
    pub fn lookup_tpg(&self, device_id: DeviceId) -> Option<&TpgConfig> {
        self.tpgs.iter().find(|c| c.device_id == device_id)
    }

    /// Looks up the demosaic core with `device_id`.
    pub fn lookup_demosaic(&self, device_id: DeviceId) -> Option<&DemosaicConfig> {
        self.demosaics.iter().find(|c| c.device_id == device_id)
    }

    /// Checks every instance and the uniqueness of device ids per core type.
    pub fn validate(&self) -> Result<(), HardwareConfigError> {
        for c in self.mixers.iter() {
            c.validate()?;
        }
        for c in self.vtcs.iter() {
            c.validate()?;
        }
        for c in self.tpgs.iter() {
            c.validate()?;
        }
        for c in self.demosaics.iter() {
            c.validate()?;
        }
        if has_duplicates(self.mixers.iter().map(|c| c.device_id))
            || has_duplicates(self.vtcs.iter().map(|c| c.device_id))
            || has_duplicates(self.tpgs.iter().map(|c| c.device_id))
            || has_duplicates(self.demosaics.iter().map(|c| c.device_id))
        {
            return Err(HardwareConfigError::DuplicateDevice);
        }
        Ok(())
    }
}

fn has_duplicates<I: Iterator<Item = DeviceId> + Clone>(ids: I) -> bool {
    ids.clone()
        .enumerate()
        .any(|(i, id)| ids.clone().skip(i + 1).any(|other| other == id))
}

/// Configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareConfigError {
    /// Two instances of the same core type share a device id.
    DuplicateDevice,
    /// No instance with the requested device id.
    NotFound,
    /// Insufficient storage for configuration
    Storage,
    /// Base address is zero or not word aligned.
    BaseAddress,
    /// A maximum resolution is zero or exceeds its bound.
    Resolution,
    /// A color format does not fit the interface it is used on.
    ColorFormat,
    /// Too many overlay layers.
    Layers,
    /// Invalid logo layer dimensions.
    Logo,
    /// The instance has no usable function.
    Capability,
}

impl HardwareConfigError {
    /// Status code of this error.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotFound => crate::error::XST_DEVICE_NOT_FOUND,
            _ => crate::error::XST_INVALID_PARAM,
        }
    }
}

impl Display for HardwareConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicateDevice => write!(f, "Duplicate device id"),
            Self::NotFound => write!(f, "Device not found"),
            Self::Storage => write!(f, "Insufficient storage for configuration"),
            Self::BaseAddress => write!(f, "Invalid base address"),
            Self::Resolution => write!(f, "Invalid maximum resolution"),
            Self::ColorFormat => write!(f, "Color format does not match interface"),
            Self::Layers => write!(f, "Too many layers"),
            Self::Logo => write!(f, "Invalid logo dimensions"),
            Self::Capability => write!(f, "Core has no enabled function"),
        }
    }
}

/// Config builder
#[derive(Debug, Default, Clone)]
pub struct HardwareConfigBuilder<
    const MIX: usize,
    const VTC: usize,
    const TPG: usize,
    const DMS: usize,
> {
    cfg: HardwareConfig<MIX, VTC, TPG, DMS>,
}

/// Result of applying a change to the configuration builder.
pub type BuilderResult<'a, const MIX: usize, const VTC: usize, const TPG: usize, const DMS: usize> =
    Result<&'a mut HardwareConfigBuilder<MIX, VTC, TPG, DMS>, HardwareConfigError>;

impl<const MIX: usize, const VTC: usize, const TPG: usize, const DMS: usize>
    HardwareConfigBuilder<MIX, VTC, TPG, DMS>
{
    /// Build the configuration.
    pub fn build(&self) -> Result<HardwareConfig<MIX, VTC, TPG, DMS>, HardwareConfigError> {
        self.cfg.validate()?;
        Ok(self.cfg.clone())
    }

    /// Adds a mixer.
    ///
    /// # Errors
    /// Returns an error if the configuration is inconsistent, the device id
    /// is already in use, or the storage is exhausted.
    pub fn mixer(&mut self, cfg: MixerConfig) -> BuilderResult<'_, MIX, VTC, TPG, DMS> {
        cfg.validate()?;
        if self.cfg.lookup_mixer(cfg.device_id).is_some() {
            return Err(HardwareConfigError::DuplicateDevice);
        }
        self.cfg
            .mixers
            .push(cfg)
            .or(Err(HardwareConfigError::Storage))?;
        Ok(self)
    }

    /// Adds a video timing controller.
    ///
    /// # Errors
    /// See [Self::mixer].
    pub fn vtc(&mut self, cfg: VtcConfig) -> BuilderResult<'_, MIX, VTC, TPG, DMS> {
        cfg.validate()?;
        if self.cfg.lookup_vtc(cfg.device_id).is_some() {
            return Err(HardwareConfigError::DuplicateDevice);
        }
        self.cfg
            .vtcs
            .push(cfg)
            .or(Err(HardwareConfigError::Storage))?;
        Ok(self)
    }

    /// Adds a test pattern generator.
    ///
    /// # Errors
    /// See [Self::mixer].
    pub fn tpg(&mut self, cfg: TpgConfig) -> BuilderResult<'_, MIX, VTC, TPG, DMS> {
        cfg.validate()?;
        if self.cfg.lookup_tpg(cfg.device_id).is_some() {
            return Err(HardwareConfigError::DuplicateDevice);
        }
        self.cfg
            .tpgs
            .push(cfg)
            .or(Err(HardwareConfigError::Storage))?;
        Ok(self)
    }

    /// Adds a demosaic core.
    ///
    /// # Errors
    /// See [Self::mixer].
    pub fn demosaic(&mut self, cfg: DemosaicConfig) -> BuilderResult<'_, MIX, VTC, TPG, DMS> {
        cfg.validate()?;
        if self.cfg.lookup_demosaic(cfg.device_id).is_some() {
            return Err(HardwareConfigError::DuplicateDevice);
        }
        self.cfg
            .demosaics
            .push(cfg)
            .or(Err(HardwareConfigError::Storage))?;
        Ok(self)
    }
}
