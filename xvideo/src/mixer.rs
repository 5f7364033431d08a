//! Video mixer layer-2 driver.
//!
//! The mixer blends up to 16 overlay layers and an optional logo layer on top
//! of the master layer. Every request is validated against the stream and the
//! capabilities of the core before any register is written, so a rejected
//! request leaves the hardware untouched. The driver is not thread-safe;
//! callers must provide mutual exclusion, including against the interrupt
//! handler.

use crate::{
    config::{HardwareConfigError, LayerConfig, LayerInterface, LogoConfig, MixerConfig},
    csc::{self, ColorRange, ColorStandard, CscMatrix},
    error::{Error, XST_INVALID_PARAM},
    hls::{HlsCore, HlsError, HlsIrq},
    mmio::RegisterIo,
    video::{ColorDepth, ColorFormat, VideoStream, Window},
};
use core::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Register map of the mixer.
pub mod regs {
    /// Active width of the stream.
    pub const WIDTH: usize = 0x010;
    /// Active height of the stream.
    pub const HEIGHT: usize = 0x018;
    /// Color format of the master layer.
    pub const VIDEO_FORMAT: usize = 0x020;
    /// Background Y or R component.
    pub const BACKGROUND_Y_R: usize = 0x028;
    /// Background U or G component.
    pub const BACKGROUND_U_G: usize = 0x030;
    /// Background V or B component.
    pub const BACKGROUND_V_B: usize = 0x038;
    /// One enable bit per layer.
    pub const LAYER_ENABLE: usize = 0x040;
    /// YUV to RGB bank: `K11..K33`, then the R, G and B offsets.
    pub const CSC_YUV2RGB: usize = 0x050;
    /// RGB to YUV bank: `K11..K33`, then the Y, U and V offsets.
    pub const CSC_RGB2YUV: usize = 0x0B0;
    /// Distance between two registers of a coefficient bank.
    pub const CSC_STRIDE: usize = 0x8;

    /// Register block of overlay layer 1.
    pub const LAYER_BASE: usize = 0x200;
    /// Distance between the register blocks of two overlay layers.
    pub const LAYER_REG_OFFSET: usize = 0x100;
    /// Global alpha of a layer.
    pub const LAYER_ALPHA: usize = 0x00;
    /// Horizontal start of a layer window.
    pub const LAYER_START_X: usize = 0x08;
    /// Vertical start of a layer window.
    pub const LAYER_START_Y: usize = 0x10;
    /// Width of a layer window.
    pub const LAYER_WIDTH: usize = 0x18;
    /// Stride of a memory layer in bytes.
    pub const LAYER_STRIDE: usize = 0x20;
    /// Height of a layer window.
    pub const LAYER_HEIGHT: usize = 0x28;
    /// Scale factor of a layer.
    pub const LAYER_SCALE: usize = 0x30;
    /// Color format of a layer.
    pub const LAYER_VIDEO_FORMAT: usize = 0x38;
    /// Frame buffer address (64 bit).
    pub const LAYER_BUF1: usize = 0x40;
    /// Chroma buffer address (64 bit).
    pub const LAYER_BUF2: usize = 0x48;

    /// Register block of the logo layer.
    pub const LOGO_BASE: usize = 0x1200;
    /// Horizontal start of the logo.
    pub const LOGO_START_X: usize = LOGO_BASE;
    /// Vertical start of the logo.
    pub const LOGO_START_Y: usize = LOGO_BASE + 0x08;
    /// Width of the logo.
    pub const LOGO_WIDTH: usize = LOGO_BASE + 0x10;
    /// Height of the logo.
    pub const LOGO_HEIGHT: usize = LOGO_BASE + 0x18;
    /// Scale factor of the logo.
    pub const LOGO_SCALE: usize = LOGO_BASE + 0x20;
    /// Global alpha of the logo.
    pub const LOGO_ALPHA: usize = LOGO_BASE + 0x28;
    /// Color key minimum, R, G and B at consecutive 8 byte steps.
    pub const LOGO_COLOR_KEY_MIN: usize = LOGO_BASE + 0x30;
    /// Color key maximum, R, G and B at consecutive 8 byte steps.
    pub const LOGO_COLOR_KEY_MAX: usize = LOGO_BASE + 0x48;

    /// Logo red component memory.
    pub const LOGO_R_BRAM: usize = 0x1_0000;
    /// Logo green component memory.
    pub const LOGO_G_BRAM: usize = 0x2_0000;
    /// Logo blue component memory.
    pub const LOGO_B_BRAM: usize = 0x3_0000;
    /// Logo per-pixel alpha memory.
    pub const LOGO_A_BRAM: usize = 0x4_0000;

    /// Address of register `reg` of overlay layer `layer` (1-based).
    pub const fn layer(layer: u8, reg: usize) -> usize {
        LAYER_BASE + (layer as usize - 1) * LAYER_REG_OFFSET + reg
    }
}

/// Largest value of a layer alpha.
pub const ALPHA_MAX: u16 = 256;
/// Smallest width of an overlay layer window.
pub const MIN_LAYER_WIDTH: u32 = 64;
/// Smallest height of an overlay layer window.
pub const MIN_LAYER_HEIGHT: u32 = 64;
/// Smallest width of the logo.
pub const MIN_LOGO_WIDTH: u32 = 16;
/// Smallest height of the logo.
pub const MIN_LOGO_HEIGHT: u32 = 16;
/// Enable bit of the logo layer.
pub const LOGO_ENABLE_BIT: u32 = 23;
/// Reads of the control register before [Mixer::stop] gives up.
pub const STOP_POLL_LIMIT: u32 = 100_000;

const LOGO_INDEX: usize = crate::config::MAX_OVERLAY_LAYERS + 1;
const NUM_STATES: usize = LOGO_INDEX + 1;

/// Identifies a layer of the mixer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    /// The master layer. Its window is the stream.
    Master,
    /// Overlay layer `1..=16`.
    Layer(u8),
    /// The logo layer.
    Logo,
}

impl LayerId {
    fn enable_bit(self) -> u32 {
        match self {
            LayerId::Master => 1,
            LayerId::Layer(n) => 1 << n,
            LayerId::Logo => 1 << LOGO_ENABLE_BIT,
        }
    }
}

/// Upscaling of a layer window.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scale {
    /// No scaling
    #[default]
    X1 = 0,
    /// Pixel doubling
    X2 = 1,
    /// Pixel quadrupling
    X4 = 2,
}

impl Scale {
    /// Multiplier applied to the window size.
    pub const fn factor(self) -> u32 {
        1 << (self as u32)
    }

    fn from_register(value: u32) -> Self {
        match value {
            1 => Scale::X2,
            2 => Scale::X4,
            _ => Scale::X1,
        }
    }
}

/// Predefined background colors.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BackgroundColor {
    Black,
    White,
    Red,
    Green,
    #[default]
    Blue,
    Yellow,
    Cyan,
    Magenta,
}

impl BackgroundColor {
    /// 8 bit R, G, B components.
    const fn rgb(self) -> [u16; 3] {
        match self {
            Self::Black => [0, 0, 0],
            Self::White => [255, 255, 255],
            Self::Red => [255, 0, 0],
            Self::Green => [0, 255, 0],
            Self::Blue => [0, 0, 255],
            Self::Yellow => [255, 255, 0],
            Self::Cyan => [0, 255, 255],
            Self::Magenta => [255, 0, 255],
        }
    }

    /// 8 bit Y, U, V components, limited range.
    const fn yuv(self) -> [u16; 3] {
        match self {
            Self::Black => [16, 128, 128],
            Self::White => [235, 128, 128],
            Self::Red => [81, 90, 240],
            Self::Green => [145, 54, 34],
            Self::Blue => [41, 240, 110],
            Self::Yellow => [210, 16, 146],
            Self::Cyan => [170, 166, 16],
            Self::Magenta => [106, 202, 222],
        }
    }

    /// Components for a stream in `format` with `depth` bits per component.
    pub fn components(self, format: ColorFormat, depth: ColorDepth) -> [u32; 3] {
        let c = if format.is_yuv() {
            self.yuv()
        } else {
            self.rgb()
        };
        c.map(|v| (v as u32) << depth.shift_from_8())
    }
}

/// Range of logo colors that are treated as transparent.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorKey {
    /// Lower bound of R, G and B.
    pub min: [u8; 3],
    /// Upper bound of R, G and B.
    pub max: [u8; 3],
}

/// Called from [Mixer::interrupt_handler] when a frame has been processed.
pub type FrameDoneCallback = fn();

/// Software copy of the state of one layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerState {
    /// Window within the stream.
    pub window: Window,
    /// Line stride of the frame buffer in bytes.
    pub stride: u32,
    /// Frame buffer address.
    pub buffer_address: u64,
    /// Chroma buffer address of semi-planar formats.
    pub chroma_buffer_address: u64,
    /// Color format.
    pub color_format: ColorFormat,
    /// Scale factor.
    pub scale: Scale,
    /// Global alpha.
    pub alpha: u16,
}

/// Errors reported by the mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerError {
    /// The window does not fit the stream or the layer.
    LayerWindowInvalid,
    /// The stride is not a multiple of the memory interface width.
    WindowStrideMisaligned,
    /// The buffer address is not a multiple of the memory interface width.
    MemoryAddressMisaligned,
    /// The layer has the wrong interface for the request.
    LayerInterfaceType,
    /// The feature was not synthesized.
    DisabledInHardware,
    /// The layer does not exist in this core.
    InvalidLayer,
    /// A parameter is out of range.
    InvalidParameter,
}

impl MixerError {
    /// Status code of this error.
    pub fn code(&self) -> u32 {
        match self {
            Self::LayerWindowInvalid => 0x10,
            Self::WindowStrideMisaligned => 0x20,
            Self::MemoryAddressMisaligned => 0x30,
            Self::LayerInterfaceType => 0x40,
            Self::DisabledInHardware => 0x50,
            Self::InvalidLayer | Self::InvalidParameter => XST_INVALID_PARAM,
        }
    }
}

impl Display for MixerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LayerWindowInvalid => write!(f, "Layer window invalid"),
            Self::WindowStrideMisaligned => write!(f, "Window stride misaligned"),
            Self::MemoryAddressMisaligned => write!(f, "Memory address misaligned"),
            Self::LayerInterfaceType => write!(f, "Wrong layer interface type"),
            Self::DisabledInHardware => write!(f, "Disabled in hardware"),
            Self::InvalidLayer => write!(f, "Invalid layer"),
            Self::InvalidParameter => write!(f, "Invalid parameter"),
        }
    }
}

/// A video mixer instance.
#[derive(Debug, Clone)]
pub struct Mixer<R: RegisterIo> {
    hls: HlsCore<R>,
    config: MixerConfig,
    stream: VideoStream,
    layers: [LayerState; NUM_STATES],
    background: BackgroundColor,
    colorimetry: Option<(ColorStandard, ColorRange)>,
    frame_done: Option<FrameDoneCallback>,
}

impl<R: RegisterIo> Mixer<R> {
    /// Initializes the core described by `config`.
    ///
    /// The stream is set to the maximum resolution of the core in the color
    /// format of the master layer. Only the master layer is enabled, the
    /// background is blue, and layers with alpha or scale registers are set
    /// to opaque and unscaled.
    ///
    /// # Errors
    /// Returns an error if the configuration is inconsistent.
    pub fn initialize(config: MixerConfig, io: R) -> Result<Self, Error> {
        config.validate()?;
        let width = u16::try_from(config.max_width).or(Err(HardwareConfigError::Resolution))?;
        let height = u16::try_from(config.max_height).or(Err(HardwareConfigError::Resolution))?;
        let stream = VideoStream::new(
            width,
            height,
            config.color_format,
            config.max_data_width,
            config.ppc,
        );

        let mut layers = [LayerState::default(); NUM_STATES];
        for (state, layer) in layers[1..].iter_mut().zip(config.layers.iter()) {
            state.color_format = layer.color_format;
            state.alpha = ALPHA_MAX;
        }
        layers[LOGO_INDEX].alpha = ALPHA_MAX;
        layers[LOGO_INDEX].color_format = ColorFormat::Rgb;

        let mut mixer = Self {
            hls: HlsCore::new(io),
            config,
            stream,
            layers,
            background: BackgroundColor::default(),
            colorimetry: None,
            frame_done: None,
        };

        mixer.set_video_stream(&stream)?;
        mixer.io().write(regs::LAYER_ENABLE, LayerId::Master.enable_bit());
        for (i, layer) in mixer.config.layers.iter().enumerate() {
            let n = i as u8 + 1;
            mixer.io().write(
                regs::layer(n, regs::LAYER_VIDEO_FORMAT),
                layer.color_format.code(),
            );
            if layer.alpha {
                mixer
                    .io()
                    .write(regs::layer(n, regs::LAYER_ALPHA), ALPHA_MAX as u32);
            }
            if layer.scale {
                mixer
                    .io()
                    .write(regs::layer(n, regs::LAYER_SCALE), Scale::X1 as u32);
            }
        }
        if mixer.config.logo.is_some() {
            mixer.io().write(regs::LOGO_ALPHA, ALPHA_MAX as u32);
            mixer.io().write(regs::LOGO_SCALE, Scale::X1 as u32);
        }
        mixer.set_background_color(BackgroundColor::Blue, stream.color_depth)?;
        if mixer.config.csc_coeffs_regs {
            mixer.set_csc_coefficients(ColorStandard::Bt709, ColorRange::Limited)?;
        }
        xv_debug!(
            "Initialized mixer {} with {} layers",
            mixer.config.device_id,
            mixer.config.num_layers()
        );
        Ok(mixer)
    }

    fn io(&self) -> &R {
        self.hls.io()
    }

    /// Hardware configuration of this instance.
    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    /// The active stream.
    pub fn video_stream(&self) -> &VideoStream {
        &self.stream
    }

    /// The HLS control block.
    pub fn hls(&self) -> &HlsCore<R> {
        &self.hls
    }

    /// Starts the mixer in free-running mode.
    pub fn start(&self) {
        self.hls.enable_auto_restart();
        self.hls.start();
    }

    /// Stops the mixer after the current frame.
    pub fn stop(&self) -> Result<(), HlsError> {
        self.hls.stop(STOP_POLL_LIMIT)
    }

    /// Sets the active stream. The master layer window follows the stream.
    ///
    /// # Errors
    /// Returns an error if the stream exceeds the core's maximum resolution
    /// or depth, has a different number of pixels per clock, or is not a
    /// stream color format.
    pub fn set_video_stream(&mut self, stream: &VideoStream) -> Result<(), MixerError> {
        if stream.width() == 0
            || stream.height() == 0
            || stream.width() > self.config.max_width
            || stream.height() > self.config.max_height
            || stream.ppc != self.config.ppc
            || stream.color_depth > self.config.max_data_width
            || !stream.color_format.is_stream()
        {
            xv_warn!("Rejected stream {:?}", stream);
            return Err(MixerError::InvalidParameter);
        }
        self.io().write(regs::WIDTH, stream.width());
        self.io().write(regs::HEIGHT, stream.height());
        self.io()
            .write(regs::VIDEO_FORMAT, stream.color_format.code());
        self.stream = *stream;
        self.layers[0].window = Window::new(0, 0, stream.width(), stream.height());
        self.layers[0].color_format = stream.color_format;
        xv_debug!("Stream set to {}x{}", stream.width(), stream.height());
        Ok(())
    }

    fn index(&self, id: LayerId) -> Result<usize, MixerError> {
        match id {
            LayerId::Master => Ok(0),
            LayerId::Layer(n) if n >= 1 && (n as usize) <= self.config.layers.len() => {
                Ok(n as usize)
            }
            LayerId::Layer(_) => Err(MixerError::InvalidLayer),
            LayerId::Logo if self.config.logo.is_some() => Ok(LOGO_INDEX),
            LayerId::Logo => Err(MixerError::DisabledInHardware),
        }
    }

    fn overlay(&self, id: LayerId) -> Result<(u8, &LayerConfig), MixerError> {
        match id {
            LayerId::Layer(n) => {
                let idx = self.index(id)?;
                Ok((n, &self.config.layers[idx - 1]))
            }
            _ => Err(MixerError::InvalidLayer),
        }
    }

    fn logo(&self) -> Result<&LogoConfig, MixerError> {
        self.config
            .logo
            .as_ref()
            .ok_or(MixerError::DisabledInHardware)
    }

    /// Software state of a layer.
    pub fn layer_state(&self, id: LayerId) -> Result<&LayerState, MixerError> {
        Ok(&self.layers[self.index(id)?])
    }

    fn enable_mask(&self) -> u32 {
        let overlays = (1..=self.config.layers.len() as u8)
            .map(|n| LayerId::Layer(n).enable_bit())
            .fold(0, |acc, b| acc | b);
        let logo = if self.config.logo.is_some() {
            LayerId::Logo.enable_bit()
        } else {
            0
        };
        LayerId::Master.enable_bit() | overlays | logo
    }

    /// Enables a layer.
    pub fn layer_enable(&self, id: LayerId) -> Result<(), MixerError> {
        _ = self.index(id)?;
        self.io()
            .modify(regs::LAYER_ENABLE, |v| v | id.enable_bit());
        Ok(())
    }

    /// Disables a layer. Disabling the master layer shows the background.
    pub fn layer_disable(&self, id: LayerId) -> Result<(), MixerError> {
        _ = self.index(id)?;
        self.io()
            .modify(regs::LAYER_ENABLE, |v| v & !id.enable_bit());
        Ok(())
    }

    /// Whether a layer is enabled. Layers that do not exist are never enabled.
    pub fn is_layer_enabled(&self, id: LayerId) -> bool {
        self.index(id).is_ok() && self.io().read(regs::LAYER_ENABLE) & id.enable_bit() != 0
    }

    /// Enables every layer of the core.
    pub fn enable_all(&self) {
        self.io().write(regs::LAYER_ENABLE, self.enable_mask());
    }

    /// Disables every layer of the core, the master layer included.
    pub fn disable_all(&self) {
        self.io().write(regs::LAYER_ENABLE, 0);
    }

    /// Sets the background to one of the predefined colors.
    ///
    /// The color is taken from the RGB or YUV table depending on the color
    /// format of the stream and scaled to `depth`.
    pub fn set_background_color(
        &mut self,
        color: BackgroundColor,
        depth: ColorDepth,
    ) -> Result<(), MixerError> {
        if depth > self.config.max_data_width {
            return Err(MixerError::InvalidParameter);
        }
        let [c0, c1, c2] = color.components(self.stream.color_format, depth);
        self.io().write(regs::BACKGROUND_Y_R, c0);
        self.io().write(regs::BACKGROUND_U_G, c1);
        self.io().write(regs::BACKGROUND_V_B, c2);
        self.background = color;
        Ok(())
    }

    /// The last background color set.
    pub fn background_color(&self) -> BackgroundColor {
        self.background
    }

    fn fits_stream(&self, win: &Window, scale: Scale) -> bool {
        let s = scale.factor() as u64;
        win.x as u64 + win.width as u64 * s <= self.stream.width() as u64
            && win.y as u64 + win.height as u64 * s <= self.stream.height() as u64
    }

    fn check_logo_window(&self, win: &Window) -> Result<(), MixerError> {
        let logo = self.logo()?;
        let scale = self.layers[LOGO_INDEX].scale;
        if win.width < MIN_LOGO_WIDTH
            || win.height < MIN_LOGO_HEIGHT
            || win.width > logo.max_width
            || win.height > logo.max_height
            || !self.fits_stream(win, scale)
        {
            xv_warn!("Rejected logo window {:?}", win);
            return Err(MixerError::LayerWindowInvalid);
        }
        Ok(())
    }

    fn write_logo_window(&mut self, win: &Window) {
        self.io().write(regs::LOGO_START_X, win.x);
        self.io().write(regs::LOGO_START_Y, win.y);
        self.io().write(regs::LOGO_WIDTH, win.width);
        self.io().write(regs::LOGO_HEIGHT, win.height);
        self.layers[LOGO_INDEX].window = *win;
    }

    /// Places a layer window within the stream.
    ///
    /// `stride` is the line stride of the frame buffer in bytes and only
    /// used by memory layers. The window of the master layer is always the
    /// stream.
    ///
    /// # Errors
    /// - [MixerError::LayerWindowInvalid] if the window, multiplied by the
    ///   layer's scale factor, exceeds the stream, is smaller than the
    ///   minimum or larger than the layer's maximum, or if a memory layer's
    ///   start or width is not a multiple of the pixels per clock.
    /// - [MixerError::WindowStrideMisaligned] if the stride of a memory layer
    ///   is not a multiple of the memory interface width.
    pub fn set_layer_window(
        &mut self,
        id: LayerId,
        win: Window,
        stride: u32,
    ) -> Result<(), MixerError> {
        if id == LayerId::Logo {
            self.check_logo_window(&win)?;
            self.write_logo_window(&win);
            xv_debug!("Logo window set to {:?}", win);
            return Ok(());
        }
        let (n, cfg) = self.overlay(id)?;
        let scale = self.layers[n as usize].scale;
        if win.width < MIN_LAYER_WIDTH
            || win.height < MIN_LAYER_HEIGHT
            || win.width > cfg.max_width
            || !self.fits_stream(&win, scale)
        {
            xv_warn!("Rejected window {:?} for layer {}", win, n);
            return Err(MixerError::LayerWindowInvalid);
        }
        let memory = cfg.interface == LayerInterface::Memory;
        if memory {
            let ppc = self.config.ppc.count();
            if win.x % ppc != 0 || win.width % ppc != 0 {
                xv_warn!("Window {:?} of layer {} not aligned to {} ppc", win, n, ppc);
                return Err(MixerError::LayerWindowInvalid);
            }
            if stride == 0 || stride % self.config.ppc.aximm_bytes() != 0 {
                return Err(MixerError::WindowStrideMisaligned);
            }
        }

        self.io().write(regs::layer(n, regs::LAYER_START_X), win.x);
        self.io().write(regs::layer(n, regs::LAYER_START_Y), win.y);
        self.io().write(regs::layer(n, regs::LAYER_WIDTH), win.width);
        self.io().write(regs::layer(n, regs::LAYER_HEIGHT), win.height);
        if memory {
            self.io().write(regs::layer(n, regs::LAYER_STRIDE), stride);
            self.layers[n as usize].stride = stride;
        }
        self.layers[n as usize].window = win;
        xv_debug!("Layer {} window set to {:?}", n, win);
        Ok(())
    }

    /// Window of a layer.
    pub fn layer_window(&self, id: LayerId) -> Result<Window, MixerError> {
        Ok(self.layers[self.index(id)?].window)
    }

    /// Line stride of a memory layer in bytes.
    pub fn layer_stride(&self, id: LayerId) -> Result<u32, MixerError> {
        let (n, cfg) = self.overlay(id)?;
        if cfg.interface != LayerInterface::Memory {
            return Err(MixerError::LayerInterfaceType);
        }
        Ok(self.layers[n as usize].stride)
    }

    /// Sets the scale factor of an overlay layer or the logo.
    ///
    /// # Errors
    /// Returns [MixerError::DisabledInHardware] if the layer cannot scale
    /// and [MixerError::LayerWindowInvalid] if the current window would not
    /// fit the stream at the new scale.
    pub fn set_layer_scale_factor(&mut self, id: LayerId, scale: Scale) -> Result<(), MixerError> {
        let (idx, reg) = match id {
            LayerId::Logo => {
                _ = self.logo()?;
                (LOGO_INDEX, regs::LOGO_SCALE)
            }
            _ => {
                let (n, cfg) = self.overlay(id)?;
                if !cfg.scale {
                    return Err(MixerError::DisabledInHardware);
                }
                (n as usize, regs::layer(n, regs::LAYER_SCALE))
            }
        };
        if !self.fits_stream(&self.layers[idx].window, scale) {
            return Err(MixerError::LayerWindowInvalid);
        }
        self.io().write(reg, scale as u32);
        self.layers[idx].scale = scale;
        Ok(())
    }

    /// Scale factor of an overlay layer or the logo, as read from the core.
    pub fn layer_scale_factor(&self, id: LayerId) -> Result<Scale, MixerError> {
        let reg = match id {
            LayerId::Logo => {
                _ = self.logo()?;
                regs::LOGO_SCALE
            }
            _ => {
                let (n, cfg) = self.overlay(id)?;
                if !cfg.scale {
                    return Ok(Scale::X1);
                }
                regs::layer(n, regs::LAYER_SCALE)
            }
        };
        Ok(Scale::from_register(self.io().read(reg)))
    }

    /// Sets the global alpha of an overlay layer or the logo.
    /// `0` is transparent, [ALPHA_MAX] is opaque.
    pub fn set_layer_alpha(&mut self, id: LayerId, alpha: u16) -> Result<(), MixerError> {
        if alpha > ALPHA_MAX {
            return Err(MixerError::InvalidParameter);
        }
        let (idx, reg) = match id {
            LayerId::Logo => {
                _ = self.logo()?;
                (LOGO_INDEX, regs::LOGO_ALPHA)
            }
            _ => {
                let (n, cfg) = self.overlay(id)?;
                if !cfg.alpha {
                    return Err(MixerError::DisabledInHardware);
                }
                (n as usize, regs::layer(n, regs::LAYER_ALPHA))
            }
        };
        self.io().write(reg, alpha as u32);
        self.layers[idx].alpha = alpha;
        Ok(())
    }

    /// Global alpha of an overlay layer or the logo.
    pub fn layer_alpha(&self, id: LayerId) -> Result<u16, MixerError> {
        let reg = match id {
            LayerId::Logo => {
                _ = self.logo()?;
                regs::LOGO_ALPHA
            }
            _ => {
                let (n, cfg) = self.overlay(id)?;
                if !cfg.alpha {
                    return Ok(ALPHA_MAX);
                }
                regs::layer(n, regs::LAYER_ALPHA)
            }
        };
        Ok(self.io().read(reg) as u16)
    }

    fn memory_layer(&self, id: LayerId) -> Result<(u8, &LayerConfig), MixerError> {
        match id {
            LayerId::Master | LayerId::Logo => Err(MixerError::LayerInterfaceType),
            LayerId::Layer(_) => {
                let (n, cfg) = self.overlay(id)?;
                if cfg.interface != LayerInterface::Memory {
                    return Err(MixerError::LayerInterfaceType);
                }
                Ok((n, cfg))
            }
        }
    }

    fn check_address(&self, addr: u64) -> Result<(), MixerError> {
        if addr % self.config.ppc.aximm_bytes() as u64 != 0 {
            xv_warn!("Buffer address {:#x} misaligned", addr);
            return Err(MixerError::MemoryAddressMisaligned);
        }
        Ok(())
    }

    /// Sets the frame buffer of a memory layer.
    ///
    /// # Errors
    /// Returns [MixerError::LayerInterfaceType] for layers without memory
    /// interface and [MixerError::MemoryAddressMisaligned] if `addr` is not a
    /// multiple of the memory interface width.
    pub fn set_layer_buffer_address(&mut self, id: LayerId, addr: u64) -> Result<(), MixerError> {
        let (n, _) = self.memory_layer(id)?;
        self.check_address(addr)?;
        self.io().write_u64(regs::layer(n, regs::LAYER_BUF1), addr);
        self.layers[n as usize].buffer_address = addr;
        Ok(())
    }

    /// Frame buffer of a memory layer.
    pub fn layer_buffer_address(&self, id: LayerId) -> Result<u64, MixerError> {
        let (n, _) = self.memory_layer(id)?;
        Ok(self.io().read_u64(regs::layer(n, regs::LAYER_BUF1)))
    }

    /// Sets the chroma buffer of a semi-planar memory layer.
    ///
    /// # Errors
    /// As [Self::set_layer_buffer_address]. Additionally returns
    /// [MixerError::InvalidParameter] if the layer format is not semi-planar.
    pub fn set_layer_chroma_buffer_address(
        &mut self,
        id: LayerId,
        addr: u64,
    ) -> Result<(), MixerError> {
        let (n, cfg) = self.memory_layer(id)?;
        if !cfg.color_format.is_semi_planar() {
            return Err(MixerError::InvalidParameter);
        }
        self.check_address(addr)?;
        self.io().write_u64(regs::layer(n, regs::LAYER_BUF2), addr);
        self.layers[n as usize].chroma_buffer_address = addr;
        Ok(())
    }

    /// Chroma buffer of a semi-planar memory layer.
    pub fn layer_chroma_buffer_address(&self, id: LayerId) -> Result<u64, MixerError> {
        let (n, cfg) = self.memory_layer(id)?;
        if !cfg.color_format.is_semi_planar() {
            return Err(MixerError::InvalidParameter);
        }
        Ok(self.io().read_u64(regs::layer(n, regs::LAYER_BUF2)))
    }

    /// Color format of a layer.
    pub fn layer_color_format(&self, id: LayerId) -> Result<ColorFormat, MixerError> {
        Ok(self.layers[self.index(id)?].color_format)
    }

    /// Interface of a layer. The master layer is a stream.
    pub fn layer_interface(&self, id: LayerId) -> Result<LayerInterface, MixerError> {
        match id {
            LayerId::Master => Ok(LayerInterface::Stream),
            LayerId::Logo => Err(MixerError::InvalidLayer),
            LayerId::Layer(_) => Ok(self.overlay(id)?.1.interface),
        }
    }

    /// Whether a layer has an alpha register.
    pub fn is_layer_alpha_enabled(&self, id: LayerId) -> bool {
        match id {
            LayerId::Logo => self.config.logo.is_some(),
            _ => self.overlay(id).map(|(_, c)| c.alpha).unwrap_or(false),
        }
    }

    /// Whether a layer has a scale register.
    pub fn is_layer_scale_enabled(&self, id: LayerId) -> bool {
        match id {
            LayerId::Logo => self.config.logo.is_some(),
            _ => self.overlay(id).map(|(_, c)| c.scale).unwrap_or(false),
        }
    }

    fn write_logo_plane(&self, base: usize, win: &Window, pixels: &[u8], pitch: u32) {
        let width = win.width as usize;
        for row in 0..win.height as usize {
            let line = &pixels[row * width..(row + 1) * width];
            for (col, chunk) in line.chunks(4).enumerate() {
                let word = chunk
                    .iter()
                    .enumerate()
                    .fold(0u32, |w, (i, p)| w | (*p as u32) << (8 * i));
                let offset = base + row * pitch as usize + col * 4;
                self.io().write(offset, word);
            }
        }
    }

    /// Loads an RGB logo into the logo memories and places it at `win`.
    ///
    /// Each buffer holds `win.width * win.height` bytes, row by row.
    pub fn load_logo(
        &mut self,
        win: Window,
        r: &[u8],
        g: &[u8],
        b: &[u8],
    ) -> Result<(), MixerError> {
        let pitch = self.logo()?.max_width;
        self.check_logo_window(&win)?;
        let len = (win.width * win.height) as usize;
        if r.len() < len || g.len() < len || b.len() < len {
            return Err(MixerError::InvalidParameter);
        }
        self.write_logo_plane(regs::LOGO_R_BRAM, &win, r, pitch);
        self.write_logo_plane(regs::LOGO_G_BRAM, &win, g, pitch);
        self.write_logo_plane(regs::LOGO_B_BRAM, &win, b, pitch);
        self.write_logo_window(&win);
        xv_debug!("Loaded {}x{} logo", win.width, win.height);
        Ok(())
    }

    /// Loads the per-pixel alpha of the logo.
    pub fn load_logo_pixel_alpha(&mut self, win: Window, a: &[u8]) -> Result<(), MixerError> {
        let logo = *self.logo()?;
        if !logo.pixel_alpha {
            return Err(MixerError::DisabledInHardware);
        }
        self.check_logo_window(&win)?;
        if a.len() < (win.width * win.height) as usize {
            return Err(MixerError::InvalidParameter);
        }
        self.write_logo_plane(regs::LOGO_A_BRAM, &win, a, logo.max_width);
        Ok(())
    }

    /// Sets the range of logo colors that are not drawn.
    pub fn set_logo_color_key(&mut self, key: ColorKey) -> Result<(), MixerError> {
        if !self.logo()?.color_key {
            return Err(MixerError::DisabledInHardware);
        }
        for c in 0..3 {
            let step = c * regs::CSC_STRIDE;
            self.io()
                .write(regs::LOGO_COLOR_KEY_MIN + step, key.min[c] as u32);
            self.io()
                .write(regs::LOGO_COLOR_KEY_MAX + step, key.max[c] as u32);
        }
        Ok(())
    }

    /// The logo color key, as read from the core.
    pub fn logo_color_key(&self) -> Result<ColorKey, MixerError> {
        if !self.logo()?.color_key {
            return Err(MixerError::DisabledInHardware);
        }
        let mut key = ColorKey::default();
        for c in 0..3 {
            let step = c * regs::CSC_STRIDE;
            key.min[c] = self.io().read(regs::LOGO_COLOR_KEY_MIN + step) as u8;
            key.max[c] = self.io().read(regs::LOGO_COLOR_KEY_MAX + step) as u8;
        }
        Ok(key)
    }

    fn write_csc_bank(&self, base: usize, m: &CscMatrix) {
        let coeffs = m.k.iter().flat_map(|row| row.iter().map(|k| *k as i32));
        let offsets = m.offsets_for(self.stream.color_depth);
        for (i, v) in coeffs.chain(offsets).enumerate() {
            self.io().write(base + i * regs::CSC_STRIDE, v as u32);
        }
    }

    /// Programs the colorimetry used to convert between the layer and the
    /// stream color spaces.
    pub fn set_csc_coefficients(
        &mut self,
        standard: ColorStandard,
        range: ColorRange,
    ) -> Result<(), MixerError> {
        if !self.config.csc_coeffs_regs {
            return Err(MixerError::DisabledInHardware);
        }
        self.write_csc_bank(regs::CSC_YUV2RGB, &csc::yuv_to_rgb(standard, range));
        self.write_csc_bank(regs::CSC_RGB2YUV, &csc::rgb_to_yuv(standard, range));
        self.colorimetry = Some((standard, range));
        xv_debug!("Colorimetry set to {:?} {:?}", standard, range);
        Ok(())
    }

    /// The colorimetry last programmed.
    pub fn csc_coefficients(&self) -> Option<(ColorStandard, ColorRange)> {
        self.colorimetry
    }

    /// Registers the frame-done callback.
    pub fn set_frame_done_callback(&mut self, callback: FrameDoneCallback) {
        self.frame_done = Some(callback);
    }

    /// Enables the frame-done interrupt.
    pub fn interrupt_enable(&self) {
        self.hls.interrupt_enable(HlsIrq::DONE);
        self.hls.global_interrupt_enable();
    }

    /// Disables the frame-done interrupt.
    pub fn interrupt_disable(&self) {
        self.hls.interrupt_disable(HlsIrq::DONE);
        self.hls.global_interrupt_disable();
    }

    /// Acknowledges pending interrupts and calls the frame-done callback.
    ///
    /// To be called from the interrupt service routine of the mixer.
    pub fn interrupt_handler(&self) {
        let status = self.hls.interrupt_status();
        self.hls.interrupt_clear(status);
        if status.contains(HlsIrq::DONE) {
            if let Some(callback) = self.frame_done {
                callback();
            }
        }
    }

    /// Logs the state of the core.
    pub fn report(&self) {
        xv_info!(
            "Mixer {}: {}x{} {:?} {}bpc, {} ppc",
            self.config.device_id,
            self.stream.width(),
            self.stream.height(),
            self.stream.color_format,
            self.stream.color_depth.bits(),
            self.config.ppc.count()
        );
        xv_info!(
            "  running: {}, layer enable: {:#010x}, background: {:?}",
            !self.hls.is_idle(),
            self.io().read(regs::LAYER_ENABLE),
            self.background
        );
        for (i, state) in self.layers[..self.config.num_layers()].iter().enumerate() {
            xv_info!(
                "  layer {}: {:?} {:?} stride {} buf {:#x}",
                i,
                state.window,
                state.color_format,
                state.stride,
                state.buffer_address
            );
        }
        if self.config.logo.is_some() {
            xv_info!("  logo: {:?}", self.layers[LOGO_INDEX].window);
        }
    }
}
