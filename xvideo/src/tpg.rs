//! Test pattern generator driver.

use crate::{
    config::TpgConfig,
    error::{Error, XST_FAILURE, XST_INVALID_PARAM},
    hls::{HlsCore, HlsError},
    mmio::RegisterIo,
    video::{ColorFormat, VideoStream, Window},
};
use bitflags::bitflags;
use core::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Register map of the test pattern generator.
pub mod regs {
    /// Frame height
    pub const HEIGHT: usize = 0x10;
    /// Frame width
    pub const WIDTH: usize = 0x18;
    /// Background pattern
    pub const BCKGNDID: usize = 0x20;
    /// Foreground overlay
    pub const OVRLAYID: usize = 0x28;
    /// Component mask
    pub const MASKID: usize = 0x30;
    /// Motion speed
    pub const MOTIONSPEED: usize = 0x38;
    /// Output color format
    pub const COLORFORMAT: usize = 0x40;
    /// Cross hair column
    pub const CROSSHAIR_HOR: usize = 0x48;
    /// Cross hair row
    pub const CROSSHAIR_VER: usize = 0x50;
    /// Zone plate horizontal start
    pub const ZPLATE_HOR_START: usize = 0x58;
    /// Zone plate horizontal delta
    pub const ZPLATE_HOR_DELTA: usize = 0x60;
    /// Zone plate vertical start
    pub const ZPLATE_VER_START: usize = 0x68;
    /// Zone plate vertical delta
    pub const ZPLATE_VER_DELTA: usize = 0x70;
    /// Moving box size
    pub const BOXSIZE: usize = 0x78;
    /// Moving box red or Y
    pub const BOXCOLOR_R: usize = 0x80;
    /// Moving box green or U
    pub const BOXCOLOR_G: usize = 0x88;
    /// Moving box blue or V
    pub const BOXCOLOR_B: usize = 0x90;
    /// Video input enable
    pub const ENABLEINPUT: usize = 0x98;
    /// Pass-through window start column
    pub const PASSTHRU_START_X: usize = 0xA0;
    /// Pass-through window start row
    pub const PASSTHRU_START_Y: usize = 0xA8;
    /// Pass-through window end column
    pub const PASSTHRU_END_X: usize = 0xB0;
    /// Pass-through window end row
    pub const PASSTHRU_END_Y: usize = 0xB8;
}

/// Reads of the control register before [Tpg::stop] gives up.
pub const STOP_POLL_LIMIT: u32 = 100_000;

/// Background pattern. The discriminant is the `BCKGNDID` encoding.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Video input is passed through.
    PassThrough = 0,
    /// Horizontal ramp
    HorizontalRamp = 1,
    /// Vertical ramp
    VerticalRamp = 2,
    /// Ramp moving over time
    TemporalRamp = 3,
    /// Solid red
    SolidRed = 4,
    /// Solid green
    SolidGreen = 5,
    /// Solid blue
    SolidBlue = 6,
    /// Solid black
    SolidBlack = 7,
    /// Solid white
    SolidWhite = 8,
    /// Color bars
    #[default]
    ColorBars = 9,
    /// Zone plate
    ZonePlate = 10,
    /// Tartan color bars
    TartanBars = 11,
    /// Cross hatch
    CrossHatch = 12,
    /// Rainbow color sweep
    ColorSweep = 13,
    /// Combined horizontal and vertical ramp
    CombinedRamp = 14,
    /// Black and white checkerboard
    Checkerboard = 15,
    /// DisplayPort color ramp
    DpColorRamp = 17,
    /// DisplayPort black and white vertical lines
    DpBwVerticalLines = 18,
    /// DisplayPort color square
    DpColorSquare = 19,
}

impl Pattern {
    const ALL: [Pattern; 19] = [
        Self::PassThrough,
        Self::HorizontalRamp,
        Self::VerticalRamp,
        Self::TemporalRamp,
        Self::SolidRed,
        Self::SolidGreen,
        Self::SolidBlue,
        Self::SolidBlack,
        Self::SolidWhite,
        Self::ColorBars,
        Self::ZonePlate,
        Self::TartanBars,
        Self::CrossHatch,
        Self::ColorSweep,
        Self::CombinedRamp,
        Self::Checkerboard,
        Self::DpColorRamp,
        Self::DpBwVerticalLines,
        Self::DpColorSquare,
    ];

    fn from_register(value: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| *p as u32 == value)
    }
}

/// Foreground overlay drawn on top of the pattern.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    /// No overlay
    #[default]
    None = 0,
    /// Cross hair at a fixed position
    CrossHair = 1,
    /// Box moving over the frame
    MovingBox = 2,
}

impl Overlay {
    fn from_register(value: u32) -> Self {
        match value {
            1 => Self::CrossHair,
            2 => Self::MovingBox,
            _ => Self::None,
        }
    }
}

bitflags! {
    /// Color components forced to zero.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Mask: u32 {
        /// Red or Cr
        const RED_CR   = 1 << 0;
        /// Green or Y
        const GREEN_Y  = 1 << 1;
        /// Blue or Cb
        const BLUE_CB  = 1 << 2;
    }
}

/// Errors reported by the test pattern generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TpgError {
    /// A parameter is out of range.
    InvalidParameter,
    /// The feature was not synthesized.
    DisabledInHardware,
}

impl TpgError {
    /// Status code of this error.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidParameter => XST_INVALID_PARAM,
            Self::DisabledInHardware => XST_FAILURE,
        }
    }
}

impl Display for TpgError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "Invalid parameter"),
            Self::DisabledInHardware => write!(f, "Disabled in hardware"),
        }
    }
}

/// A test pattern generator instance.
#[derive(Debug, Clone)]
pub struct Tpg<R: RegisterIo> {
    hls: HlsCore<R>,
    config: TpgConfig,
}

impl<R: RegisterIo> Tpg<R> {
    /// Initializes the driver for the core described by `config`.
    /// The hardware is not touched.
    pub fn initialize(config: TpgConfig, io: R) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            hls: HlsCore::new(io),
            config,
        })
    }

    fn io(&self) -> &R {
        self.hls.io()
    }

    /// Hardware configuration of this instance.
    pub fn config(&self) -> &TpgConfig {
        &self.config
    }

    /// Starts the generator in free-running mode.
    pub fn start(&self) {
        self.hls.enable_auto_restart();
        self.hls.start();
    }

    /// Stops the generator after the current frame.
    pub fn stop(&self) -> Result<(), HlsError> {
        self.hls.stop(STOP_POLL_LIMIT)
    }

    /// Whether the last frame is complete.
    pub fn is_done(&self) -> bool {
        self.hls.is_done()
    }

    /// Whether the generator is idle.
    pub fn is_idle(&self) -> bool {
        self.hls.is_idle()
    }

    /// Sets the frame size.
    ///
    /// # Errors
    /// Returns [TpgError::InvalidParameter] if the size is zero, exceeds the
    /// core's maximum, or the width is not a multiple of the pixels per
    /// clock.
    pub fn set_size(&self, width: u32, height: u32) -> Result<(), TpgError> {
        if width == 0
            || height == 0
            || width > self.config.max_width
            || height > self.config.max_height
            || width % self.config.ppc.count() != 0
        {
            xv_warn!("Rejected TPG size {}x{}", width, height);
            return Err(TpgError::InvalidParameter);
        }
        self.io().write(regs::WIDTH, width);
        self.io().write(regs::HEIGHT, height);
        Ok(())
    }

    /// Frame size as width and height.
    pub fn size(&self) -> (u32, u32) {
        (self.io().read(regs::WIDTH), self.io().read(regs::HEIGHT))
    }

    /// Sets the color format of the output stream.
    pub fn set_color_format(&self, format: ColorFormat) -> Result<(), TpgError> {
        if !format.is_stream() {
            return Err(TpgError::InvalidParameter);
        }
        self.io().write(regs::COLORFORMAT, format.code());
        Ok(())
    }

    /// Color format of the output stream.
    pub fn color_format(&self) -> Option<ColorFormat> {
        ColorFormat::from_code(self.io().read(regs::COLORFORMAT))
    }

    /// Selects the background pattern.
    pub fn set_pattern(&self, pattern: Pattern) -> Result<(), TpgError> {
        if pattern == Pattern::PassThrough && !self.config.pass_through {
            return Err(TpgError::DisabledInHardware);
        }
        self.io().write(regs::BCKGNDID, pattern as u32);
        xv_debug!("TPG {} pattern {:?}", self.config.device_id, pattern);
        Ok(())
    }

    /// Current background pattern.
    pub fn pattern(&self) -> Option<Pattern> {
        Pattern::from_register(self.io().read(regs::BCKGNDID))
    }

    /// Selects the foreground overlay.
    pub fn set_overlay(&self, overlay: Overlay) {
        self.io().write(regs::OVRLAYID, overlay as u32);
    }

    /// Current foreground overlay.
    pub fn overlay(&self) -> Overlay {
        Overlay::from_register(self.io().read(regs::OVRLAYID))
    }

    /// Forces the given color components to zero.
    pub fn set_mask(&self, mask: Mask) {
        self.io().write(regs::MASKID, mask.bits());
    }

    /// Masked color components.
    pub fn mask(&self) -> Mask {
        Mask::from_bits_truncate(self.io().read(regs::MASKID))
    }

    /// Speed of the moving box and the temporal patterns in pixels per frame.
    pub fn set_motion_speed(&self, speed: u8) {
        self.io().write(regs::MOTIONSPEED, speed as u32);
    }

    /// Motion speed in pixels per frame.
    pub fn motion_speed(&self) -> u8 {
        self.io().read(regs::MOTIONSPEED) as u8
    }

    /// Places the cross hair. It must lie within the frame.
    pub fn set_cross_hair(&self, x: u32, y: u32) -> Result<(), TpgError> {
        let (width, height) = self.size();
        if x >= width || y >= height {
            return Err(TpgError::InvalidParameter);
        }
        self.io().write(regs::CROSSHAIR_HOR, x);
        self.io().write(regs::CROSSHAIR_VER, y);
        Ok(())
    }

    /// Position of the cross hair.
    pub fn cross_hair(&self) -> (u32, u32) {
        (
            self.io().read(regs::CROSSHAIR_HOR),
            self.io().read(regs::CROSSHAIR_VER),
        )
    }

    /// Sets size and color of the moving box.
    ///
    /// Components are given at the maximum data width of the core. The box
    /// must fit into the frame.
    pub fn set_box(&self, size: u32, color: [u16; 3]) -> Result<(), TpgError> {
        let (width, height) = self.size();
        let limit = 1u32 << self.config.max_data_width.bits();
        if size == 0
            || size > width
            || size > height
            || color.iter().any(|c| *c as u32 >= limit)
        {
            return Err(TpgError::InvalidParameter);
        }
        self.io().write(regs::BOXSIZE, size);
        self.io().write(regs::BOXCOLOR_R, color[0] as u32);
        self.io().write(regs::BOXCOLOR_G, color[1] as u32);
        self.io().write(regs::BOXCOLOR_B, color[2] as u32);
        Ok(())
    }

    /// Size and color of the moving box.
    pub fn box_config(&self) -> (u32, [u16; 3]) {
        (
            self.io().read(regs::BOXSIZE),
            [
                self.io().read(regs::BOXCOLOR_R) as u16,
                self.io().read(regs::BOXCOLOR_G) as u16,
                self.io().read(regs::BOXCOLOR_B) as u16,
            ],
        )
    }

    /// Parameters of the zone plate pattern.
    pub fn set_zone_plate(&self, h_start: u16, h_delta: u16, v_start: u16, v_delta: u16) {
        self.io().write(regs::ZPLATE_HOR_START, h_start as u32);
        self.io().write(regs::ZPLATE_HOR_DELTA, h_delta as u32);
        self.io().write(regs::ZPLATE_VER_START, v_start as u32);
        self.io().write(regs::ZPLATE_VER_DELTA, v_delta as u32);
    }

    /// Zone plate parameters as horizontal start and delta, vertical start
    /// and delta.
    pub fn zone_plate(&self) -> (u16, u16, u16, u16) {
        (
            self.io().read(regs::ZPLATE_HOR_START) as u16,
            self.io().read(regs::ZPLATE_HOR_DELTA) as u16,
            self.io().read(regs::ZPLATE_VER_START) as u16,
            self.io().read(regs::ZPLATE_VER_DELTA) as u16,
        )
    }

    /// Shows the video input within `win` and the pattern around it.
    pub fn enable_pass_through(&self, win: Window) -> Result<(), TpgError> {
        if !self.config.pass_through {
            return Err(TpgError::DisabledInHardware);
        }
        let (width, height) = self.size();
        if win.width == 0
            || win.height == 0
            || win.x as u64 + win.width as u64 > width as u64
            || win.y as u64 + win.height as u64 > height as u64
        {
            return Err(TpgError::InvalidParameter);
        }
        self.io().write(regs::PASSTHRU_START_X, win.x);
        self.io().write(regs::PASSTHRU_START_Y, win.y);
        self.io().write(regs::PASSTHRU_END_X, win.x + win.width);
        self.io().write(regs::PASSTHRU_END_Y, win.y + win.height);
        self.io().write(regs::ENABLEINPUT, 1);
        Ok(())
    }

    /// Stops passing the video input through.
    pub fn disable_pass_through(&self) -> Result<(), TpgError> {
        if !self.config.pass_through {
            return Err(TpgError::DisabledInHardware);
        }
        self.io().write(regs::ENABLEINPUT, 0);
        Ok(())
    }

    /// Pass-through window, if enabled.
    pub fn pass_through(&self) -> Option<Window> {
        if self.io().read(regs::ENABLEINPUT) == 0 {
            return None;
        }
        let x = self.io().read(regs::PASSTHRU_START_X);
        let y = self.io().read(regs::PASSTHRU_START_Y);
        let end_x = self.io().read(regs::PASSTHRU_END_X);
        let end_y = self.io().read(regs::PASSTHRU_END_Y);
        Some(Window::new(
            x,
            y,
            end_x.saturating_sub(x),
            end_y.saturating_sub(y),
        ))
    }

    /// Sets size, color format and pattern for `stream`.
    pub fn configure(&self, stream: &VideoStream, pattern: Pattern) -> Result<(), TpgError> {
        if stream.ppc != self.config.ppc || stream.color_depth > self.config.max_data_width {
            return Err(TpgError::InvalidParameter);
        }
        self.set_size(stream.width(), stream.height())?;
        self.set_color_format(stream.color_format)?;
        self.set_pattern(pattern)
    }

    /// Logs the state of the core.
    pub fn report(&self) {
        let (width, height) = self.size();
        xv_info!(
            "TPG {}: {}x{} {:?}, pattern {:?}, overlay {:?}, running: {}",
            self.config.device_id,
            width,
            height,
            self.color_format(),
            self.pattern(),
            self.overlay(),
            !self.is_idle()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mmio::testing::RegisterFile,
        video::{ColorDepth, PixelsPerClock, VideoMode},
    };

    fn config(pass_through: bool) -> TpgConfig {
        TpgConfig {
            device_id: 0,
            base_address: 0x43C1_0000,
            ppc: PixelsPerClock::Two,
            max_width: 1920,
            max_height: 1080,
            max_data_width: ColorDepth::Bpc8,
            pass_through,
        }
    }

    #[test]
    fn configure_stream() {
        let rf = RegisterFile::new();
        let tpg = Tpg::initialize(config(false), &rf).unwrap();
        let stream = VideoStream::from_mode(
            VideoMode::Hd720p60,
            ColorFormat::Yuv422,
            ColorDepth::Bpc8,
            PixelsPerClock::Two,
        );
        tpg.configure(&stream, Pattern::ZonePlate).unwrap();
        assert_eq!(tpg.size(), (1280, 720));
        assert_eq!(tpg.color_format(), Some(ColorFormat::Yuv422));
        assert_eq!(tpg.pattern(), Some(Pattern::ZonePlate));
        assert_eq!(rf.read(regs::BCKGNDID), 10);
    }

    #[test]
    fn size_limits() {
        let rf = RegisterFile::new();
        let tpg = Tpg::initialize(config(false), &rf).unwrap();
        assert_eq!(tpg.set_size(1921, 1080), Err(TpgError::InvalidParameter));
        assert_eq!(tpg.set_size(1280, 1081), Err(TpgError::InvalidParameter));
        assert_eq!(tpg.set_size(0, 720), Err(TpgError::InvalidParameter));
        assert_eq!(
            tpg.set_color_format(ColorFormat::Rgb8),
            Err(TpgError::InvalidParameter)
        );
        assert_eq!(rf.writes(), 0);
    }

    #[test]
    fn overlays() {
        let rf = RegisterFile::new();
        let tpg = Tpg::initialize(config(false), &rf).unwrap();
        tpg.set_size(640, 480).unwrap();
        tpg.set_overlay(Overlay::MovingBox);
        tpg.set_box(64, [255, 0, 128]).unwrap();
        tpg.set_motion_speed(4);
        assert_eq!(tpg.overlay(), Overlay::MovingBox);
        assert_eq!(tpg.box_config(), (64, [255, 0, 128]));
        assert_eq!(tpg.motion_speed(), 4);
        assert_eq!(tpg.set_box(64, [256, 0, 0]), Err(TpgError::InvalidParameter));
        assert_eq!(tpg.set_box(481, [0, 0, 0]), Err(TpgError::InvalidParameter));
        tpg.set_cross_hair(320, 240).unwrap();
        assert_eq!(tpg.cross_hair(), (320, 240));
        assert_eq!(tpg.set_cross_hair(640, 0), Err(TpgError::InvalidParameter));
        tpg.set_mask(Mask::RED_CR | Mask::BLUE_CB);
        assert_eq!(tpg.mask(), Mask::RED_CR | Mask::BLUE_CB);
        tpg.set_zone_plate(1, 2, 3, 4);
        assert_eq!(tpg.zone_plate(), (1, 2, 3, 4));
    }

    #[test]
    fn pass_through_needs_capability() {
        let rf = RegisterFile::new();
        let tpg = Tpg::initialize(config(false), &rf).unwrap();
        assert_eq!(
            tpg.set_pattern(Pattern::PassThrough),
            Err(TpgError::DisabledInHardware)
        );
        assert_eq!(
            tpg.enable_pass_through(Window::new(0, 0, 64, 64)),
            Err(TpgError::DisabledInHardware)
        );

        let rf = RegisterFile::new();
        let tpg = Tpg::initialize(config(true), &rf).unwrap();
        tpg.set_size(1920, 1080).unwrap();
        let win = Window::new(100, 50, 640, 480);
        tpg.enable_pass_through(win).unwrap();
        assert_eq!(rf.read(regs::PASSTHRU_END_X), 740);
        assert_eq!(tpg.pass_through(), Some(win));
        tpg.disable_pass_through().unwrap();
        assert_eq!(tpg.pass_through(), None);
    }

    #[test]
    fn free_running_start() {
        let rf = RegisterFile::new();
        let tpg = Tpg::initialize(config(false), &rf).unwrap();
        tpg.start();
        assert_eq!(rf.read(crate::hls::ADDR_AP_CTRL), 0x81);
        assert!(!tpg.is_idle());
    }
}
