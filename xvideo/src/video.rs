//! Video stream description shared by all drivers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Color format of a video stream or of a memory layer.
///
/// The discriminant is the encoding used by the `VIDEO_FORMAT` registers of
/// the HLS cores.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ColorFormat {
    /// RGB stream
    #[default]
    Rgb = 0,
    /// YCbCr 4:4:4 stream
    Yuv444 = 1,
    /// YCbCr 4:2:2 stream
    Yuv422 = 2,
    /// YCbCr 4:2:0 stream
    Yuv420 = 3,
    /// Packed RGB, 8 bit, with padding byte
    Rgbx8 = 10,
    /// Packed YUV 4:4:4, 8 bit, with padding byte
    Yuvx8 = 11,
    /// Packed YUYV 4:2:2, 8 bit
    Yuyv8 = 12,
    /// Packed RGB with alpha, 8 bit
    Rgba8 = 13,
    /// Packed YUV with alpha, 8 bit
    Yuva8 = 14,
    /// Packed RGB, 10 bit, with padding bits
    Rgbx10 = 15,
    /// Packed YUV 4:4:4, 10 bit, with padding bits
    Yuvx10 = 16,
    /// Packed RGB 5:6:5
    Rgb565 = 17,
    /// Semi-planar Y/UV 4:2:2, 8 bit
    YUv8 = 18,
    /// Semi-planar Y/UV 4:2:0, 8 bit
    YUv8_420 = 19,
    /// Packed RGB, 8 bit
    Rgb8 = 20,
    /// Packed YUV 4:4:4, 8 bit
    Yuv8 = 21,
    /// Semi-planar Y/UV 4:2:2, 10 bit
    YUv10 = 22,
    /// Semi-planar Y/UV 4:2:0, 10 bit
    YUv10_420 = 23,
    /// Luma only, 8 bit
    Y8 = 24,
    /// Luma only, 10 bit
    Y10 = 25,
    /// Packed BGR with alpha, 8 bit
    Bgra8 = 26,
    /// Packed BGR, 8 bit, with padding byte
    Bgrx8 = 27,
    /// Packed UYVY 4:2:2, 8 bit
    Uyvy8 = 28,
    /// Packed BGR, 8 bit
    Bgr8 = 29,
}

impl ColorFormat {
    const ALL: [ColorFormat; 24] = [
        Self::Rgb,
        Self::Yuv444,
        Self::Yuv422,
        Self::Yuv420,
        Self::Rgbx8,
        Self::Yuvx8,
        Self::Yuyv8,
        Self::Rgba8,
        Self::Yuva8,
        Self::Rgbx10,
        Self::Yuvx10,
        Self::Rgb565,
        Self::YUv8,
        Self::YUv8_420,
        Self::Rgb8,
        Self::Yuv8,
        Self::YUv10,
        Self::YUv10_420,
        Self::Y8,
        Self::Y10,
        Self::Bgra8,
        Self::Bgrx8,
        Self::Uyvy8,
        Self::Bgr8,
    ];

    /// Register encoding of the format.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Decodes a `VIDEO_FORMAT` register value.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.code() == code)
    }

    /// Whether this is one of the AXI4-Stream formats.
    pub const fn is_stream(self) -> bool {
        (self as u32) < 10
    }

    /// Whether the pixels are in YCbCr color space.
    pub const fn is_yuv(self) -> bool {
        matches!(
            self,
            Self::Yuv444
                | Self::Yuv422
                | Self::Yuv420
                | Self::Yuvx8
                | Self::Yuyv8
                | Self::Yuva8
                | Self::Yuvx10
                | Self::YUv8
                | Self::YUv8_420
                | Self::Yuv8
                | Self::YUv10
                | Self::YUv10_420
                | Self::Y8
                | Self::Y10
                | Self::Uyvy8
        )
    }

    /// Whether the format stores chroma in a second buffer.
    pub const fn is_semi_planar(self) -> bool {
        matches!(
            self,
            Self::YUv8 | Self::YUv8_420 | Self::YUv10 | Self::YUv10_420
        )
    }

    /// Whether the format carries a per-pixel alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba8 | Self::Yuva8 | Self::Bgra8)
    }
}

/// Bits per color component.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorDepth {
    /// 8 bits per component
    #[default]
    Bpc8,
    /// 10 bits per component
    Bpc10,
    /// 12 bits per component
    Bpc12,
    /// 16 bits per component
    Bpc16,
}

/// A numeric hardware parameter outside of its allowed set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedValue(pub u32);

impl core::fmt::Display for UnsupportedValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Unsupported value {}", self.0)
    }
}

impl TryFrom<u32> for ColorDepth {
    type Error = UnsupportedValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_bits(value).ok_or(UnsupportedValue(value))
    }
}

impl From<ColorDepth> for u32 {
    fn from(value: ColorDepth) -> Self {
        value.bits()
    }
}

impl ColorDepth {
    /// Number of bits per component.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bpc8 => 8,
            Self::Bpc10 => 10,
            Self::Bpc12 => 12,
            Self::Bpc16 => 16,
        }
    }

    /// Converts a number of bits.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::Bpc8),
            10 => Some(Self::Bpc10),
            12 => Some(Self::Bpc12),
            16 => Some(Self::Bpc16),
            _ => None,
        }
    }

    /// Shift from an 8 bit value to this depth.
    pub const fn shift_from_8(self) -> u32 {
        self.bits() - 8
    }
}

/// Number of pixels processed per clock cycle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PixelsPerClock {
    /// 1 pixel per clock
    #[default]
    One,
    /// 2 pixels per clock
    Two,
    /// 4 pixels per clock
    Four,
    /// 8 pixels per clock
    Eight,
}

impl TryFrom<u32> for PixelsPerClock {
    type Error = UnsupportedValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_count(value).ok_or(UnsupportedValue(value))
    }
}

impl From<PixelsPerClock> for u32 {
    fn from(value: PixelsPerClock) -> Self {
        value.count()
    }
}

impl PixelsPerClock {
    /// Number of pixels.
    pub const fn count(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// Converts a pixel count.
    pub const fn from_count(count: u32) -> Option<Self> {
        match count {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            4 => Some(Self::Four),
            8 => Some(Self::Eight),
            _ => None,
        }
    }

    /// Width of the AXI4 memory-mapped data bus in bytes.
    ///
    /// Frame buffer addresses and strides are aligned to this width.
    pub const fn aximm_bytes(self) -> u32 {
        2 * self.count() * 4
    }
}

/// Frame rate in frames per second.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameRate {
    /// 24 Hz
    Hz24,
    /// 25 Hz
    Hz25,
    /// 30 Hz
    Hz30,
    /// 50 Hz
    Hz50,
    /// 60 Hz
    #[default]
    Hz60,
    /// 120 Hz
    Hz120,
}

impl FrameRate {
    /// Frames per second.
    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz24 => 24,
            Self::Hz25 => 25,
            Self::Hz30 => 30,
            Self::Hz50 => 50,
            Self::Hz60 => 60,
            Self::Hz120 => 120,
        }
    }
}

/// Timing of one video frame in pixels and lines.
///
/// Field 1 (`f1_*`) values are zero for progressive video.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoTiming {
    /// Active pixels per line.
    pub h_active: u16,
    /// Horizontal front porch in pixels.
    pub h_front_porch: u16,
    /// Horizontal sync width in pixels.
    pub h_sync_width: u16,
    /// Horizontal back porch in pixels.
    pub h_back_porch: u16,
    /// Pixels per line including blanking.
    pub h_total: u16,
    /// `true` for active high horizontal sync.
    pub h_sync_polarity: bool,
    /// Active lines per frame or field.
    pub v_active: u16,
    /// Vertical front porch of field 0 (or the progressive frame).
    pub f0_pv_front_porch: u16,
    /// Vertical sync width of field 0.
    pub f0_pv_sync_width: u16,
    /// Vertical back porch of field 0.
    pub f0_pv_back_porch: u16,
    /// Lines of field 0 including blanking.
    pub f0_pv_total: u16,
    /// Vertical front porch of field 1.
    pub f1_v_front_porch: u16,
    /// Vertical sync width of field 1.
    pub f1_v_sync_width: u16,
    /// Vertical back porch of field 1.
    pub f1_v_back_porch: u16,
    /// Lines of field 1 including blanking.
    pub f1_v_total: u16,
    /// `true` for active high vertical sync.
    pub v_sync_polarity: bool,
}

impl VideoTiming {
    #[allow(clippy::too_many_arguments)]
    const fn progressive(
        h_active: u16,
        h_front_porch: u16,
        h_sync_width: u16,
        h_back_porch: u16,
        h_sync_polarity: bool,
        v_active: u16,
        v_front_porch: u16,
        v_sync_width: u16,
        v_back_porch: u16,
        v_sync_polarity: bool,
    ) -> Self {
        Self {
            h_active,
            h_front_porch,
            h_sync_width,
            h_back_porch,
            h_total: h_active + h_front_porch + h_sync_width + h_back_porch,
            h_sync_polarity,
            v_active,
            f0_pv_front_porch: v_front_porch,
            f0_pv_sync_width: v_sync_width,
            f0_pv_back_porch: v_back_porch,
            f0_pv_total: v_active + v_front_porch + v_sync_width + v_back_porch,
            f1_v_front_porch: 0,
            f1_v_sync_width: 0,
            f1_v_back_porch: 0,
            f1_v_total: 0,
            v_sync_polarity,
        }
    }

    /// Whether the timing describes two fields per frame.
    pub const fn is_interlaced(&self) -> bool {
        self.f1_v_total != 0
    }

    /// Total number of lines of a frame, both fields included.
    pub const fn frame_lines(&self) -> u32 {
        self.f0_pv_total as u32 + self.f1_v_total as u32
    }

    /// Checks that the totals are the sums of their parts.
    pub fn validate(&self) -> bool {
        let h = self.h_active as u32
            + self.h_front_porch as u32
            + self.h_sync_width as u32
            + self.h_back_porch as u32;
        let f0 = self.v_active as u32
            + self.f0_pv_front_porch as u32
            + self.f0_pv_sync_width as u32
            + self.f0_pv_back_porch as u32;
        let f1 = if self.is_interlaced() {
            self.v_active as u32
                + self.f1_v_front_porch as u32
                + self.f1_v_sync_width as u32
                + self.f1_v_back_porch as u32
        } else {
            0
        };
        self.h_active > 0
            && self.v_active > 0
            && h == self.h_total as u32
            && f0 == self.f0_pv_total as u32
            && f1 == self.f1_v_total as u32
    }
}

/// A set of standard video modes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoMode {
    /// 640x480 at 60 Hz
    Vga60,
    /// 800x600 at 60 Hz
    Svga60,
    /// 1024x768 at 60 Hz
    Xga60,
    /// 1280x720 at 50 Hz
    Hd720p50,
    /// 1280x720 at 60 Hz
    Hd720p60,
    /// 1920x1080 at 30 Hz
    Fhd1080p30,
    /// 1920x1080 at 50 Hz
    Fhd1080p50,
    /// 1920x1080 at 60 Hz
    Fhd1080p60,
    /// 1920x1080 interlaced at 60 fields per second
    Fhd1080i60,
    /// 3840x2160 at 30 Hz
    Uhd2160p30,
    /// 3840x2160 at 60 Hz
    Uhd2160p60,
}

struct ModeEntry {
    mode: VideoMode,
    rate: FrameRate,
    timing: VideoTiming,
}

const HD1080_F0: VideoTiming =
    VideoTiming::progressive(1920, 88, 44, 148, true, 1080, 4, 5, 36, true);
const UHD2160: VideoTiming =
    VideoTiming::progressive(3840, 176, 88, 296, true, 2160, 8, 10, 72, true);

const MODES: [ModeEntry; 11] = [
    ModeEntry {
        mode: VideoMode::Vga60,
        rate: FrameRate::Hz60,
        timing: VideoTiming::progressive(640, 16, 96, 48, false, 480, 10, 2, 33, false),
    },
    ModeEntry {
        mode: VideoMode::Svga60,
        rate: FrameRate::Hz60,
        timing: VideoTiming::progressive(800, 40, 128, 88, true, 600, 1, 4, 23, true),
    },
    ModeEntry {
        mode: VideoMode::Xga60,
        rate: FrameRate::Hz60,
        timing: VideoTiming::progressive(1024, 24, 136, 160, false, 768, 3, 6, 29, false),
    },
    ModeEntry {
        mode: VideoMode::Hd720p50,
        rate: FrameRate::Hz50,
        timing: VideoTiming::progressive(1280, 440, 40, 220, true, 720, 5, 5, 20, true),
    },
    ModeEntry {
        mode: VideoMode::Hd720p60,
        rate: FrameRate::Hz60,
        timing: VideoTiming::progressive(1280, 110, 40, 220, true, 720, 5, 5, 20, true),
    },
    ModeEntry {
        mode: VideoMode::Fhd1080p30,
        rate: FrameRate::Hz30,
        timing: HD1080_F0,
    },
    ModeEntry {
        mode: VideoMode::Fhd1080p50,
        rate: FrameRate::Hz50,
        timing: VideoTiming::progressive(1920, 528, 44, 148, true, 1080, 4, 5, 36, true),
    },
    ModeEntry {
        mode: VideoMode::Fhd1080p60,
        rate: FrameRate::Hz60,
        timing: HD1080_F0,
    },
    ModeEntry {
        mode: VideoMode::Fhd1080i60,
        rate: FrameRate::Hz30,
        timing: VideoTiming {
            h_active: 1920,
            h_front_porch: 88,
            h_sync_width: 44,
            h_back_porch: 148,
            h_total: 2200,
            h_sync_polarity: true,
            v_active: 540,
            f0_pv_front_porch: 2,
            f0_pv_sync_width: 5,
            f0_pv_back_porch: 15,
            f0_pv_total: 562,
            f1_v_front_porch: 2,
            f1_v_sync_width: 5,
            f1_v_back_porch: 16,
            f1_v_total: 563,
            v_sync_polarity: true,
        },
    },
    ModeEntry {
        mode: VideoMode::Uhd2160p30,
        rate: FrameRate::Hz30,
        timing: UHD2160,
    },
    ModeEntry {
        mode: VideoMode::Uhd2160p60,
        rate: FrameRate::Hz60,
        timing: UHD2160,
    },
];

impl VideoMode {
    fn entry(self) -> &'static ModeEntry {
        // Every mode has exactly one entry, at the position of its discriminant.
        &MODES[self as usize]
    }

    /// Timing of the mode.
    pub fn timing(self) -> VideoTiming {
        self.entry().timing
    }

    /// Frame rate of the mode. Interlaced modes report full frames.
    pub fn frame_rate(self) -> FrameRate {
        self.entry().rate
    }

    /// Active width and height of a full frame.
    pub fn resolution(self) -> (u32, u32) {
        let t = self.timing();
        let lines = if t.is_interlaced() {
            2 * t.v_active as u32
        } else {
            t.v_active as u32
        };
        (t.h_active as u32, lines)
    }

    /// Whether the mode is interlaced.
    pub fn is_interlaced(self) -> bool {
        self.timing().is_interlaced()
    }

    /// Pixel clock in Hz.
    pub fn pixel_clock_hz(self) -> u64 {
        let t = self.timing();
        t.h_total as u64 * t.frame_lines() as u64 * self.frame_rate().hz() as u64
    }

    /// Finds the mode with the given active size and rate.
    pub fn find(width: u32, height: u32, rate: FrameRate, interlaced: bool) -> Option<Self> {
        MODES
            .iter()
            .find(|e| {
                e.mode.resolution() == (width, height)
                    && e.rate == rate
                    && e.timing.is_interlaced() == interlaced
            })
            .map(|e| e.mode)
    }
}

/// Description of the active video stream of a pipeline.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VideoStream {
    /// Color format on the stream interface.
    pub color_format: ColorFormat,
    /// Bits per component.
    pub color_depth: ColorDepth,
    /// Pixels per clock of the stream interface.
    pub ppc: PixelsPerClock,
    /// Frame rate.
    pub frame_rate: FrameRate,
    /// Whether the stream carries two fields per frame.
    pub interlaced: bool,
    /// Timing of the stream.
    pub timing: VideoTiming,
}

impl VideoStream {
    /// Creates a stream description from a standard mode.
    pub fn from_mode(
        mode: VideoMode,
        color_format: ColorFormat,
        color_depth: ColorDepth,
        ppc: PixelsPerClock,
    ) -> Self {
        Self {
            color_format,
            color_depth,
            ppc,
            frame_rate: mode.frame_rate(),
            interlaced: mode.is_interlaced(),
            timing: mode.timing(),
        }
    }

    /// Creates a progressive stream of the given active size without
    /// blanking information.
    pub fn new(
        width: u16,
        height: u16,
        color_format: ColorFormat,
        color_depth: ColorDepth,
        ppc: PixelsPerClock,
    ) -> Self {
        Self {
            color_format,
            color_depth,
            ppc,
            frame_rate: FrameRate::default(),
            interlaced: false,
            timing: VideoTiming {
                h_active: width,
                h_total: width,
                v_active: height,
                f0_pv_total: height,
                ..Default::default()
            },
        }
    }

    /// Active pixels per line.
    pub fn width(&self) -> u32 {
        self.timing.h_active as u32
    }

    /// Active lines per frame or field.
    pub fn height(&self) -> u32 {
        self.timing.v_active as u32
    }
}

/// A rectangle within the active video area.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    /// Horizontal start in pixels.
    pub x: u32,
    /// Vertical start in lines.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in lines.
    pub height: u32,
}

impl Window {
    /// Creates a new window.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
