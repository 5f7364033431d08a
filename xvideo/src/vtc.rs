//! Video timing controller driver.
//!
//! The timing controller generates the sync and blanking signals of a video
//! mode (generator) and measures the timing of an incoming stream
//! (detector). Both blocks use the same register bank layout, described by
//! [VtcSignal] and [VtcHoriOffsets].

use crate::{
    config::{DeviceId, HardwareConfigError, VtcConfig},
    error::{Error, XST_FAILURE, XST_INVALID_PARAM},
    mmio::RegisterIo,
    video::{VideoMode, VideoTiming},
};
use bitflags::bitflags;
use core::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Register map of the timing controller.
pub mod regs {
    /// Control
    pub const CTL: usize = 0x000;
    /// Interrupt status
    pub const ISR: usize = 0x004;
    /// Error status
    pub const ERROR: usize = 0x008;
    /// Interrupt enable
    pub const IER: usize = 0x00C;
    /// Core version
    pub const VERSION: usize = 0x010;

    /// Detector bank
    pub const DETECTOR: usize = 0x020;
    /// Generator bank
    pub const GENERATOR: usize = 0x060;

    /// Active size, horizontal in bits 12:0, vertical in bits 28:16.
    pub const ASIZE: usize = 0x00;
    /// Bank status
    pub const STATUS: usize = 0x04;
    /// Field encoding
    pub const ENC: usize = 0x08;
    /// Signal polarity
    pub const POL: usize = 0x0C;
    /// Horizontal total
    pub const HSIZE: usize = 0x10;
    /// Vertical totals of field 0 and field 1
    pub const VSIZE: usize = 0x14;
    /// Horizontal sync start and end
    pub const HSYNC: usize = 0x18;
    /// Field 0 vertical blank horizontal offsets
    pub const F0_VBLANK_HOFF: usize = 0x1C;
    /// Field 0 vertical sync start and end
    pub const F0_VSYNC: usize = 0x20;
    /// Field 0 vertical sync horizontal offsets
    pub const F0_VSYNC_HOFF: usize = 0x24;
    /// Field 1 vertical blank horizontal offsets
    pub const F1_VBLANK_HOFF: usize = 0x28;
    /// Field 1 vertical sync start and end
    pub const F1_VSYNC: usize = 0x2C;
    /// Field 1 vertical sync horizontal offsets
    pub const F1_VSYNC_HOFF: usize = 0x30;
    /// Active size of field 1
    pub const F1_ASIZE: usize = 0x34;
}

const CTL_SW_ENABLE: u32 = 1 << 0;
const CTL_REG_UPDATE: u32 = 1 << 1;
const CTL_GEN_ENABLE: u32 = 1 << 2;
const CTL_DET_ENABLE: u32 = 1 << 3;
const CTL_SOURCE_SELECT: u32 = 0x03FF_FF00;
const CTL_SYNC_RESET: u32 = 1 << 30;
const CTL_RESET: u32 = 1 << 31;

const ENC_INTERLACED: u32 = 1 << 6;
const STATUS_LOCKED: u32 = 1 << 0;
const FIELD_MASK: u32 = 0x1FFF;

bitflags! {
    /// Interrupt sources of the timing controller.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VtcIrq: u32 {
        /// Detector locked to the input.
        const LOCK             = 1 << 8;
        /// Detector lost lock.
        const LOST_LOCK        = 1 << 9;
        /// Detector vertical blank.
        const DET_VBLANK       = 1 << 10;
        /// Detector active video.
        const DET_ACTIVE_VIDEO = 1 << 11;
        /// Generator vertical blank.
        const GEN_VBLANK       = 1 << 12;
        /// Generator active video.
        const GEN_ACTIVE_VIDEO = 1 << 13;
        /// Frame sync outputs.
        const FRAME_SYNC       = 0xFFFF_0000;
    }
}

/// Polarity of the timing signals. `true` is active high.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VtcPolarity {
    /// Active chroma
    pub active_chroma: bool,
    /// Active video
    pub active_video: bool,
    /// Field id
    pub field_id: bool,
    /// Vertical blank
    pub vblank: bool,
    /// Vertical sync
    pub vsync: bool,
    /// Horizontal blank
    pub hblank: bool,
    /// Horizontal sync
    pub hsync: bool,
}

impl VtcPolarity {
    fn to_register(self) -> u32 {
        [
            self.vblank,
            self.hblank,
            self.vsync,
            self.hsync,
            self.active_video,
            self.active_chroma,
            self.field_id,
        ]
        .iter()
        .enumerate()
        .fold(0, |acc, (bit, on)| acc | (*on as u32) << bit)
    }

    fn from_register(value: u32) -> Self {
        let bit = |n: u32| value & (1 << n) != 0;
        Self {
            vblank: bit(0),
            hblank: bit(1),
            vsync: bit(2),
            hsync: bit(3),
            active_video: bit(4),
            active_chroma: bit(5),
            field_id: bit(6),
        }
    }
}

/// Timing expressed as start points relative to the start of active video.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VtcSignal {
    /// First active pixel of a line
    pub h_active_start: u16,
    /// First pixel of the front porch
    pub h_front_porch_start: u16,
    /// First pixel of horizontal sync
    pub h_sync_start: u16,
    /// First pixel of the back porch
    pub h_back_porch_start: u16,
    /// Pixels per line
    pub h_total: u16,
    /// First active line of field 0
    pub v0_active_start: u16,
    /// First front porch line of field 0
    pub v0_front_porch_start: u16,
    /// First sync line of field 0
    pub v0_sync_start: u16,
    /// First back porch line of field 0
    pub v0_back_porch_start: u16,
    /// Lines of field 0
    pub v0_total: u16,
    /// First active line of field 1
    pub v1_active_start: u16,
    /// First front porch line of field 1
    pub v1_front_porch_start: u16,
    /// First sync line of field 1
    pub v1_sync_start: u16,
    /// First back porch line of field 1
    pub v1_back_porch_start: u16,
    /// Lines of field 1
    pub v1_total: u16,
    /// Two fields per frame
    pub interlaced: bool,
}

impl VtcSignal {
    fn is_consistent(&self) -> bool {
        let h = [
            self.h_active_start,
            self.h_front_porch_start,
            self.h_sync_start,
            self.h_back_porch_start,
            self.h_total,
        ];
        let v0 = [
            self.v0_active_start,
            self.v0_front_porch_start,
            self.v0_sync_start,
            self.v0_back_porch_start,
            self.v0_total,
        ];
        let v1 = [
            self.v1_active_start,
            self.v1_front_porch_start,
            self.v1_sync_start,
            self.v1_back_porch_start,
            self.v1_total,
        ];
        let ordered = |s: &[u16]| s.windows(2).all(|w| w[0] <= w[1]);
        let fits = |s: &[u16]| s.iter().all(|v| (*v as u32) <= FIELD_MASK);
        self.h_front_porch_start > self.h_active_start
            && self.v0_front_porch_start > self.v0_active_start
            && ordered(&h)
            && ordered(&v0)
            && fits(&h)
            && fits(&v0)
            && (!self.interlaced || (ordered(&v1) && fits(&v1)))
    }
}

/// Horizontal positions of the vertical blank and sync edges per field.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VtcHoriOffsets {
    /// Field 0 vertical blank start column
    pub v0_blank_hori_start: u16,
    /// Field 0 vertical blank end column
    pub v0_blank_hori_end: u16,
    /// Field 0 vertical sync start column
    pub v0_sync_hori_start: u16,
    /// Field 0 vertical sync end column
    pub v0_sync_hori_end: u16,
    /// Field 1 vertical blank start column
    pub v1_blank_hori_start: u16,
    /// Field 1 vertical blank end column
    pub v1_blank_hori_end: u16,
    /// Field 1 vertical sync start column
    pub v1_sync_hori_start: u16,
    /// Field 1 vertical sync end column
    pub v1_sync_hori_end: u16,
}

/// Version of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VtcVersion {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Revision
    pub revision: u8,
}

/// Errors reported by the timing controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VtcError {
    /// The generator or detector was not synthesized.
    DisabledInHardware,
    /// The timing is not ordered or does not fit the registers.
    InvalidTiming,
}

impl VtcError {
    /// Status code of this error.
    pub fn code(&self) -> u32 {
        match self {
            Self::DisabledInHardware => XST_FAILURE,
            Self::InvalidTiming => XST_INVALID_PARAM,
        }
    }
}

impl Display for VtcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DisabledInHardware => write!(f, "Disabled in hardware"),
            Self::InvalidTiming => write!(f, "Invalid timing"),
        }
    }
}

fn pack(lo: u16, hi: u16) -> u32 {
    (lo as u32 & FIELD_MASK) | ((hi as u32 & FIELD_MASK) << 16)
}

fn unpack(value: u32) -> (u16, u16) {
    ((value & FIELD_MASK) as u16, ((value >> 16) & FIELD_MASK) as u16)
}

/// Converts a timing to start points and horizontal offsets.
pub fn conv_timing_to_signal(timing: &VideoTiming) -> (VtcSignal, VtcHoriOffsets) {
    let h_front_porch_start = timing.h_active;
    let h_sync_start = timing.h_active.saturating_add(timing.h_front_porch);
    let h_back_porch_start = h_sync_start.saturating_add(timing.h_sync_width);
    let v0_sync_start = timing
        .v_active
        .saturating_add(timing.f0_pv_front_porch)
        .saturating_sub(1);
    let mut signal = VtcSignal {
        h_active_start: 0,
        h_front_porch_start,
        h_sync_start,
        h_back_porch_start,
        h_total: timing.h_total,
        v0_active_start: 0,
        v0_front_porch_start: timing.v_active,
        v0_sync_start,
        v0_back_porch_start: v0_sync_start.saturating_add(timing.f0_pv_sync_width),
        v0_total: timing.f0_pv_total,
        interlaced: timing.is_interlaced(),
        ..Default::default()
    };
    let mut hoff = VtcHoriOffsets {
        v0_blank_hori_start: h_front_porch_start,
        v0_blank_hori_end: h_front_porch_start,
        v0_sync_hori_start: h_sync_start,
        v0_sync_hori_end: h_sync_start,
        ..Default::default()
    };
    if signal.interlaced {
        let v1_sync_start = timing
            .v_active
            .saturating_add(timing.f1_v_front_porch)
            .saturating_sub(1);
        signal.v1_front_porch_start = timing.v_active;
        signal.v1_sync_start = v1_sync_start;
        signal.v1_back_porch_start = v1_sync_start.saturating_add(timing.f1_v_sync_width);
        signal.v1_total = timing.f1_v_total;
        // Field 1 blanks and syncs in the middle of a line.
        let half_line = timing.h_total / 2;
        hoff.v1_blank_hori_start = h_front_porch_start.saturating_sub(half_line);
        hoff.v1_blank_hori_end = h_front_porch_start.saturating_sub(half_line);
        hoff.v1_sync_hori_start = h_sync_start.saturating_sub(half_line);
        hoff.v1_sync_hori_end = h_sync_start.saturating_sub(half_line);
    }
    (signal, hoff)
}

/// Converts start points back to a timing.
pub fn conv_signal_to_timing(signal: &VtcSignal, polarity: &VtcPolarity) -> VideoTiming {
    let v_active = signal
        .v0_front_porch_start
        .saturating_sub(signal.v0_active_start);
    let mut timing = VideoTiming {
        h_active: signal
            .h_front_porch_start
            .saturating_sub(signal.h_active_start),
        h_front_porch: signal
            .h_sync_start
            .saturating_sub(signal.h_front_porch_start),
        h_sync_width: signal
            .h_back_porch_start
            .saturating_sub(signal.h_sync_start),
        h_back_porch: signal.h_total.saturating_sub(signal.h_back_porch_start),
        h_total: signal.h_total,
        h_sync_polarity: polarity.hsync,
        v_active,
        f0_pv_front_porch: signal
            .v0_sync_start
            .saturating_add(1)
            .saturating_sub(signal.v0_front_porch_start),
        f0_pv_sync_width: signal
            .v0_back_porch_start
            .saturating_sub(signal.v0_sync_start),
        f0_pv_back_porch: signal
            .v0_total
            .saturating_sub(signal.v0_back_porch_start.saturating_add(1)),
        f0_pv_total: signal.v0_total,
        v_sync_polarity: polarity.vsync,
        ..Default::default()
    };
    if signal.interlaced {
        timing.f1_v_front_porch =
            signal.v1_sync_start.saturating_add(1).saturating_sub(signal.v1_front_porch_start);
        timing.f1_v_sync_width = signal
            .v1_back_porch_start
            .saturating_sub(signal.v1_sync_start);
        timing.f1_v_back_porch = signal
            .v1_total
            .saturating_sub(signal.v1_back_porch_start.saturating_add(1));
        timing.f1_v_total = signal.v1_total;
    }
    timing
}

/// Timing of a standard video mode.
pub fn conv_video_mode_to_timing(mode: VideoMode) -> VideoTiming {
    mode.timing()
}

/// A video timing controller instance.
#[derive(Debug, Clone)]
pub struct Vtc<R: RegisterIo> {
    io: R,
    config: VtcConfig,
}

impl<R: RegisterIo> Vtc<R> {
    /// Initializes the driver for the core described by `config`.
    /// The hardware is not touched.
    pub fn initialize(config: VtcConfig, io: R) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { io, config })
    }

    /// Looks up `device_id` in `configs` and initializes the driver.
    pub fn from_table<'a, I>(configs: I, device_id: DeviceId, io: R) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a VtcConfig>,
    {
        let config = configs
            .into_iter()
            .find(|c| c.device_id == device_id)
            .ok_or(HardwareConfigError::NotFound)?;
        Self::initialize(config.clone(), io)
    }

    /// Hardware configuration of this instance.
    pub fn config(&self) -> &VtcConfig {
        &self.config
    }

    /// Resets the core. All registers return to their reset values.
    pub fn reset(&self) {
        self.io.write(regs::CTL, CTL_RESET);
    }

    /// Resets the frame sync logic while keeping the configuration.
    pub fn sync_reset(&self) {
        self.io.modify(regs::CTL, |v| v | CTL_SYNC_RESET);
        self.io.modify(regs::CTL, |v| v & !CTL_SYNC_RESET);
    }

    /// Enables the core.
    pub fn enable(&self) {
        self.io.modify(regs::CTL, |v| v | CTL_SW_ENABLE);
    }

    /// Disables the core.
    pub fn disable(&self) {
        self.io.modify(regs::CTL, |v| v & !CTL_SW_ENABLE);
    }

    fn require_generator(&self) -> Result<(), VtcError> {
        if self.config.generator {
            Ok(())
        } else {
            xv_warn!("VTC {} has no generator", self.config.device_id);
            Err(VtcError::DisabledInHardware)
        }
    }

    fn require_detector(&self) -> Result<(), VtcError> {
        if self.config.detector {
            Ok(())
        } else {
            xv_warn!("VTC {} has no detector", self.config.device_id);
            Err(VtcError::DisabledInHardware)
        }
    }

    /// Enables the timing generator.
    pub fn enable_generator(&self) -> Result<(), VtcError> {
        self.require_generator()?;
        self.io.modify(regs::CTL, |v| v | CTL_GEN_ENABLE);
        Ok(())
    }

    /// Disables the timing generator.
    pub fn disable_generator(&self) -> Result<(), VtcError> {
        self.require_generator()?;
        self.io.modify(regs::CTL, |v| v & !CTL_GEN_ENABLE);
        Ok(())
    }

    /// Enables the timing detector.
    pub fn enable_detector(&self) -> Result<(), VtcError> {
        self.require_detector()?;
        self.io.modify(regs::CTL, |v| v | CTL_DET_ENABLE);
        Ok(())
    }

    /// Disables the timing detector.
    pub fn disable_detector(&self) -> Result<(), VtcError> {
        self.require_detector()?;
        self.io.modify(regs::CTL, |v| v & !CTL_DET_ENABLE);
        Ok(())
    }

    /// Lets the generator pick up register changes at the next frame.
    pub fn register_update_enable(&self) {
        self.io.modify(regs::CTL, |v| v | CTL_REG_UPDATE);
    }

    /// Holds register changes until updates are enabled again.
    pub fn register_update_disable(&self) {
        self.io.modify(regs::CTL, |v| v & !CTL_REG_UPDATE);
    }

    /// Takes every generator parameter from the generator registers instead
    /// of the detector.
    pub fn set_source_select_all(&self) {
        self.io.modify(regs::CTL, |v| v | CTL_SOURCE_SELECT);
    }

    /// Sets the polarity of the generated signals.
    pub fn set_polarity(&self, polarity: &VtcPolarity) -> Result<(), VtcError> {
        self.require_generator()?;
        self.io
            .write(regs::GENERATOR + regs::POL, polarity.to_register());
        Ok(())
    }

    /// Polarity of the generated signals.
    pub fn polarity(&self) -> VtcPolarity {
        VtcPolarity::from_register(self.io.read(regs::GENERATOR + regs::POL))
    }

    /// Programs the generator.
    ///
    /// # Errors
    /// Returns [VtcError::InvalidTiming] if the start points are not ordered
    /// or exceed the 13 bit register fields.
    pub fn set_generator(&self, signal: &VtcSignal, hoff: &VtcHoriOffsets) -> Result<(), VtcError> {
        self.require_generator()?;
        if !signal.is_consistent() {
            xv_warn!("Rejected generator signal {:?}", signal);
            return Err(VtcError::InvalidTiming);
        }
        let g = regs::GENERATOR;
        let h_active = signal.h_front_porch_start - signal.h_active_start;
        let v0_active = signal.v0_front_porch_start - signal.v0_active_start;
        let v1_active = signal
            .v1_front_porch_start
            .saturating_sub(signal.v1_active_start);
        self.io.write(g + regs::ASIZE, pack(h_active, v0_active));
        self.io.write(g + regs::F1_ASIZE, pack(h_active, v1_active));
        self.io.write(g + regs::HSIZE, signal.h_total as u32);
        self.io
            .write(g + regs::VSIZE, pack(signal.v0_total, signal.v1_total));
        self.io.write(
            g + regs::HSYNC,
            pack(signal.h_sync_start, signal.h_back_porch_start),
        );
        self.io.write(
            g + regs::F0_VBLANK_HOFF,
            pack(hoff.v0_blank_hori_start, hoff.v0_blank_hori_end),
        );
        self.io.write(
            g + regs::F0_VSYNC,
            pack(signal.v0_sync_start, signal.v0_back_porch_start),
        );
        self.io.write(
            g + regs::F0_VSYNC_HOFF,
            pack(hoff.v0_sync_hori_start, hoff.v0_sync_hori_end),
        );
        self.io.write(
            g + regs::F1_VBLANK_HOFF,
            pack(hoff.v1_blank_hori_start, hoff.v1_blank_hori_end),
        );
        self.io.write(
            g + regs::F1_VSYNC,
            pack(signal.v1_sync_start, signal.v1_back_porch_start),
        );
        self.io.write(
            g + regs::F1_VSYNC_HOFF,
            pack(hoff.v1_sync_hori_start, hoff.v1_sync_hori_end),
        );
        let enc = if signal.interlaced { ENC_INTERLACED } else { 0 };
        self.io.modify(g + regs::ENC, |v| (v & !ENC_INTERLACED) | enc);
        xv_trace!("Generator programmed with {:?}", signal);
        Ok(())
    }

    fn read_bank(&self, bank: usize) -> (VtcSignal, VtcHoriOffsets) {
        let (h_active, v0_active) = unpack(self.io.read(bank + regs::ASIZE));
        let (_, v1_active) = unpack(self.io.read(bank + regs::F1_ASIZE));
        let (v0_total, v1_total) = unpack(self.io.read(bank + regs::VSIZE));
        let (h_sync_start, h_back_porch_start) = unpack(self.io.read(bank + regs::HSYNC));
        let (v0_sync_start, v0_back_porch_start) = unpack(self.io.read(bank + regs::F0_VSYNC));
        let (v1_sync_start, v1_back_porch_start) = unpack(self.io.read(bank + regs::F1_VSYNC));
        let interlaced = self.io.read(bank + regs::ENC) & ENC_INTERLACED != 0;
        let signal = VtcSignal {
            h_active_start: 0,
            h_front_porch_start: h_active,
            h_sync_start,
            h_back_porch_start,
            h_total: (self.io.read(bank + regs::HSIZE) & FIELD_MASK) as u16,
            v0_active_start: 0,
            v0_front_porch_start: v0_active,
            v0_sync_start,
            v0_back_porch_start,
            v0_total,
            v1_active_start: 0,
            v1_front_porch_start: if interlaced { v1_active } else { 0 },
            v1_sync_start: if interlaced { v1_sync_start } else { 0 },
            v1_back_porch_start: if interlaced { v1_back_porch_start } else { 0 },
            v1_total: if interlaced { v1_total } else { 0 },
            interlaced,
        };
        let (v0_blank_hori_start, v0_blank_hori_end) =
            unpack(self.io.read(bank + regs::F0_VBLANK_HOFF));
        let (v0_sync_hori_start, v0_sync_hori_end) =
            unpack(self.io.read(bank + regs::F0_VSYNC_HOFF));
        let (v1_blank_hori_start, v1_blank_hori_end) =
            unpack(self.io.read(bank + regs::F1_VBLANK_HOFF));
        let (v1_sync_hori_start, v1_sync_hori_end) =
            unpack(self.io.read(bank + regs::F1_VSYNC_HOFF));
        let hoff = VtcHoriOffsets {
            v0_blank_hori_start,
            v0_blank_hori_end,
            v0_sync_hori_start,
            v0_sync_hori_end,
            v1_blank_hori_start,
            v1_blank_hori_end,
            v1_sync_hori_start,
            v1_sync_hori_end,
        };
        (signal, hoff)
    }

    /// Reads back the generator configuration.
    pub fn generator(&self) -> Result<(VtcSignal, VtcHoriOffsets), VtcError> {
        self.require_generator()?;
        Ok(self.read_bank(regs::GENERATOR))
    }

    /// Timing measured by the detector.
    pub fn detector(&self) -> Result<(VtcSignal, VtcHoriOffsets), VtcError> {
        self.require_detector()?;
        Ok(self.read_bank(regs::DETECTOR))
    }

    /// Timing measured by the detector, including the detected polarity.
    pub fn detector_timing(&self) -> Result<VideoTiming, VtcError> {
        let (signal, _) = self.detector()?;
        let polarity = VtcPolarity::from_register(self.io.read(regs::DETECTOR + regs::POL));
        Ok(conv_signal_to_timing(&signal, &polarity))
    }

    /// Whether the detector is locked to its input.
    pub fn detector_locked(&self) -> Result<bool, VtcError> {
        self.require_detector()?;
        Ok(self.io.read(regs::DETECTOR + regs::STATUS) & STATUS_LOCKED != 0)
    }

    /// Programs the generator with `timing`, including sync polarities.
    pub fn set_generator_timing(&self, timing: &VideoTiming) -> Result<(), VtcError> {
        if !timing.validate() {
            return Err(VtcError::InvalidTiming);
        }
        let (signal, hoff) = conv_timing_to_signal(timing);
        let polarity = VtcPolarity {
            active_chroma: true,
            active_video: true,
            field_id: true,
            vblank: timing.v_sync_polarity,
            vsync: timing.v_sync_polarity,
            hblank: timing.h_sync_polarity,
            hsync: timing.h_sync_polarity,
        };
        self.set_generator(&signal, &hoff)?;
        self.set_polarity(&polarity)?;
        xv_debug!(
            "VTC {} generating {}x{}",
            self.config.device_id,
            timing.h_active,
            timing.v_active
        );
        Ok(())
    }

    /// Timing the generator is programmed with.
    pub fn generator_timing(&self) -> Result<VideoTiming, VtcError> {
        let (signal, _) = self.generator()?;
        Ok(conv_signal_to_timing(&signal, &self.polarity()))
    }

    /// Programs the generator with a standard video mode.
    pub fn set_generator_video_mode(&self, mode: VideoMode) -> Result<(), VtcError> {
        self.set_generator_timing(&conv_video_mode_to_timing(mode))
    }

    /// Version of the core.
    pub fn version(&self) -> VtcVersion {
        let v = self.io.read(regs::VERSION);
        VtcVersion {
            major: (v >> 24) as u8,
            minor: (v >> 16) as u8,
            revision: ((v >> 12) & 0xF) as u8,
        }
    }

    /// Enables the given interrupt sources.
    pub fn interrupt_enable(&self, mask: VtcIrq) {
        self.io.modify(regs::IER, |v| v | mask.bits());
    }

    /// Disables the given interrupt sources.
    pub fn interrupt_disable(&self, mask: VtcIrq) {
        self.io.modify(regs::IER, |v| v & !mask.bits());
    }

    /// Pending interrupt sources.
    pub fn interrupt_status(&self) -> VtcIrq {
        VtcIrq::from_bits_truncate(self.io.read(regs::ISR))
    }

    /// Acknowledges the given interrupt sources.
    pub fn interrupt_clear(&self, mask: VtcIrq) {
        self.io.write(regs::ISR, mask.bits());
    }

    /// Logs the state of the core.
    pub fn report(&self) {
        let version = self.version();
        xv_info!(
            "VTC {}: version {}.{}.{}, control {:#010x}, error {:#010x}",
            self.config.device_id,
            version.major,
            version.minor,
            version.revision,
            self.io.read(regs::CTL),
            self.io.read(regs::ERROR)
        );
        if let Ok(timing) = self.generator_timing() {
            xv_info!("  generator: {:?}", timing);
        }
        if let Ok(locked) = self.detector_locked() {
            xv_info!("  detector locked: {}", locked);
        }
    }
}
