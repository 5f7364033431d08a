//! Video pipeline bring-up for a Zynq-7000 with the Xilinx video IP cores.
//!
//! The `demo` example builds a static library for the boot code. It exports
//! `xvideo_demo_main`, which takes the `postcard` hardware description
//! produced by `xvideo-cfg`, and `xvideo_mixer_irq` for the mixer interrupt.

#![no_std]

mod logger;
mod pipeline;

pub use logger::UartLogger;
pub use pipeline::{OverlaySettings, Pipeline, PipelineSettings};

use core::fmt::{Display, Formatter};
use xvideo::prelude::*;

/// Board constants of the demo design.
pub mod config {
    /// AXI UART 16550 used for logging
    pub const UART_BASE: usize = 0x42C0_0000;
    pub const UART_CLOCK_RATE: usize = 100_000_000;
    pub const UART_BAUD_RATE: usize = 115200;
    /// Frame buffer shown by the overlay layer
    pub const FRAME_BUFFER: u64 = 0x1000_0000;
}

/// Hardware description capacities accepted by the demo.
pub type DemoConfig = HardwareConfig<4, 4, 4, 4>;

/// What the demo shows: color bars with a frame buffer overlay in the center.
pub const DEMO_SETTINGS: PipelineSettings = PipelineSettings {
    mode: VideoMode::Fhd1080p60,
    color_format: ColorFormat::Rgb,
    color_depth: ColorDepth::Bpc8,
    pattern: Pattern::ColorBars,
    background: BackgroundColor::Blue,
    overlay: Some(OverlaySettings {
        layer: 1,
        window: Window::new(640, 360, 640, 360),
        stride: 640 * 4,
        buffer: config::FRAME_BUFFER,
    }),
};

/// Errors of the demo.
#[derive(Debug)]
pub enum DemoError {
    /// The hardware description could not be decoded.
    Decode(postcard::Error),
    /// A driver rejected a request.
    Video(Error),
}

impl DemoError {
    /// Status code reported to the boot code.
    pub fn code(&self) -> u32 {
        match self {
            Self::Decode(_) => XST_FAILURE,
            Self::Video(e) => e.code(),
        }
    }
}

impl Display for DemoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "Failed to decode hardware description: {e}"),
            Self::Video(e) => write!(f, "{e}"),
        }
    }
}

impl From<postcard::Error> for DemoError {
    fn from(value: postcard::Error) -> Self {
        Self::Decode(value)
    }
}

impl From<Error> for DemoError {
    fn from(value: Error) -> Self {
        Self::Video(value)
    }
}

impl From<HardwareConfigError> for DemoError {
    fn from(value: HardwareConfigError) -> Self {
        Self::Video(value.into())
    }
}

/// Decodes a hardware description and checks it.
pub fn decode_config(blob: &[u8]) -> Result<DemoConfig, DemoError> {
    let cfg: DemoConfig = postcard::from_bytes(blob)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Brings up the pipeline described by `blob` and stores it in `slot`.
///
/// The mixer interrupt is enabled only after the pipeline is stored, so an
/// interrupt handler that reads `slot` always finds the mixer to acknowledge.
pub fn bring_up<'a, R: RegisterIo>(
    slot: &'a mut Option<Pipeline<R>>,
    blob: &[u8],
    map: impl FnMut(usize) -> R,
    on_frame_done: FrameDoneCallback,
) -> Result<&'a Pipeline<R>, DemoError> {
    let cfg = decode_config(blob)?;
    let mut pipeline = Pipeline::from_config(&cfg, map)?;
    pipeline.mixer.set_frame_done_callback(on_frame_done);
    pipeline.start(&DEMO_SETTINGS)?;
    let pipeline = slot.insert(pipeline);
    pipeline.mixer.interrupt_enable();
    pipeline.report();
    Ok(pipeline)
}
