//! Register-level drivers for the Xilinx video IP cores of a Zynq video
//! pipeline.
//!
//! The crate covers the video mixer, the video timing controller (VTC), the
//! test pattern generator (TPG) and the demosaic core. Every driver is a
//! typed wrapper around the register file of one IP instance and validates
//! each request before touching the hardware. Rejected requests leave the
//! registers unchanged.
//!
//! ## Register Access
//!
//! Drivers are generic over [`prelude::RegisterIo`]. On the target use
//! [`prelude::Mmio`] with the base address from the hardware configuration.
//! Tests can provide any in-memory implementation.
//!
//! ## Configuration
//!
//! The capabilities of each IP instance are fixed when the design is
//! synthesized. They are described by a [`prelude::HardwareConfig`], which
//! is either
//! - read from a YAML file (with the `serde` feature),
//! - converted to `postcard` by `xvideo-cfg` and read from a memory region, or
//! - constructed using [`prelude::HardwareConfigBuilder`], which checks every
//!   construction step.
//!
//! ## Bringing up a Pipeline
//!
//! A typical pipeline programs the VTC generator with a [`prelude::VideoMode`],
//! configures the TPG for the matching [`prelude::VideoStream`], sets the
//! stream of the mixer and places the overlay layers. See `xvideo-zynq7000`
//! for a complete example.
//!
//! ## Concurrency
//!
//! Drivers are not thread-safe. The mixer frame-done callback is called from
//! [`prelude::Mixer::interrupt_handler`], so the caller must mask the mixer
//! interrupt while changing the mixer from thread context.

#![no_std]
#![warn(
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]

#[macro_use]
mod macros;

mod config;
mod error;

pub mod csc;
pub mod demosaic;
pub mod hls;
pub mod mixer;
pub mod mmio;
pub mod tpg;
pub mod video;
pub mod vtc;

/// Standard prelude for users of the drivers.
pub mod prelude {
    pub use crate::config::*;
    pub use crate::csc::{ColorRange, ColorStandard};
    pub use crate::demosaic::{BayerPhase, Demosaic, DemosaicError};
    pub use crate::error::*;
    pub use crate::hls::{HlsCore, HlsError, HlsIrq};
    pub use crate::mixer::{
        BackgroundColor, ColorKey, FrameDoneCallback, LayerId, LayerState, Mixer, MixerError,
        Scale, ALPHA_MAX,
    };
    pub use crate::mmio::{Mmio, RegisterIo};
    pub use crate::tpg::{Mask, Overlay, Pattern, Tpg, TpgError};
    pub use crate::video::*;
    pub use crate::vtc::{
        conv_signal_to_timing, conv_timing_to_signal, conv_video_mode_to_timing, Vtc, VtcError,
        VtcHoriOffsets, VtcIrq, VtcPolarity, VtcSignal, VtcVersion,
    };
}
