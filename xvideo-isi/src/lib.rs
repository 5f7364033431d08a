//! Image sensor interface (ISI) for camera sensors on the video pipeline.
//!
//! Every sensor driver implements [`prelude::IsiSensor`]. The trait covers
//! connection checks, mode selection, streaming and the exposure controls
//! used by an auto exposure loop. Features that only some sensors have, like
//! digital gain or white balance, are optional and report
//! [`prelude::IsiError::NotSupported`] when missing.
//!
//! Drivers are included for the OmniVision OX03F10, OX05B1S and OX08B40.
//! They talk to the sensor over any [`embedded_hal::i2c::I2c`] bus.
//!
//! ## Lifecycle
//!
//! [`prelude::Iss`] wraps a driver and enforces the order
//! open, stream, close. A [`prelude::SensorConfig`] names the model, address
//! and mode of a sensor and can be read from the board configuration with the
//! `serde` feature. [`prelude::probe`] detects the model from its chip id.
//!
//! ```ignore
//! let mut iss = SensorConfig { model: SensorModel::Ox08b40, address: 0x36, mode: 1 }
//!     .open(i2c)?;
//! iss.set_streaming(true)?;
//! let (gain, time) = iss.exposure_control(Gain::from_int(2), 10_000)?;
//! ```

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

#[macro_use]
pub mod omnivision;

pub mod iss;
pub mod ox03f10;
pub mod ox05b1s;
pub mod ox08b40;
pub mod sccb;
pub mod sensor;

/// Standard prelude for users of the sensor drivers.
pub mod prelude {
    pub use crate::iss::{probe, AnySensor, Iss, IssState, SensorConfig, SensorModel};
    pub use crate::ox03f10::Ox03f10;
    pub use crate::ox05b1s::Ox05b1s;
    pub use crate::ox08b40::Ox08b40;
    pub use crate::sccb::Sccb;
    pub use crate::sensor::*;
}
