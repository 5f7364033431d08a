//! Error types

use core::fmt::{Display, Formatter};

use crate::{
    config::HardwareConfigError, demosaic::DemosaicError, hls::HlsError, mixer::MixerError,
    tpg::TpgError, vtc::VtcError,
};

/// Generic failure.
pub const XST_FAILURE: u32 = 1;
/// No device with the requested id.
pub const XST_DEVICE_NOT_FOUND: u32 = 2;
/// A parameter is out of range.
pub const XST_INVALID_PARAM: u32 = 15;

/// General error type for this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Invalid hardware configuration.
    Configuration(HardwareConfigError),

    /// HLS control handshake failed.
    Hls(HlsError),

    /// Video mixer rejected a request.
    Mixer(MixerError),

    /// Video timing controller rejected a request.
    Vtc(VtcError),

    /// Test pattern generator rejected a request.
    Tpg(TpgError),

    /// Demosaic rejected a request.
    Demosaic(DemosaicError),
}

impl Error {
    /// The status code reported for this error.
    pub fn code(&self) -> u32 {
        match self {
            Error::Configuration(e) => e.code(),
            Error::Hls(e) => e.code(),
            Error::Mixer(e) => e.code(),
            Error::Vtc(e) => e.code(),
            Error::Tpg(e) => e.code(),
            Error::Demosaic(e) => e.code(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Configuration(e) => write!(f, "Invalid configuration: {e}"),
            Error::Hls(e) => write!(f, "HLS control failed: {e}"),
            Error::Mixer(e) => write!(f, "Video mixer: {e}"),
            Error::Vtc(e) => write!(f, "Video timing controller: {e}"),
            Error::Tpg(e) => write!(f, "Test pattern generator: {e}"),
            Error::Demosaic(e) => write!(f, "Demosaic: {e}"),
        }
    }
}

impl From<HardwareConfigError> for Error {
    fn from(value: HardwareConfigError) -> Self {
        Error::Configuration(value)
    }
}

impl From<HlsError> for Error {
    fn from(value: HlsError) -> Self {
        Error::Hls(value)
    }
}

impl From<MixerError> for Error {
    fn from(value: MixerError) -> Self {
        Error::Mixer(value)
    }
}

impl From<VtcError> for Error {
    fn from(value: VtcError) -> Self {
        Error::Vtc(value)
    }
}

impl From<TpgError> for Error {
    fn from(value: TpgError) -> Self {
        Error::Tpg(value)
    }
}

impl From<DemosaicError> for Error {
    fn from(value: DemosaicError) -> Self {
        Error::Demosaic(value)
    }
}
