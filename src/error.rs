use thiserror::Error;

use crate::pulse::Phase;

pub type Result<T> = std::result::Result<T, HcSr04Error>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HcSr04Error {
    /// No echo edge within the timeout. Usually means nothing is in range.
    #[error("no echo edge while {phase} after {waited_micros}us")]
    Timeout { phase: Phase, waited_micros: u32 },

    #[error("invalid line configuration: {0}")]
    InvalidConfiguration(String),

    /// Raised by [`crate::HcSr04`] only, never by the pulse timer.
    #[error("reading of {micros}us is below the minimum distance threshold")]
    BelowThreshold { micros: u32 },
}

impl HcSr04Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HcSr04Error::Timeout { .. })
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        HcSr04Error::InvalidConfiguration(reason.into())
    }

    /// Maps a level read/write failure on an already configured line.
    pub(crate) fn from_pin<E: embedded_hal::digital::Error>(line: &str, err: E) -> Self {
        HcSr04Error::InvalidConfiguration(format!("{line} line rejected I/O: {:?}", err.kind()))
    }
}
