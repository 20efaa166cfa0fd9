//! Unified error type for the control engine.
//!
//! Every fallible collaborator call funnels into [`Error`] so the dispatch
//! loop's error handling stays uniform.  Pin writes are deliberately
//! infallible (digital writes are assumed to always succeed); the variants
//! here cover the external collaborators only.

use core::fmt;

use crate::app::ports::{EndpointError, PowerError, SettingsError};

/// Engine-wide error.
#[derive(Debug)]
pub enum Error {
    /// The orchestration link failed (connect, send or receive).
    Endpoint(EndpointError),
    /// The settings store could not be read or written.
    Settings(SettingsError),
    /// Invoking the OS shutdown/reboot command failed.
    Power(PowerError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endpoint(e) => write!(f, "endpoint: {e}"),
            Self::Settings(e) => write!(f, "settings: {e}"),
            Self::Power(e) => write!(f, "power: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<EndpointError> for Error {
    fn from(e: EndpointError) -> Self {
        Self::Endpoint(e)
    }
}

impl From<SettingsError> for Error {
    fn from(e: SettingsError) -> Self {
        Self::Settings(e)
    }
}

impl From<PowerError> for Error {
    fn from(e: PowerError) -> Self {
        Self::Power(e)
    }
}

/// Engine-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
