//! Unified error type for the TickerView firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level loop's error handling uniform.  The subsystem errors stay
//! small `Copy` values so they can ride inside [`AppEvent`](crate::app::events::AppEvent)s.

use core::fmt;

use crate::app::ports::StorageError;
use crate::config::ValidationError;
use crate::storage::PersistError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// A field write was rejected.
    Validation(ValidationError),
    /// The stored image was rejected or could not be written.
    Persist(PersistError),
    /// The storage medium itself failed.
    Storage(StorageError),
    /// The web form snapshot could not be rendered.
    Snapshot(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "config: {e}"),
            Self::Persist(e) => write!(f, "storage: {e}"),
            Self::Storage(e) => write!(f, "medium: {e}"),
            Self::Snapshot(e) => write!(f, "snapshot: {e}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Persist(e) => Some(e),
            Self::Storage(e) => Some(e),
            Self::Snapshot(e) => Some(e),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<PersistError> for Error {
    fn from(e: PersistError) -> Self {
        Self::Persist(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Snapshot(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
