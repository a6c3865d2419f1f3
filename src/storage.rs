//! Checksum-guarded persistence of the configuration record.
//!
//! The persisted span (see [`crate::config::layout`]) is written to the
//! start of the storage medium in one go and committed.  On read the image
//! is accepted only if the magic header and the checksum both match; a
//! rejected image leaves the in-memory record untouched so the caller can
//! fall back to the compiled defaults.
//!
//! The checksum is a legacy position-weighted sum kept bit-for-bit for
//! compatibility with images already on devices.  It catches truncation
//! and most accidental corruption.  It is not a security control.

use core::fmt;

use log::{error, info, warn};

use crate::app::ports::{StorageError, StoragePort};
use crate::config::layout::{self, Image, PERSISTED_LEN};
use crate::config::DeviceConfig;

pub use crate::config::layout::{compute_checksum, InvalidReason};

/// Why a read or write did not go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistError {
    /// The stored image failed validation.
    Invalid(InvalidReason),
    /// The medium could not be read.
    ReadFailed(StorageError),
    /// The image could not be written or committed.  Flash may hold a
    /// partial image, which the next read rejects.
    WriteFailed(StorageError),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(r) => write!(f, "stored config invalid: {r}"),
            Self::ReadFailed(e) => write!(f, "config read failed: {e}"),
            Self::WriteFailed(e) => write!(f, "config write failed: {e}"),
        }
    }
}

impl core::error::Error for PersistError {}

/// Load the persisted fields of `cfg` from `storage`.
///
/// Runtime fields are never touched.  On any error `cfg` is unchanged.
/// Returns the stored checksum.
pub fn read_config(storage: &mut impl StoragePort, cfg: &mut DeviceConfig) -> Result<u16, PersistError> {
    let mut image: Image = [0u8; PERSISTED_LEN];
    storage.read(0, &mut image).map_err(|e| {
        error!("storage: read failed: {e}");
        PersistError::ReadFailed(e)
    })?;

    match layout::decode(&image) {
        Ok(loaded) => {
            cfg.copy_persisted_from(&loaded);
            let sum = layout::stored_checksum(&image);
            info!("storage: config OK, checksum 0x{sum:04X}");
            Ok(sum)
        }
        Err(reason) => {
            warn!("storage: config NOK: {reason}");
            Err(PersistError::Invalid(reason))
        }
    }
}

/// Stamp header and checksum, write the persisted span and commit.
///
/// The in-memory record is never modified.  Returns the checksum written.
pub fn write_config(storage: &mut impl StoragePort, cfg: &DeviceConfig) -> Result<u16, PersistError> {
    let image = layout::encode(cfg);
    let sum = layout::stored_checksum(&image);

    storage
        .write(0, &image)
        .and_then(|()| storage.commit())
        .map_err(|e| {
            error!("storage: save config failed: {e}");
            PersistError::WriteFailed(e)
        })?;

    info!("storage: config written, checksum 0x{sum:04X}");
    Ok(sum)
}
