//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] as an emulated EEPROM: a RAM shadow of
//! `capacity` bytes that reads and writes address directly, flushed to a
//! single NVS blob on `commit`.
//!
//! - On ESP32 the shadow is filled from the `tickerview/eeprom` blob when
//!   the adapter is created; a missing blob reads as all zeros, which the
//!   config loader rejects as a header mismatch.
//! - The simulation backend keeps a second in-memory "committed" image so
//!   tests can model a power cycle with [`NvsEeprom::power_cycle`].
//! - NVS commits are atomic per `nvs_commit()`; an interrupted commit on a
//!   real device leaves the previous blob in place.

use log::{debug, info};

use crate::app::ports::{StorageError, StoragePort};

#[cfg(target_os = "espidf")]
use log::{error, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const EEPROM_NAMESPACE: &[u8] = b"tickerview\0";
const EEPROM_KEY: &[u8] = b"eeprom\0";

/// Emulated EEPROM over one NVS blob.
pub struct NvsEeprom {
    shadow: Vec<u8>,
    #[cfg(not(target_os = "espidf"))]
    committed: Vec<u8>,
    #[cfg(not(target_os = "espidf"))]
    fail_commit: bool,
}

impl NvsEeprom {
    /// Initialise NVS flash and load the stored blob into the shadow.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    #[cfg(target_os = "espidf")]
    pub fn new(capacity: usize) -> Result<Self, StorageError> {
        // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
        // single main-task context before any concurrent NVS access.
        let ret = unsafe { nvs_flash_init() };
        if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
            warn!("NVS: erasing and re-initialising flash partition");
            if unsafe { nvs_flash_erase() } != ESP_OK || unsafe { nvs_flash_init() } != ESP_OK {
                return Err(StorageError::ReadFailed);
            }
        } else if ret != ESP_OK {
            return Err(StorageError::ReadFailed);
        }

        let mut shadow = vec![0u8; capacity];
        let loaded = with_nvs_handle(false, |handle| {
            let mut size = shadow.len();
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    EEPROM_KEY.as_ptr().cast(),
                    shadow.as_mut_ptr().cast(),
                    &mut size,
                )
            };
            if ret == ESP_OK { Ok(size) } else { Err(ret) }
        });
        match loaded {
            Ok(size) => info!("NvsEeprom: loaded {size} of {capacity} bytes"),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => info!("NvsEeprom: no stored image"),
            Err(e) => {
                // a size mismatch (ESP_ERR_NVS_INVALID_LENGTH) lands here too
                warn!("NvsEeprom: read error {e}, starting blank");
                shadow.fill(0);
            }
        }
        Ok(Self { shadow })
    }

    /// Blank simulated EEPROM.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(capacity: usize) -> Result<Self, StorageError> {
        info!("NvsEeprom: simulation backend, {capacity} bytes");
        Ok(Self {
            shadow: vec![0; capacity],
            committed: vec![0; capacity],
            fail_commit: false,
        })
    }

    /// Drop uncommitted writes, as a reset would.
    #[cfg(not(target_os = "espidf"))]
    pub fn power_cycle(&mut self) {
        self.shadow.clone_from(&self.committed);
    }

    /// Make the next commits fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_fail_commit(&mut self, fail: bool) {
        self.fail_commit = fail;
    }

    /// Direct access to the committed image.
    #[cfg(not(target_os = "espidf"))]
    pub fn committed_mut(&mut self) -> &mut [u8] {
        &mut self.committed
    }

    fn range(&self, offset: usize, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= self.shadow.len())
            .ok_or(StorageError::OutOfBounds { offset, len })?;
        Ok(offset..end)
    }
}

impl StoragePort for NvsEeprom {
    fn capacity(&self) -> usize {
        self.shadow.len()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.shadow[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        let range = self.range(offset, data.len())?;
        self.shadow[range].copy_from_slice(data);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn commit(&mut self) -> Result<(), StorageError> {
        let shadow = &self.shadow;
        let result = with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    EEPROM_KEY.as_ptr().cast(),
                    shadow.as_ptr().cast(),
                    shadow.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret == ESP_OK { Ok(()) } else { Err(ret) }
        });
        result.map_err(|e| {
            error!("NvsEeprom: commit failed ({e})");
            StorageError::CommitFailed
        })?;
        debug!("NvsEeprom: committed {} bytes", self.shadow.len());
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn commit(&mut self) -> Result<(), StorageError> {
        if self.fail_commit {
            return Err(StorageError::CommitFailed);
        }
        self.committed.clone_from(&self.shadow);
        debug!("NvsEeprom(sim): committed {} bytes", self.shadow.len());
        Ok(())
    }
}

/// Open the EEPROM namespace, execute a closure with the handle, then close.
#[cfg(target_os = "espidf")]
fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
where
    F: FnOnce(nvs_handle_t) -> Result<T, i32>,
{
    let mut handle: nvs_handle_t = 0;
    let mode = if write {
        nvs_open_mode_t_NVS_READWRITE
    } else {
        nvs_open_mode_t_NVS_READONLY
    };

    let ret = unsafe { nvs_open(EEPROM_NAMESPACE.as_ptr().cast(), mode, &mut handle) };
    if ret != ESP_OK {
        return Err(ret);
    }

    let result = f(handle);
    unsafe {
        nvs_close(handle);
    }
    result
}
