//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService / NetworkModeController (domain)
//! ```
//!
//! Driven adapters (radio, storage medium, clock, web transport, event
//! sinks) implement these traits.  The domain consumes them via generics,
//! so nothing in `config`, `storage` or `network` touches hardware
//! directly.
//!
//! ## Ground truth
//!
//! - **RadioPort** answers are authoritative: the controller never caches
//!   the radio mode or link state between calls.
//! - **StoragePort** writes land in a shadow buffer until `commit`.

use core::fmt;
use std::net::Ipv4Addr;

use crate::network::RadioMode;

// ───────────────────────────────────────────────────────────────
// Storage medium (driven adapter: domain ↔ EEPROM emulation / flash)
// ───────────────────────────────────────────────────────────────

/// Byte-addressable non-volatile medium with an explicit commit.
///
/// Mirrors an emulated EEPROM: reads and writes address a RAM shadow of
/// `capacity()` bytes, `commit` flushes the shadow to flash.  An
/// interrupted commit may leave a partial image; the checksum catches
/// that on the next boot.
pub trait StoragePort {
    /// Reserved size in bytes.
    fn capacity(&self) -> usize;

    /// Fill `buf` from `offset`.
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` at `offset` into the shadow.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;

    /// Flush the shadow to the medium.
    fn commit(&mut self) -> Result<(), StorageError>;
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Access past the reserved capacity.
    OutOfBounds { offset: usize, len: usize },
    /// The medium could not be opened or read.
    ReadFailed,
    /// Flash commit failed.
    CommitFailed,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { offset, len } => write!(f, "access out of bounds ({len} bytes at {offset})"),
            Self::ReadFailed => write!(f, "read failed"),
            Self::CommitFailed => write!(f, "commit failed"),
        }
    }
}

impl core::error::Error for StorageError {}

// ───────────────────────────────────────────────────────────────
// Radio (driven adapter: domain ↔ WiFi driver)
// ───────────────────────────────────────────────────────────────

/// Static addressing handed to the station interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpSettings {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub dns1: Ipv4Addr,
    pub dns2: Ipv4Addr,
}

/// Everything the driver needs to start broadcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftApParams<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
    pub channel: u8,
    pub hidden: bool,
    pub max_clients: u8,
}

/// The WiFi driver as seen by the
/// [`NetworkModeController`](crate::network::NetworkModeController).
///
/// Methods returning `bool` report whether the driver accepted the
/// request; link state is always queried, never inferred.
pub trait RadioPort {
    /// Current operating mode of the driver.
    fn mode(&self) -> RadioMode;

    /// Switch the driver mode.  `Off` stops the radio entirely.
    fn set_mode(&mut self, mode: RadioMode) -> bool;

    /// Station associated and holding an address.
    fn is_connected(&self) -> bool;

    /// Access point is up and broadcasting.
    fn is_ap_active(&self) -> bool;

    /// Apply static addressing, or `None` for DHCP.
    fn configure_station_ip(&mut self, settings: Option<&IpSettings>) -> bool;

    /// Begin association.  Returns immediately; poll [`is_connected`](Self::is_connected).
    fn begin_station(&mut self, ssid: &str, password: &str, channel: u8);

    /// Drop the association and forget the link.
    fn disconnect_station(&mut self);

    /// Station address, if associated.
    fn local_ip(&self) -> Option<Ipv4Addr>;

    /// Address plan of the access point interface.
    fn configure_soft_ap(&mut self, ip: Ipv4Addr, gateway: Ipv4Addr, mask: Ipv4Addr) -> bool;

    /// Start broadcasting.
    fn start_soft_ap(&mut self, params: &SoftApParams<'_>) -> bool;

    /// Stop broadcasting and drop clients.
    fn stop_soft_ap(&mut self);

    fn set_hostname(&mut self, name: &str);
}

// ───────────────────────────────────────────────────────────────
// Clock (driven adapter: domain → system timer)
// ───────────────────────────────────────────────────────────────

/// Monotonic time plus a yielding delay.
pub trait ClockPort {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Block for `ms`, yielding to platform housekeeping.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Web transport (driven adapter: domain → HTTP server lifecycle)
// ───────────────────────────────────────────────────────────────

/// Lifecycle of the settings web server.  Request handling lives in the
/// adapter; it calls back into [`AppService`](super::service::AppService)
/// for form snapshots and submissions.
pub trait WebPort {
    /// Start serving.  Idempotent.
    fn start(&mut self);

    /// Stop serving.  Idempotent.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Mark activity now (keeps the idle timer from expiring).
    fn reset_idle_time(&mut self);

    /// Milliseconds since the last activity.
    fn idle_time_ms(&self) -> u64;

    /// Basic auth credentials, or `None` to serve without authentication.
    fn set_authentication(&mut self, credentials: Option<(&str, &str)>);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
