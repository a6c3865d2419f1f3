//! Radio-mode management.
//!
//! [`NetworkModeController`] drives the WiFi driver between off, station
//! and access-point operation.  It is polled: the caller records the
//! desired mode with [`set_mode`](NetworkModeController::set_mode) and
//! then calls [`ensure_mode`](NetworkModeController::ensure_mode) every
//! loop tick; each call advances the machine by at most one bring-up
//! attempt.
//!
//! ```text
//!             set_mode(Off)                 link up / AP broadcasting
//!   ┌──────────┐  ◀──────  any  ──▶ Pending ───────────────────────▶ StaEstablished
//!   │ Disabled │                       │                              ApEstablished
//!   └──────────┘                       └── retries exhausted ───────▶ Failed
//! ```

mod controller;
mod settings;

use core::fmt;
use core::fmt::Write as _;

pub use controller::NetworkModeController;
pub use settings::{AccessPointConfig, StaticAddressing, StationConfig};

/// Prefix of the generated access point SSID.
pub const AP_SSID_PREFIX: &str = "SS";
/// Access point address when none (or garbage) is configured.
pub const DEFAULT_AP_IP: &str = "10.100.10.1";
pub const DEFAULT_AP_MAX_CLIENTS: u8 = 4;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Longest SSID 802.11 allows.
pub const AP_SSID_MAX: usize = 32;

/// Generated access point SSID, also used as the network hostname.
pub type ApSsid = heapless::String<AP_SSID_MAX>;

/// WiFi driver operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadioMode {
    #[default]
    Off,
    Station,
    AccessPoint,
}

impl fmt::Display for RadioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Station => write!(f, "station"),
            Self::AccessPoint => write!(f, "access point"),
        }
    }
}

/// Controller status as reported to the orchestration loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeStatus {
    /// Radio off.
    #[default]
    Disabled,
    /// Station or access point settings accepted.
    InitDone,
    ApEstablished,
    StaEstablished,
    /// A bring-up attempt is in flight.  Never times out on its own.
    Pending,
    /// Bring-up failed or settings were unusable.
    Failed,
}

impl ModeStatus {
    pub fn is_established(self) -> bool {
        matches!(self, Self::ApEstablished | Self::StaEstablished)
    }
}

impl fmt::Display for ModeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::InitDone => write!(f, "init done"),
            Self::ApEstablished => write!(f, "AP established"),
            Self::StaEstablished => write!(f, "STA established"),
            Self::Pending => write!(f, "pending"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// `SS` followed by the last three MAC bytes in upper-case hex.
pub fn ap_ssid(mac: &MacAddress) -> ApSsid {
    let mut ssid = ApSsid::new();
    let _ = write!(ssid, "{AP_SSID_PREFIX}{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    ssid
}
