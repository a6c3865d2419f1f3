//! Device configuration record.
//!
//! [`DeviceConfig`] is the single source of truth for every tunable the
//! ticker exposes: display assets, WiFi credentials, web UI settings and
//! NTP parameters.  It is allocated once at boot, populated either from
//! flash (see [`crate::storage`]) or from the compiled field defaults, and
//! mutated through the [`ConfigRegistry`] for the rest of the run.
//!
//! ```text
//! ┌──────────────┬────────────┬──────────────────────────┬──────────┬──────────────┐
//! │ "PET\0" (4)  │ checksum(2)│ persisted fields          │ sentinel │ RuntimeState │
//! └──────────────┴────────────┴──────────────────────────┴──────────┴──────────────┘
//!   └──────────────── persisted span (layout.rs) ───────┘             never stored
//! ```
//!
//! The sentinel is a type boundary here: everything in [`RuntimeState`]
//! lives in `DeviceConfig::runtime` and the byte codec never reads it.

pub mod field;
pub mod layout;
pub mod registry;
pub mod schema;

pub use field::{FieldDescriptor, FieldHook, FieldKind, FieldSlot, FieldValue, Persistence, TextBuffer};
pub use registry::{ConfigRegistry, SetOutcome, ValidationError};
pub use schema::DEVICE_FIELDS;

/// Firmware version reported in the web UI info text.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minutes between NTP synchronisations once the clock is enabled.
pub const NTP_UPDATE_INTERVAL_MIN: u32 = 720;

// ---------------------------------------------------------------------------
// Build-time secrets
// ---------------------------------------------------------------------------

const fn env_or(value: Option<&'static str>, fallback: &'static str) -> &'static str {
    match value {
        Some(v) => v,
        None => fallback,
    }
}

/// Default station SSID (`TICKERVIEW_WIFI_SSID`).
pub const DEFAULT_WIFI_SSID: &str = env_or(option_env!("TICKERVIEW_WIFI_SSID"), "TickerView");
/// Default station password (`TICKERVIEW_WIFI_PASSWD`).
pub const DEFAULT_WIFI_PASSWD: &str = env_or(option_env!("TICKERVIEW_WIFI_PASSWD"), "changeme-sta");
/// Access point password, also forced in restore mode (`TICKERVIEW_AP_PASSWD`).
pub const DEFAULT_AP_PASSWD: &str = env_or(option_env!("TICKERVIEW_AP_PASSWD"), "tickerview");
/// Default web UI user (`TICKERVIEW_WEB_USER`).
pub const DEFAULT_WEB_USER: &str = env_or(option_env!("TICKERVIEW_WEB_USER"), "admin");
/// Default web UI password (`TICKERVIEW_WEB_PASSWD`).
pub const DEFAULT_WEB_PASSWD: &str = env_or(option_env!("TICKERVIEW_WEB_PASSWD"), "admin");

// ---------------------------------------------------------------------------
// Text buffer types (capacity = storage size - 1)
// ---------------------------------------------------------------------------

/// Exchange symbol, e.g. `BTCUSDT` (17 bytes stored).
pub type SymbolText = heapless::String<16>;
/// Short asset label shown on screen, e.g. `BTC` (7 bytes stored).
pub type AssetText = heapless::String<6>;
/// WiFi SSID (33 bytes stored).
pub type SsidText = heapless::String<32>;
/// WPA passphrase or web password (64 bytes stored).
pub type SecretText = heapless::String<63>;
/// Dotted IPv4 address (16 bytes stored).
pub type AddressText = heapless::String<15>;
/// Web UI user name (17 bytes stored).
pub type UserText = heapless::String<16>;
/// NTP server host name (128 bytes stored).
pub type HostText = heapless::String<127>;
/// POSIX TZ string (50 bytes stored).
pub type TzText = heapless::String<49>;

// ---------------------------------------------------------------------------
// The record
// ---------------------------------------------------------------------------

/// The configuration record.
///
/// `Default` yields the zero-initialised record (empty strings, zero
/// numbers, `false` flags), which is what the device holds before either
/// flash or the field defaults have been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    // --- Display ---
    pub symbol1: SymbolText,
    pub symbol2: SymbolText,
    pub symbol3: SymbolText,
    pub symbol4: SymbolText,
    pub asset1: AssetText,
    pub asset2: AssetText,
    pub asset3: AssetText,
    pub asset4: AssetText,
    /// Decimal places per asset.
    pub digits1: u16,
    pub digits2: u16,
    pub digits3: u16,
    pub digits4: u16,

    /// Rolling window for the change percentage (hours).
    pub history_window: u16,
    /// Price fetch interval (minutes).
    pub price_update: u16,
    /// Seconds each asset stays on screen.
    pub display_time: u16,
    pub x_offset: u16,
    pub show_percent: bool,
    pub show_hw: bool,
    pub show_hp: bool,
    pub show_time: bool,

    // --- WiFi ---
    pub wifi_ssid: SsidText,
    pub sta_wifi_passwd: SecretText,
    pub staticip_enabled: bool,
    pub ip_address: AddressText,
    pub subnetmask: AddressText,
    pub gateway_address: AddressText,
    pub dns1_address: AddressText,
    pub dns2_address: AddressText,
    pub ap_only: bool,
    pub ap_wifi_passwd: SecretText,
    pub ap_channel: u16,
    /// Station attempts before falling back to AP mode (0 = never).
    pub ap_fallback: u16,
    /// Non-blocking WiFi check interval (seconds).
    pub wifi_check_sec: u16,

    // --- Web UI ---
    pub web_auth: bool,
    pub web_user: UserText,
    pub web_passwd: SecretText,
    /// Idle minutes before the web UI may be shut down.
    pub web_idle_timeout: u16,

    // --- NTP / clock ---
    pub ntp_enabled: bool,
    pub ntp_server: HostText,
    pub tz_string: TzText,
    pub gmt_offset: i32,
    pub daylight_offset: u16,

    /// Volatile state after the sentinel.
    pub runtime: RuntimeState,
}

/// Fields that live after the sentinel and are never written to flash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeState {
    /// Current switch state.
    pub sw_state: bool,
    /// Device information shown in the web UI.
    pub info_text: heapless::String<255>,
    pub date_time: heapless::String<19>,
}

impl DeviceConfig {
    /// Copy every persisted field from `other`, leaving `runtime` untouched.
    pub fn copy_persisted_from(&mut self, other: &DeviceConfig) {
        let runtime = core::mem::take(&mut self.runtime);
        *self = other.clone();
        self.runtime = runtime;
    }

    /// Whether the persisted parts of two records are identical.
    pub fn persisted_eq(&self, other: &DeviceConfig) -> bool {
        layout::encode(self) == layout::encode(other)
    }
}
