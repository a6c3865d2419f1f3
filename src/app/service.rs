//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the configuration record, its registry and the
//! network mode controller.  It exposes a clean, hardware-agnostic API.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!   StoragePort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                   │          AppService           │
//!     RadioPort ◀──▶│ DeviceConfig · Registry · Net │◀── AppCommand
//!       WebPort ◀───└──────────────────────────────┘
//! ```

use core::fmt::Write as _;

use log::{debug, info, warn};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::{ConfigRegistry, DeviceConfig, FieldHook, DEFAULT_AP_PASSWD, DEVICE_FIELDS, FIRMWARE_VERSION};
use crate::error::Result;
use crate::network::{
    AccessPointConfig, MacAddress, ModeStatus, NetworkModeController, RadioMode, StaticAddressing, StationConfig,
};
use crate::storage::{self, PersistError};

use super::commands::AppCommand;
use super::events::{AppEvent, NtpSettings};
use super::ports::{ClockPort, EventSink, RadioPort, StoragePort, WebPort};

/// Delay between link polls during the boot-time bring-up.
pub const INIT_POLL_INTERVAL_MS: u32 = 1000;
/// Link polls during the boot-time bring-up.
pub const INIT_RETRIES: u16 = 5;

/// What a form submission did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormOutcome {
    /// Fields accepted (updated or unchanged).
    pub accepted: usize,
    /// Fields rejected; their prior values are kept.
    pub rejected: usize,
    /// Result of the save, if one was due.
    pub saved: Option<core::result::Result<u16, PersistError>>,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application context: one record, one registry, one radio.
pub struct AppService {
    config: DeviceConfig,
    registry: ConfigRegistry<DeviceConfig>,
    network: NetworkModeController,
    restore_mode: bool,
    reboot_requested: bool,
    /// NTP fields changed since the clock was last configured.
    ntp_changed: bool,
    /// Last status seen by the loop, for transition events.
    last_status: ModeStatus,
}

impl AppService {
    /// Construct the service with a zeroed record.
    ///
    /// Does **not** load anything: call [`boot`](Self::boot) next.
    pub fn new(mac: &MacAddress) -> Self {
        Self {
            config: DeviceConfig::default(),
            registry: ConfigRegistry::new(&DEVICE_FIELDS),
            network: NetworkModeController::new(mac),
            restore_mode: false,
            reboot_requested: false,
            ntp_changed: false,
            last_status: ModeStatus::Disabled,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load the stored record, falling back to the compiled defaults.
    pub fn boot(&mut self, storage: &mut impl StoragePort, sink: &mut impl EventSink) {
        match storage::read_config(storage, &mut self.config) {
            Ok(checksum) => sink.emit(&AppEvent::ConfigLoaded { checksum }),
            Err(e) => {
                warn!("AppService: {e}, applying defaults");
                let failures = self.registry.set_defaults(&mut self.config);
                if failures > 0 {
                    warn!("AppService: {failures} field defaults rejected");
                }
                sink.emit(&AppEvent::DefaultsApplied(e));
            }
        }
        self.refresh_info_text();
        self.registry.debug_dump(&self.config);
    }

    /// Configure station and access point from the record, pick the mode
    /// and run the blocking bring-up.
    ///
    /// Restore mode forces access point operation with the compiled AP
    /// password and no web authentication, so a device with a broken
    /// configuration can always be reached.
    pub fn init_wifi(
        &mut self,
        restore_mode: bool,
        radio: &mut impl RadioPort,
        clock: &mut impl ClockPort,
        web: &mut impl WebPort,
        sink: &mut impl EventSink,
    ) -> ModeStatus {
        info!("--- Init WIFI ---");
        self.restore_mode = restore_mode;
        let cfg = &self.config;

        let static_ip = cfg.staticip_enabled.then(|| StaticAddressing {
            ip: cfg.ip_address.as_str().to_owned(),
            gateway: cfg.gateway_address.as_str().to_owned(),
            mask: cfg.subnetmask.as_str().to_owned(),
            dns1: cfg.dns1_address.as_str().to_owned(),
            dns2: cfg.dns2_address.as_str().to_owned(),
        });
        self.network.configure_station(
            radio,
            StationConfig {
                ssid: cfg.wifi_ssid.as_str().to_owned(),
                password: cfg.sta_wifi_passwd.as_str().to_owned(),
                channel: 0,
                static_ip,
            },
        );

        let ap_password = if restore_mode {
            DEFAULT_AP_PASSWD
        } else {
            cfg.ap_wifi_passwd.as_str()
        };
        self.network.configure_access_point(AccessPointConfig {
            password: ap_password.to_owned(),
            channel: u8::try_from(cfg.ap_channel).unwrap_or(1),
            ..AccessPointConfig::default()
        });

        let mode = if cfg.ap_only || restore_mode {
            RadioMode::AccessPoint
        } else {
            RadioMode::Station
        };
        self.network.set_mode(mode);

        if restore_mode {
            warn!("AppService: restore mode, web authentication disabled");
            web.set_authentication(None);
        } else if cfg.web_auth {
            web.set_authentication(Some((cfg.web_user.as_str(), cfg.web_passwd.as_str())));
        } else {
            web.set_authentication(None);
        }
        sink.emit(&AppEvent::WifiInit { mode, restore_mode });

        let status = self.network.ensure_mode(radio, clock, INIT_POLL_INTERVAL_MS, INIT_RETRIES);
        self.track_status(status, sink);
        status
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One loop tick of WiFi supervision: keep the desired mode alive,
    /// start the web UI once a link is up, fall back to AP when the
    /// station keeps failing.
    pub fn handle_wifi(
        &mut self,
        radio: &mut impl RadioPort,
        clock: &mut impl ClockPort,
        web: &mut impl WebPort,
        sink: &mut impl EventSink,
    ) -> ModeStatus {
        let interval_ms = u32::from(self.config.wifi_check_sec) * 1000;
        let status = self.network.ensure_mode(radio, clock, interval_ms, 0);
        self.track_status(status, sink);

        // keep the idle timer from expiring while a bring-up is in flight
        if status == ModeStatus::Pending {
            web.reset_idle_time();
        }

        if status.is_established() {
            if !web.is_running() {
                web.start();
                sink.emit(&AppEvent::WebStarted);
            }
        } else if self.network.mode() == RadioMode::Station
            && self.config.ap_fallback > 0
            && self.network.attempts() >= self.config.ap_fallback
        {
            let attempts = self.network.attempts();
            warn!("AppService: AP fallback after {attempts} station attempts");
            if web.is_running() {
                web.stop();
                sink.emit(&AppEvent::WebStopped);
            }
            self.network.set_mode(RadioMode::AccessPoint);
            sink.emit(&AppEvent::ApFallback { attempts });
        }
        status
    }

    /// Ask for a link the clock can sync over.
    ///
    /// Returns `true` when NTP is enabled and the station is connected, i.e.
    /// the caller may sync now.  With NTP enabled and no link, Station mode
    /// is requested again unless the device is AP-only or a bring-up is
    /// already pending.
    pub fn request_clock_sync_link(&mut self, radio_connected: bool) -> bool {
        if !self.config.ntp_enabled {
            return false;
        }
        if radio_connected {
            return true;
        }
        if !self.config.ap_only && self.network.status() != ModeStatus::Pending {
            debug!("AppService: requesting station link for NTP");
            self.network.set_mode(RadioMode::Station);
        }
        false
    }

    // ── Web form ──────────────────────────────────────────────

    /// Apply a form submission in order, then run the save hook.
    ///
    /// A single-field submission also dispatches that field's change hook.
    /// The record is persisted only when more than one field was submitted.
    pub fn apply_form(
        &mut self,
        params: &[(&str, &str)],
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> FormOutcome {
        let mut outcome = FormOutcome::default();
        for (name, raw) in params {
            match self.registry.set_value(&mut self.config, name, raw) {
                Ok(_) => outcome.accepted += 1,
                Err(e) => {
                    outcome.rejected += 1;
                    sink.emit(&AppEvent::FieldRejected(e));
                }
            }
        }

        if params.len() == 1 {
            let hook = self
                .registry
                .last_touched()
                .and_then(|i| self.registry.descriptor(i))
                .and_then(|d| d.hook());
            if let Some(hook) = hook {
                self.dispatch_hook(hook, sink);
            }
        }

        if params.len() > 1 {
            outcome.saved = Some(self.save(storage, sink));
        }
        outcome
    }

    /// Render every field, in presentation order, as a JSON object of
    /// `name: value` strings.
    pub fn form_snapshot(&mut self) -> Result<String> {
        self.refresh_info_text();
        let snapshot = FormSnapshot {
            registry: &self.registry,
            record: &self.config,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Typed view of the NTP fields.
    pub fn ntp_settings(&self) -> NtpSettings {
        let cfg = &self.config;
        NtpSettings {
            enabled: cfg.ntp_enabled,
            server: cfg.ntp_server.as_str().to_owned(),
            tz: (!cfg.tz_string.is_empty()).then(|| cfg.tz_string.as_str().to_owned()),
            gmt_offset_sec: cfg.gmt_offset,
            daylight_offset_sec: cfg.daylight_offset,
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (web UI, restore button, console).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        radio: &mut impl RadioPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::Reboot => {
                info!("AppService: reboot requested");
                self.reboot_requested = true;
                sink.emit(&AppEvent::RebootRequested);
            }
            AppCommand::DisableWifi => {
                self.network.disable_wifi(radio);
                self.track_status(self.network.status(), sink);
            }
            AppCommand::SetMode(mode) => self.network.set_mode(mode),
            AppCommand::SaveConfig => {
                self.save(storage, sink)?;
            }
            AppCommand::RestoreDefaults => {
                info!("AppService: restoring defaults");
                self.registry.set_defaults(&mut self.config);
                self.ntp_changed = true;
                self.save(storage, sink)?;
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn registry(&self) -> &ConfigRegistry<DeviceConfig> {
        &self.registry
    }

    pub fn network(&self) -> &NetworkModeController {
        &self.network
    }

    /// Whether the device booted with the restore pin asserted.
    pub fn restore_mode(&self) -> bool {
        self.restore_mode
    }

    pub fn reboot_requested(&self) -> bool {
        self.reboot_requested
    }

    /// NTP settings to re-apply, once per change.
    pub fn take_ntp_change(&mut self) -> Option<NtpSettings> {
        core::mem::take(&mut self.ntp_changed).then(|| self.ntp_settings())
    }

    // ── Internal ──────────────────────────────────────────────

    fn save(
        &mut self,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> core::result::Result<u16, PersistError> {
        let result = storage::write_config(storage, &self.config);
        match result {
            Ok(checksum) => sink.emit(&AppEvent::ConfigSaved { checksum }),
            Err(e) => sink.emit(&AppEvent::ConfigSaveFailed(e)),
        }
        result
    }

    fn dispatch_hook(&mut self, hook: FieldHook, sink: &mut impl EventSink) {
        match hook {
            FieldHook::NtpConfig => {
                self.ntp_changed = true;
                sink.emit(&AppEvent::NtpConfigChanged(self.ntp_settings()));
            }
        }
    }

    fn track_status(&mut self, status: ModeStatus, sink: &mut impl EventSink) {
        if status != self.last_status {
            sink.emit(&AppEvent::WifiStatusChanged {
                from: self.last_status,
                to: status,
            });
            self.last_status = status;
        }
    }

    fn refresh_info_text(&mut self) {
        let info = &mut self.config.runtime.info_text;
        info.clear();
        let _ = write!(info, "TickerView V{FIRMWARE_VERSION}");
    }
}

/// Serialises the registry view of a record as `{"name":"value",...}`.
struct FormSnapshot<'a> {
    registry: &'a ConfigRegistry<DeviceConfig>,
    record: &'a DeviceConfig,
}

impl Serialize for FormSnapshot<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let fields = self.registry.fields();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (index, field) in fields.iter().enumerate() {
            map.serialize_entry(field.name(), &self.registry.get_value(self.record, index))?;
        }
        map.end()
    }
}
