//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, show on the display,
//! count them in a test.

use crate::config::ValidationError;
use crate::network::{ModeStatus, RadioMode};
use crate::storage::PersistError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Stored configuration accepted at boot.
    ConfigLoaded { checksum: u16 },

    /// Stored configuration rejected; compiled defaults are in effect.
    DefaultsApplied(PersistError),

    /// Configuration written and committed.
    ConfigSaved { checksum: u16 },

    /// Save failed.  The in-memory record is unaffected.
    ConfigSaveFailed(PersistError),

    /// A submitted field value was rejected; the prior value is kept.
    FieldRejected(ValidationError),

    /// The network controller changed status.
    WifiStatusChanged { from: ModeStatus, to: ModeStatus },

    /// WiFi initialisation finished selecting a mode.
    WifiInit { mode: RadioMode, restore_mode: bool },

    WebStarted,
    WebStopped,

    /// Station bring-up gave up after `attempts` tries; switched to AP.
    ApFallback { attempts: u16 },

    /// An NTP field was changed on its own; the clock must be reconfigured.
    NtpConfigChanged(NtpSettings),

    /// A reboot was requested; the main loop restarts the chip.
    RebootRequested,
}

/// Typed view of the NTP fields for the clock collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtpSettings {
    pub enabled: bool,
    pub server: String,
    /// POSIX TZ string.  When `None` the offsets apply.
    pub tz: Option<String>,
    pub gmt_offset_sec: i32,
    pub daylight_offset_sec: u16,
}

impl NtpSettings {
    /// TZ string to install: the configured one, else a fixed offset
    /// built from `gmt_offset_sec + daylight_offset_sec`.
    ///
    /// POSIX offsets count westward, so UTC+1 is `UTC-01:00`.
    pub fn posix_tz(&self) -> String {
        if let Some(tz) = &self.tz {
            return tz.clone();
        }
        let east = i64::from(self.gmt_offset_sec) + i64::from(self.daylight_offset_sec);
        if east == 0 {
            return "UTC0".to_owned();
        }
        let sign = if east > 0 { '-' } else { '+' };
        let secs = east.unsigned_abs();
        let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
        if s == 0 {
            format!("UTC{sign}{h:02}:{m:02}")
        } else {
            format!("UTC{sign}{h:02}:{m:02}:{s:02}")
        }
    }
}
