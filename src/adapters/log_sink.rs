//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Secrets never reach this sink; events carry field names and bounds only.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ConfigLoaded { checksum } => {
                info!("CONFIG | loaded, checksum=0x{:04X}", checksum);
            }
            AppEvent::DefaultsApplied(reason) => {
                warn!("CONFIG | defaults applied ({})", reason);
            }
            AppEvent::ConfigSaved { checksum } => {
                info!("CONFIG | saved, checksum=0x{:04X}", checksum);
            }
            AppEvent::ConfigSaveFailed(e) => {
                warn!("CONFIG | save failed ({})", e);
            }
            AppEvent::FieldRejected(e) => {
                warn!("FIELD | rejected: {}", e);
            }
            AppEvent::WifiStatusChanged { from, to } => {
                info!("WIFI | {} -> {}", from, to);
            }
            AppEvent::WifiInit { mode, restore_mode } => {
                info!("WIFI | init mode={} restore={}", mode, restore_mode);
            }
            AppEvent::WebStarted => info!("WEB | started"),
            AppEvent::WebStopped => info!("WEB | stopped"),
            AppEvent::ApFallback { attempts } => {
                warn!("WIFI | AP fallback after {} attempts", attempts);
            }
            AppEvent::NtpConfigChanged(ntp) => {
                info!(
                    "NTP | server={} tz={} gmt_offset={}s dst={}s enabled={}",
                    ntp.server,
                    ntp.tz.as_deref().unwrap_or("-"),
                    ntp.gmt_offset_sec,
                    ntp.daylight_offset_sec,
                    ntp.enabled,
                );
            }
            AppEvent::RebootRequested => info!("SYSTEM | reboot requested"),
        }
    }
}
