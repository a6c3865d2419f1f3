//! Wall-clock synchronisation adapter.
//!
//! Installs the configured time zone and runs an SNTP client against the
//! configured server.  Settings are re-applied whenever they change; an
//! unchanged configuration leaves the running client alone.
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::sntp::EspSntp` plus the
//!   newlib `TZ` variable.
//! - **`not(target_os = "espidf")`**: records what would run, for the host
//!   binary and tests.

use log::{info, warn};

use crate::app::events::NtpSettings;

/// SNTP client lifecycle driven by [`NtpSettings`].
pub struct ClockSync {
    applied: Option<NtpSettings>,
    starts: u32,
    #[cfg(target_os = "espidf")]
    sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
    #[cfg(not(target_os = "espidf"))]
    running: bool,
}

impl Default for ClockSync {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSync {
    pub fn new() -> Self {
        Self {
            applied: None,
            starts: 0,
            #[cfg(target_os = "espidf")]
            sntp: None,
            #[cfg(not(target_os = "espidf"))]
            running: false,
        }
    }

    /// Install `ntp` unconditionally, restarting the client.
    pub fn apply(&mut self, ntp: &NtpSettings) {
        let tz = ntp.posix_tz();
        self.stop();
        set_time_zone(&tz);
        if !ntp.enabled {
            info!("NTP: disabled (tz {tz})");
        } else if ntp.server.is_empty() {
            warn!("NTP: no server configured");
        } else if self.start(&ntp.server) {
            self.starts += 1;
            info!("NTP: syncing via {} (tz {tz})", ntp.server);
        }
        self.applied = Some(ntp.clone());
    }

    /// Install `ntp` only if it differs from what is running.
    pub fn ensure(&mut self, ntp: &NtpSettings) {
        if self.applied.as_ref() != Some(ntp) {
            self.apply(ntp);
        }
    }

    /// Settings last installed.
    pub fn applied(&self) -> Option<&NtpSettings> {
        self.applied.as_ref()
    }

    /// Client starts so far.
    pub fn starts(&self) -> u32 {
        self.starts
    }

    #[cfg(target_os = "espidf")]
    pub fn is_running(&self) -> bool {
        self.sntp.is_some()
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(target_os = "espidf")]
    fn start(&mut self, server: &str) -> bool {
        use esp_idf_svc::sntp::{EspSntp, SntpConf};

        let mut conf = SntpConf::default();
        conf.servers[0] = server;
        match EspSntp::new(&conf) {
            Ok(sntp) => {
                self.sntp = Some(sntp);
                true
            }
            Err(e) => {
                warn!("NTP: start failed: {e}");
                false
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn start(&mut self, _server: &str) -> bool {
        self.running = true;
        true
    }

    // Only one SNTP client may exist at a time.
    #[cfg(target_os = "espidf")]
    fn stop(&mut self) {
        self.sntp = None;
    }

    #[cfg(not(target_os = "espidf"))]
    fn stop(&mut self) {
        self.running = false;
    }
}

#[cfg(target_os = "espidf")]
fn set_time_zone(tz: &str) {
    // SAFETY: called from the control loop only; no other task reads or
    // writes the environment.
    unsafe {
        std::env::set_var("TZ", tz);
        esp_idf_svc::sys::tzset();
    }
}

#[cfg(not(target_os = "espidf"))]
fn set_time_zone(_tz: &str) {}
