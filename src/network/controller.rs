use std::net::Ipv4Addr;

use log::{debug, error, info, warn};

use super::settings::ApAddressing;
use super::{ap_ssid, AccessPointConfig, ApSsid, AP_SSID_MAX, MacAddress, ModeStatus, RadioMode, StationConfig};
use crate::app::ports::{ClockPort, IpSettings, RadioPort, SoftApParams};

/// Resolved station settings.
#[derive(Debug, Clone)]
struct Station {
    ssid: String,
    password: String,
    channel: u8,
    addressing: Option<IpSettings>,
}

/// Resolved access point settings.
#[derive(Debug, Clone)]
struct AccessPoint {
    password: String,
    channel: u8,
    addressing: ApAddressing,
    hidden: bool,
    max_clients: u8,
}

/// Radio-mode state machine with retry and fallback bookkeeping.
///
/// The controller only remembers what it was asked for (desired mode,
/// settings) and what it has done (status, attempts, last attempt time).
/// Whether the link is actually up is always asked from the [`RadioPort`].
pub struct NetworkModeController {
    desired: RadioMode,
    status: ModeStatus,
    attempts: u16,
    /// `None` until the first attempt after a mode change, which makes
    /// that attempt due immediately.
    last_attempt_ms: Option<u64>,
    ap_ssid: ApSsid,
    station: Option<Station>,
    access_point: AccessPoint,
    station_ip: Option<Ipv4Addr>,
}

impl NetworkModeController {
    /// Controller for a device with the given MAC.  The generated AP SSID
    /// (`SS` + last three MAC bytes) doubles as the network hostname.
    pub fn new(mac: &MacAddress) -> Self {
        let ssid = ap_ssid(mac);
        info!("wifi: MAC {:02X}{:02X}{:02X}, AP SSID {}", mac[3], mac[4], mac[5], ssid);
        let defaults = AccessPointConfig::default();
        Self {
            desired: RadioMode::Off,
            status: ModeStatus::Disabled,
            attempts: 0,
            last_attempt_ms: None,
            ap_ssid: ssid,
            station: None,
            access_point: AccessPoint {
                password: defaults.password.clone(),
                channel: defaults.channel,
                addressing: defaults.resolve(),
                hidden: defaults.hidden,
                max_clients: defaults.max_clients,
            },
            station_ip: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn status(&self) -> ModeStatus {
        self.status
    }

    /// Desired mode (not necessarily what the radio is doing right now).
    pub fn mode(&self) -> RadioMode {
        self.desired
    }

    pub fn attempts(&self) -> u16 {
        self.attempts
    }

    pub fn ap_ssid(&self) -> &str {
        self.ap_ssid.as_str()
    }

    pub fn ap_ip(&self) -> Ipv4Addr {
        self.access_point.addressing.ip
    }

    /// Address captured when the station link was last established.
    pub fn station_ip(&self) -> Option<Ipv4Addr> {
        self.station_ip
    }

    // ── Configuration ─────────────────────────────────────────

    /// Store station settings and push the addressing mode to the driver.
    ///
    /// With static addressing an unparsable address yields `Failed`; the
    /// other addresses fall back to usable values.
    pub fn configure_station<R: RadioPort>(&mut self, radio: &mut R, config: StationConfig) -> ModeStatus {
        info!("wifi: configure station, SSID '{}'", config.ssid);
        self.status = ModeStatus::Failed;

        let addressing = match &config.static_ip {
            Some(addr) => {
                let Some(settings) = addr.resolve() else {
                    error!("wifi: invalid static IP '{}'", addr.ip);
                    return self.status;
                };
                if !radio.configure_station_ip(Some(&settings)) {
                    error!("wifi: driver rejected static IP configuration");
                    return self.status;
                }
                info!("wifi: static IP {} gw {} mask {}", settings.ip, settings.gateway, settings.mask);
                Some(settings)
            }
            None => {
                radio.configure_station_ip(None);
                None
            }
        };

        self.station = Some(Station {
            ssid: config.ssid,
            password: config.password,
            channel: config.channel,
            addressing,
        });
        self.last_attempt_ms = None;
        self.status = ModeStatus::InitDone;
        self.status
    }

    /// Store access point settings.  Nothing reaches the driver until the
    /// next access point bring-up.
    pub fn configure_access_point(&mut self, config: AccessPointConfig) -> ModeStatus {
        if let Some(ssid) = config.ssid.as_deref() {
            self.ap_ssid.clear();
            if self.ap_ssid.push_str(ssid).is_err() {
                warn!("wifi: AP SSID '{ssid}' too long, truncating");
                let cut = floor_char_boundary(ssid, AP_SSID_MAX);
                let _ = self.ap_ssid.push_str(&ssid[..cut]);
            }
        }
        info!("wifi: configure AP, SSID '{}'", self.ap_ssid);

        self.access_point = AccessPoint {
            addressing: config.resolve(),
            password: config.password,
            channel: config.channel,
            hidden: config.hidden,
            max_clients: config.max_clients,
        };
        self.last_attempt_ms = None;
        self.status = ModeStatus::InitDone;
        self.status
    }

    // ── Mode control ──────────────────────────────────────────

    /// Record the desired mode.  Nothing happens until the next
    /// [`ensure_mode`](Self::ensure_mode).
    pub fn set_mode(&mut self, mode: RadioMode) {
        debug!("wifi: set mode {mode}");
        self.desired = mode;
        self.last_attempt_ms = None;
        self.attempts = 0;
    }

    /// Turn the radio off right now, bypassing `ensure_mode`.
    pub fn disable_wifi<R: RadioPort>(&mut self, radio: &mut R) {
        radio.set_mode(RadioMode::Off);
        self.desired = RadioMode::Off;
        self.status = ModeStatus::Disabled;
        self.last_attempt_ms = None;
        self.attempts = 0;
        info!("wifi: disabled");
    }

    /// Advance the machine by one step.
    ///
    /// `retries == 0` is the non-blocking form: an attempt is started at
    /// most once per `interval_ms` and the call never waits.  Otherwise a
    /// station bring-up polls the link up to `retries` times, `interval_ms`
    /// apart, and ends in `StaEstablished` or `Failed`.
    pub fn ensure_mode<R: RadioPort, C: ClockPort>(
        &mut self,
        radio: &mut R,
        clock: &mut C,
        interval_ms: u32,
        retries: u16,
    ) -> ModeStatus {
        self.ensure_mode_cancellable(radio, clock, interval_ms, retries, || false)
    }

    /// [`ensure_mode`](Self::ensure_mode) with a cancel predicate checked
    /// between polls of a blocking station bring-up.  A cancelled bring-up
    /// stays `Pending`; the attempt still counts.
    pub fn ensure_mode_cancellable<R, C, F>(
        &mut self,
        radio: &mut R,
        clock: &mut C,
        interval_ms: u32,
        retries: u16,
        mut should_cancel: F,
    ) -> ModeStatus
    where
        R: RadioPort,
        C: ClockPort,
        F: FnMut() -> bool,
    {
        let current = radio.mode();

        if current != self.desired {
            match current {
                RadioMode::Station if radio.is_connected() => radio.disconnect_station(),
                RadioMode::AccessPoint if radio.is_ap_active() => radio.stop_soft_ap(),
                _ => {}
            }
        }

        if self.desired == RadioMode::Off {
            if current != RadioMode::Off {
                radio.set_mode(RadioMode::Off);
            }
            if self.status != ModeStatus::Disabled {
                debug!("wifi: disabled");
            }
            self.status = ModeStatus::Disabled;
            return self.status;
        }

        if current == self.desired && self.link_up(radio) {
            if !self.status.is_established() {
                self.mark_established(radio);
            }
            self.attempts = 0;
            return self.status;
        }

        if retries == 0 {
            let now = clock.now_ms();
            if let Some(last) = self.last_attempt_ms {
                if now.saturating_sub(last) < u64::from(interval_ms) {
                    return self.status;
                }
            }
            self.last_attempt_ms = Some(now);
        }

        self.status = ModeStatus::Pending;
        self.attempts = self.attempts.saturating_add(1);
        debug!("wifi: {} attempt {}", self.desired, self.attempts);

        match self.desired {
            RadioMode::Station => self.bring_up_station(radio, clock, interval_ms, retries, &mut should_cancel),
            RadioMode::AccessPoint => self.bring_up_access_point(radio),
            RadioMode::Off => {}
        }
        self.status
    }

    // ── Internals ─────────────────────────────────────────────

    fn link_up<R: RadioPort>(&self, radio: &R) -> bool {
        match self.desired {
            RadioMode::Station => radio.is_connected(),
            RadioMode::AccessPoint => radio.is_ap_active(),
            RadioMode::Off => true,
        }
    }

    fn mark_established<R: RadioPort>(&mut self, radio: &mut R) {
        radio.set_hostname(self.ap_ssid.as_str());
        match self.desired {
            RadioMode::Station => {
                self.station_ip = radio.local_ip();
                self.status = ModeStatus::StaEstablished;
                info!(
                    "wifi: station established, IP {}",
                    self.station_ip.unwrap_or(Ipv4Addr::UNSPECIFIED)
                );
            }
            RadioMode::AccessPoint => {
                self.status = ModeStatus::ApEstablished;
                info!("wifi: AP established, IP {}", self.access_point.addressing.ip);
            }
            RadioMode::Off => {}
        }
        self.attempts = 0;
    }

    fn bring_up_station<R, C, F>(&mut self, radio: &mut R, clock: &mut C, interval_ms: u32, retries: u16, should_cancel: &mut F)
    where
        R: RadioPort,
        C: ClockPort,
        F: FnMut() -> bool,
    {
        let Some(station) = self.station.as_ref() else {
            error!("wifi: station mode requested but not configured");
            self.status = ModeStatus::Failed;
            return;
        };

        radio.disconnect_station();
        radio.set_mode(RadioMode::Station);
        // A mode switch drops the interface configuration on some drivers.
        radio.configure_station_ip(station.addressing.as_ref());
        radio.begin_station(&station.ssid, &station.password, station.channel);

        for poll in 1..=retries {
            if radio.is_connected() {
                self.mark_established(radio);
                return;
            }
            clock.delay_ms(interval_ms);
            if poll < retries && should_cancel() {
                info!("wifi: station bring-up cancelled after {poll} polls");
                return;
            }
        }

        if retries > 0 {
            warn!("wifi: station not connected after {retries} polls");
            self.status = ModeStatus::Failed;
        }
    }

    fn bring_up_access_point<R: RadioPort>(&mut self, radio: &mut R) {
        let ap = &self.access_point;
        radio.stop_soft_ap();
        radio.set_mode(RadioMode::AccessPoint);
        if !radio.configure_soft_ap(ap.addressing.ip, ap.addressing.gateway, ap.addressing.mask) {
            warn!("wifi: driver rejected AP address plan");
        }

        let params = SoftApParams {
            ssid: self.ap_ssid.as_str(),
            password: &ap.password,
            channel: ap.channel,
            hidden: ap.hidden,
            max_clients: ap.max_clients,
        };
        if radio.start_soft_ap(&params) {
            debug!(
                "wifi: AP '{}' channel {} hidden {} max clients {}",
                params.ssid, params.channel, params.hidden, params.max_clients
            );
            self.mark_established(radio);
        } else {
            error!("wifi: could not start AP '{}'", self.ap_ssid);
            self.status = ModeStatus::Failed;
        }
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}
