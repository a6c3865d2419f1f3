//! Mock adapters for integration tests.
//!
//! Records every radio call so tests can assert on the full driver
//! history without touching the real WiFi stack.

use std::cell::Cell;
use std::net::Ipv4Addr;
use std::rc::Rc;

use tickerview::app::events::AppEvent;
use tickerview::app::ports::{
    ClockPort, EventSink, IpSettings, RadioPort, SoftApParams, StorageError, StoragePort, WebPort,
};
use tickerview::config::layout::PERSISTED_LEN;
use tickerview::network::RadioMode;

// ── Radio call record ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RadioCall {
    SetMode(RadioMode),
    StationIp(Option<IpSettings>),
    Begin { ssid: String, channel: u8 },
    Disconnect,
    SoftApAddress(Ipv4Addr),
    StartAp { ssid: String, password: String },
    StopAp,
    Hostname(String),
}

// ── MockRadio ─────────────────────────────────────────────────

/// Station associates on the `connect_on_begin`-th `begin_station`
/// (never, if `None`).  The access point starts unless `ap_fails`.
#[derive(Default)]
pub struct MockRadio {
    pub calls: Vec<RadioCall>,
    pub mode: RadioMode,
    pub connect_on_begin: Option<u32>,
    pub ap_fails: bool,
    begins: u32,
    associated: bool,
    ap_active: bool,
}

#[allow(dead_code)]
impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connecting_on(begin: u32) -> Self {
        Self {
            connect_on_begin: Some(begin),
            ..Self::default()
        }
    }

    pub fn begins(&self) -> u32 {
        self.begins
    }

    pub fn drop_link(&mut self) {
        self.associated = false;
    }

    pub fn last_ap_password(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|c| match c {
            RadioCall::StartAp { password, .. } => Some(password.as_str()),
            _ => None,
        })
    }
}

impl RadioPort for MockRadio {
    fn mode(&self) -> RadioMode {
        self.mode
    }

    fn set_mode(&mut self, mode: RadioMode) -> bool {
        self.calls.push(RadioCall::SetMode(mode));
        if mode != self.mode {
            self.associated = false;
            self.ap_active = false;
        }
        self.mode = mode;
        true
    }

    fn is_connected(&self) -> bool {
        self.mode == RadioMode::Station && self.associated
    }

    fn is_ap_active(&self) -> bool {
        self.mode == RadioMode::AccessPoint && self.ap_active
    }

    fn configure_station_ip(&mut self, settings: Option<&IpSettings>) -> bool {
        self.calls.push(RadioCall::StationIp(settings.copied()));
        true
    }

    fn begin_station(&mut self, ssid: &str, _password: &str, channel: u8) {
        self.begins += 1;
        self.calls.push(RadioCall::Begin {
            ssid: ssid.to_owned(),
            channel,
        });
        if self.connect_on_begin.is_some_and(|n| self.begins >= n) {
            self.associated = true;
        }
    }

    fn disconnect_station(&mut self) {
        self.calls.push(RadioCall::Disconnect);
        self.associated = false;
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.is_connected().then_some(Ipv4Addr::new(192, 168, 1, 77))
    }

    fn configure_soft_ap(&mut self, ip: Ipv4Addr, _gateway: Ipv4Addr, _mask: Ipv4Addr) -> bool {
        self.calls.push(RadioCall::SoftApAddress(ip));
        true
    }

    fn start_soft_ap(&mut self, params: &SoftApParams<'_>) -> bool {
        self.calls.push(RadioCall::StartAp {
            ssid: params.ssid.to_owned(),
            password: params.password.to_owned(),
        });
        self.ap_active = !self.ap_fails;
        self.ap_active
    }

    fn stop_soft_ap(&mut self) {
        self.calls.push(RadioCall::StopAp);
        self.ap_active = false;
    }

    fn set_hostname(&mut self, name: &str) {
        self.calls.push(RadioCall::Hostname(name.to_owned()));
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Virtual time; delays advance it instantly.  Clones share the time.
#[derive(Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<u64>>,
    pub delays: Rc<Cell<u32>>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.set(self.delays.get() + 1);
        self.advance(u64::from(ms));
    }
}

// ── MockEeprom ────────────────────────────────────────────────

/// Shadow + committed image.  Reads see the shadow, like an emulated EEPROM.
pub struct MockEeprom {
    pub shadow: Vec<u8>,
    pub committed: Vec<u8>,
    pub fail_commit: bool,
    pub commits: u32,
}

#[allow(dead_code)]
impl MockEeprom {
    pub fn new() -> Self {
        Self {
            shadow: vec![0; PERSISTED_LEN],
            committed: vec![0; PERSISTED_LEN],
            fail_commit: false,
            commits: 0,
        }
    }

    pub fn power_cycle(&mut self) {
        self.shadow.clone_from(&self.committed);
    }
}

impl Default for MockEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MockEeprom {
    fn capacity(&self) -> usize {
        self.shadow.len()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let src = self
            .shadow
            .get(offset..offset + buf.len())
            .ok_or(StorageError::OutOfBounds { offset, len: buf.len() })?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        let len = data.len();
        self.shadow
            .get_mut(offset..offset + len)
            .ok_or(StorageError::OutOfBounds { offset, len })?
            .copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        if self.fail_commit {
            return Err(StorageError::CommitFailed);
        }
        self.commits += 1;
        self.committed.clone_from(&self.shadow);
        Ok(())
    }
}

// ── MockWeb ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockWeb {
    pub running: bool,
    pub starts: u32,
    pub stops: u32,
    pub idle_resets: u32,
    pub auth: Option<(String, String)>,
}

impl WebPort for MockWeb {
    fn start(&mut self) {
        self.starts += 1;
        self.running = true;
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn reset_idle_time(&mut self) {
        self.idle_resets += 1;
    }

    fn idle_time_ms(&self) -> u64 {
        0
    }

    fn set_authentication(&mut self, credentials: Option<(&str, &str)>) {
        self.auth = credentials.map(|(u, p)| (u.to_owned(), p.to_owned()));
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
