//! WiFi radio adapter.
//!
//! Implements [`RadioPort`]: the hexagonal boundary between the
//! [`NetworkModeController`](crate::network::NetworkModeController) and
//! the WiFi driver.  The adapter holds no policy: retries, fallback and
//! timing all live in the controller.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: a simulated radio with a list of reachable
//!   networks, for the host binary and tests.

use std::net::Ipv4Addr;

use log::{error, info, warn};

use crate::app::ports::{IpSettings, RadioPort, SoftApParams};
use crate::network::RadioMode;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn valid_ssid(ssid: &str) -> bool {
    !ssid.is_empty() && ssid.len() <= 32 && is_printable_ascii(ssid)
}

/// Empty (open network) or 8..=64 bytes for WPA2.
fn valid_password(password: &str) -> bool {
    password.is_empty() || (8..=64).contains(&password.len())
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF radio
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::EspRadio as WifiRadio;

#[cfg(target_os = "espidf")]
mod esp {
    use super::*;

    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::ipv4::{
        ClientConfiguration as IpClientConfiguration, ClientSettings as IpClientSettings,
        Configuration as IpConfiguration, Mask, RouterConfiguration, Subnet,
    };
    use esp_idf_svc::netif::{EspNetif, NetifConfiguration};
    use esp_idf_svc::sys::EspError;
    use esp_idf_svc::wifi::{AccessPointConfiguration, AuthMethod, ClientConfiguration, Configuration, EspWifi};

    /// [`RadioPort`] over the ESP-IDF WiFi driver.
    pub struct EspRadio {
        wifi: EspWifi<'static>,
        mode: RadioMode,
    }

    impl EspRadio {
        pub fn new(modem: Modem, sysloop: EspSystemEventLoop) -> Result<Self, EspError> {
            let wifi = EspWifi::new(modem, sysloop, None)?;
            Ok(Self {
                wifi,
                mode: RadioMode::Off,
            })
        }

        fn stop(&mut self) {
            if self.wifi.is_started().unwrap_or(false) {
                if let Err(e) = self.wifi.stop() {
                    warn!("WiFi: stop failed: {e}");
                }
            }
        }
    }

    fn mask(addr: Ipv4Addr) -> Mask {
        Mask::try_from(addr).unwrap_or(Mask(24))
    }

    impl RadioPort for EspRadio {
        fn mode(&self) -> RadioMode {
            self.mode
        }

        fn set_mode(&mut self, mode: RadioMode) -> bool {
            if mode != self.mode {
                self.stop();
            }
            self.mode = mode;
            true
        }

        fn is_connected(&self) -> bool {
            self.mode == RadioMode::Station
                && self.wifi.is_connected().unwrap_or(false)
                && self.wifi.is_up().unwrap_or(false)
        }

        fn is_ap_active(&self) -> bool {
            self.mode == RadioMode::AccessPoint && self.wifi.is_started().unwrap_or(false)
        }

        fn configure_station_ip(&mut self, settings: Option<&IpSettings>) -> bool {
            let ip_configuration = match settings {
                Some(s) => IpClientConfiguration::Fixed(IpClientSettings {
                    ip: s.ip,
                    subnet: Subnet {
                        gateway: s.gateway,
                        mask: mask(s.mask),
                    },
                    dns: Some(s.dns1),
                    secondary_dns: Some(s.dns2),
                }),
                None => IpClientConfiguration::DHCP(Default::default()),
            };
            let conf = NetifConfiguration {
                ip_configuration: Some(IpConfiguration::Client(ip_configuration)),
                ..NetifConfiguration::wifi_default_client()
            };
            match EspNetif::new_with_conf(&conf).and_then(|netif| self.wifi.swap_netif_sta(netif)) {
                Ok(_) => true,
                Err(e) => {
                    error!("WiFi: station netif configuration failed: {e}");
                    false
                }
            }
        }

        fn begin_station(&mut self, ssid: &str, password: &str, channel: u8) {
            if !valid_ssid(ssid) || !valid_password(password) {
                error!("WiFi: invalid station credentials for '{ssid}'");
                return;
            }
            let (Ok(ssid_buf), Ok(pass_buf)) = (ssid.try_into(), password.try_into()) else {
                error!("WiFi: station credentials too long");
                return;
            };
            let conf = Configuration::Client(ClientConfiguration {
                ssid: ssid_buf,
                password: pass_buf,
                auth_method: if password.is_empty() {
                    AuthMethod::None
                } else {
                    AuthMethod::WPA2Personal
                },
                channel: (channel != 0).then_some(channel),
                ..Default::default()
            });
            let result = self
                .wifi
                .set_configuration(&conf)
                .and_then(|()| self.wifi.start())
                .and_then(|()| self.wifi.connect());
            match result {
                Ok(()) => info!("WiFi: connecting to '{ssid}'"),
                Err(e) => error!("WiFi: connect to '{ssid}' failed: {e}"),
            }
        }

        fn disconnect_station(&mut self) {
            if self.wifi.is_connected().unwrap_or(false) {
                if let Err(e) = self.wifi.disconnect() {
                    warn!("WiFi: disconnect failed: {e}");
                }
            }
        }

        fn local_ip(&self) -> Option<Ipv4Addr> {
            if !self.is_connected() {
                return None;
            }
            self.wifi.sta_netif().get_ip_info().ok().map(|info| info.ip)
        }

        fn configure_soft_ap(&mut self, ip: Ipv4Addr, gateway: Ipv4Addr, subnet_mask: Ipv4Addr) -> bool {
            if gateway != ip {
                warn!("WiFi: AP gateway {gateway} ignored, the AP routes as {ip}");
            }
            let conf = NetifConfiguration {
                ip_configuration: Some(IpConfiguration::Router(RouterConfiguration {
                    subnet: Subnet {
                        gateway: ip,
                        mask: mask(subnet_mask),
                    },
                    dhcp_enabled: true,
                    dns: None,
                    secondary_dns: None,
                })),
                ..NetifConfiguration::wifi_default_router()
            };
            match EspNetif::new_with_conf(&conf).and_then(|netif| self.wifi.swap_netif_ap(netif)) {
                Ok(_) => true,
                Err(e) => {
                    error!("WiFi: AP netif configuration failed: {e}");
                    false
                }
            }
        }

        fn start_soft_ap(&mut self, params: &SoftApParams<'_>) -> bool {
            if !valid_password(params.password) {
                error!("WiFi: AP password must be empty or 8-64 bytes");
                return false;
            }
            let (Ok(ssid), Ok(password)) = (params.ssid.try_into(), params.password.try_into()) else {
                return false;
            };
            let conf = Configuration::AccessPoint(AccessPointConfiguration {
                ssid,
                password,
                auth_method: if params.password.is_empty() {
                    AuthMethod::None
                } else {
                    AuthMethod::WPA2Personal
                },
                channel: params.channel,
                ssid_hidden: params.hidden,
                max_connections: u16::from(params.max_clients),
                ..Default::default()
            });
            match self.wifi.set_configuration(&conf).and_then(|()| self.wifi.start()) {
                Ok(()) => true,
                Err(e) => {
                    error!("WiFi: AP start failed: {e}");
                    false
                }
            }
        }

        fn stop_soft_ap(&mut self) {
            if self.mode == RadioMode::AccessPoint {
                self.stop();
            }
        }

        fn set_hostname(&mut self, name: &str) {
            if let Err(e) = self.wifi.sta_netif_mut().set_hostname(name) {
                warn!("WiFi: set hostname failed: {e}");
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated radio
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub use SimRadio as WifiRadio;

/// Host-side radio.  A station associates on `begin_station` when the
/// credentials match a network added with [`with_network`](Self::with_network).
#[derive(Debug, Default)]
pub struct SimRadio {
    mode: RadioMode,
    networks: Vec<(String, String)>,
    associated: bool,
    ap_active: bool,
    static_ip: Option<IpSettings>,
    ap_ip: Option<Ipv4Addr>,
    hostname: String,
}

impl SimRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a network reachable.
    pub fn with_network(mut self, ssid: &str, password: &str) -> Self {
        self.networks.push((ssid.to_owned(), password.to_owned()));
        self
    }

    /// Drop the station link as if the access point went away.
    pub fn drop_link(&mut self) {
        if self.associated {
            warn!("WiFi(sim): link lost");
        }
        self.associated = false;
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn ap_ip(&self) -> Option<Ipv4Addr> {
        self.ap_ip
    }
}

impl RadioPort for SimRadio {
    fn mode(&self) -> RadioMode {
        self.mode
    }

    fn set_mode(&mut self, mode: RadioMode) -> bool {
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
        self.static_ip = settings.copied();
        true
    }

    fn begin_station(&mut self, ssid: &str, password: &str, _channel: u8) {
        if !valid_ssid(ssid) || !valid_password(password) {
            error!("WiFi(sim): invalid station credentials for '{ssid}'");
            return;
        }
        self.associated = self.mode == RadioMode::Station
            && self.networks.iter().any(|(s, p)| s == ssid && p == password);
        info!("WiFi(sim): begin '{ssid}', associated={}", self.associated);
    }

    fn disconnect_station(&mut self) {
        self.associated = false;
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        if !self.is_connected() {
            return None;
        }
        Some(self.static_ip.map_or(Ipv4Addr::new(192, 168, 1, 100), |s| s.ip))
    }

    fn configure_soft_ap(&mut self, ip: Ipv4Addr, _gateway: Ipv4Addr, _mask: Ipv4Addr) -> bool {
        self.ap_ip = Some(ip);
        true
    }

    fn start_soft_ap(&mut self, params: &SoftApParams<'_>) -> bool {
        if self.mode != RadioMode::AccessPoint || !valid_password(params.password) {
            return false;
        }
        info!("WiFi(sim): AP '{}' up", params.ssid);
        self.ap_active = true;
        true
    }

    fn stop_soft_ap(&mut self) {
        self.ap_active = false;
    }

    fn set_hostname(&mut self, name: &str) {
        name.clone_into(&mut self.hostname);
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
