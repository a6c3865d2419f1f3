//! Station and access point settings as entered by the user, and their
//! resolution into addresses the driver accepts.

use std::net::Ipv4Addr;

use log::warn;

use super::{DEFAULT_AP_IP, DEFAULT_AP_MAX_CLIENTS};
use crate::app::ports::IpSettings;

const DEFAULT_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Static addressing in dotted text form, exactly as stored in the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticAddressing {
    pub ip: String,
    pub gateway: String,
    pub mask: String,
    pub dns1: String,
    pub dns2: String,
}

impl StaticAddressing {
    /// Parse into driver settings.  The address itself is mandatory;
    /// gateway falls back to the address, mask to /24, DNS to 0.0.0.0.
    pub(crate) fn resolve(&self) -> Option<IpSettings> {
        let Ok(ip) = self.ip.parse::<Ipv4Addr>() else {
            return None;
        };
        let gateway = parse_or("gateway", &self.gateway, ip);
        let mask = parse_or("subnet mask", &self.mask, DEFAULT_MASK);
        let dns1 = parse_or("DNS1", &self.dns1, Ipv4Addr::UNSPECIFIED);
        let dns2 = parse_or("DNS2", &self.dns2, Ipv4Addr::UNSPECIFIED);
        Some(IpSettings {
            ip,
            gateway,
            mask,
            dns1,
            dns2,
        })
    }
}

/// Station (client) settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationConfig {
    pub ssid: String,
    pub password: String,
    /// 0 lets the driver scan every channel.
    pub channel: u8,
    /// `None` means DHCP.
    pub static_ip: Option<StaticAddressing>,
}

/// Access point settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointConfig {
    /// Overrides the MAC-derived SSID.
    pub ssid: Option<String>,
    pub password: String,
    pub channel: u8,
    pub ip: String,
    pub gateway: String,
    pub mask: String,
    pub hidden: bool,
    pub max_clients: u8,
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        Self {
            ssid: None,
            password: String::new(),
            channel: 1,
            ip: DEFAULT_AP_IP.to_owned(),
            gateway: String::new(),
            mask: String::new(),
            hidden: false,
            max_clients: DEFAULT_AP_MAX_CLIENTS,
        }
    }
}

/// Resolved access point address plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ApAddressing {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub mask: Ipv4Addr,
}

impl AccessPointConfig {
    pub(crate) fn resolve(&self) -> ApAddressing {
        let fallback = DEFAULT_AP_IP.parse().unwrap_or(Ipv4Addr::new(10, 100, 10, 1));
        let ip = parse_or("AP address", &self.ip, fallback);
        ApAddressing {
            ip,
            gateway: parse_or("AP gateway", &self.gateway, ip),
            mask: parse_or("AP subnet mask", &self.mask, DEFAULT_MASK),
        }
    }
}

fn parse_or(what: &str, text: &str, fallback: Ipv4Addr) -> Ipv4Addr {
    text.parse().unwrap_or_else(|_| {
        warn!("wifi: invalid or no {what} '{text}', using {fallback}");
        fallback
    })
}
