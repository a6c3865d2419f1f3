//! Integration tests for the network mode controller against the
//! recording radio.

use std::net::Ipv4Addr;

use super::mock_hw::{MockClock, MockRadio, RadioCall};

use tickerview::app::ports::ClockPort;

use tickerview::network::{
    AccessPointConfig, ModeStatus, NetworkModeController, RadioMode, StaticAddressing, StationConfig,
};

const MAC: [u8; 6] = [0x00, 0x11, 0x22, 0xAB, 0xCD, 0xEF];

fn station(static_ip: Option<StaticAddressing>) -> StationConfig {
    StationConfig {
        ssid: "HomeWiFi".into(),
        password: "mysecret8".into(),
        channel: 6,
        static_ip,
    }
}

#[test]
fn static_addressing_is_applied_before_every_association() {
    let mut radio = MockRadio::new();
    let mut clock = MockClock::new();
    let mut net = NetworkModeController::new(&MAC);
    let addressing = StaticAddressing {
        ip: "192.168.0.50".into(),
        gateway: "192.168.0.1".into(),
        mask: "255.255.255.0".into(),
        dns1: "1.1.1.1".into(),
        dns2: "bogus".into(),
    };
    assert_eq!(net.configure_station(&mut radio, station(Some(addressing))), ModeStatus::InitDone);

    net.set_mode(RadioMode::Station);
    net.ensure_mode(&mut radio, &mut clock, 1000, 0);
    clock.advance(1000);
    net.ensure_mode(&mut radio, &mut clock, 1000, 0);

    let applied: Vec<_> = radio
        .calls
        .iter()
        .filter_map(|c| match c {
            RadioCall::StationIp(Some(s)) => Some(*s),
            _ => None,
        })
        .collect();
    // once at configure time, once per bring-up
    assert_eq!(applied.len(), 3);
    assert!(applied.iter().all(|s| s.ip == Ipv4Addr::new(192, 168, 0, 50)));
    assert_eq!(applied[0].dns1, Ipv4Addr::new(1, 1, 1, 1));
    assert_eq!(applied[0].dns2, Ipv4Addr::UNSPECIFIED);
}

#[test]
fn bad_static_address_fails_configuration() {
    let mut radio = MockRadio::new();
    let mut net = NetworkModeController::new(&MAC);
    let addressing = StaticAddressing {
        ip: "999.1.1.1".into(),
        ..StaticAddressing::default()
    };
    assert_eq!(net.configure_station(&mut radio, station(Some(addressing))), ModeStatus::Failed);
}

#[test]
fn station_uses_configured_channel_and_sets_hostname() {
    let mut radio = MockRadio::connecting_on(1);
    let mut clock = MockClock::new();
    let mut net = NetworkModeController::new(&MAC);
    net.configure_station(&mut radio, station(None));
    net.set_mode(RadioMode::Station);

    assert_eq!(net.ensure_mode(&mut radio, &mut clock, 1000, 5), ModeStatus::StaEstablished);
    assert!(radio.calls.contains(&RadioCall::Begin {
        ssid: "HomeWiFi".into(),
        channel: 6
    }));
    assert!(radio.calls.contains(&RadioCall::Hostname("SSABCDEF".into())));
    assert_eq!(net.attempts(), 0);
}

#[test]
fn access_point_override_and_address_plan() {
    let mut radio = MockRadio::new();
    let mut clock = MockClock::new();
    let mut net = NetworkModeController::new(&MAC);
    net.configure_access_point(AccessPointConfig {
        ssid: Some("Ticker-Setup".into()),
        password: "setup-pass".into(),
        ip: "172.16.0.1".into(),
        ..AccessPointConfig::default()
    });
    net.set_mode(RadioMode::AccessPoint);

    assert_eq!(net.ensure_mode(&mut radio, &mut clock, 1000, 0), ModeStatus::ApEstablished);
    assert!(radio.calls.contains(&RadioCall::SoftApAddress(Ipv4Addr::new(172, 16, 0, 1))));
    assert!(radio.calls.contains(&RadioCall::StartAp {
        ssid: "Ticker-Setup".into(),
        password: "setup-pass".into()
    }));
}

#[test]
fn cancelled_bring_up_stays_pending_and_resumes() {
    let mut radio = MockRadio::new();
    let mut clock = MockClock::new();
    let mut net = NetworkModeController::new(&MAC);
    net.configure_station(&mut radio, station(None));
    net.set_mode(RadioMode::Station);

    let deadline = clock.clone();
    let status = net.ensure_mode_cancellable(&mut radio, &mut clock, 1000, 10, || deadline.now_ms() >= 3000);
    assert_eq!(status, ModeStatus::Pending);
    assert_eq!(clock.delays.get(), 3);

    radio.connect_on_begin = Some(1);
    assert_eq!(net.ensure_mode(&mut radio, &mut clock, 1000, 0), ModeStatus::Pending);
    assert_eq!(net.ensure_mode(&mut radio, &mut clock, 1000, 0), ModeStatus::StaEstablished);
}

#[test]
fn switching_off_while_pending_disables_immediately() {
    let mut radio = MockRadio::new();
    let mut clock = MockClock::new();
    let mut net = NetworkModeController::new(&MAC);
    net.configure_station(&mut radio, station(None));
    net.set_mode(RadioMode::Station);
    assert_eq!(net.ensure_mode(&mut radio, &mut clock, 1000, 0), ModeStatus::Pending);

    net.set_mode(RadioMode::Off);
    assert_eq!(net.ensure_mode(&mut radio, &mut clock, 1000, 0), ModeStatus::Disabled);
    assert_eq!(radio.mode, RadioMode::Off);
    assert_eq!(net.attempts(), 0);
}
