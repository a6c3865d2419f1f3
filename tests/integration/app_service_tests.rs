//! Integration tests for the boot → WiFi → web UI pipeline.
//!
//! These run on the host (x86_64) and drive [`AppService`] through whole
//! device lifetimes against the recording mocks.

use super::mock_hw::{LogSink, MockClock, MockEeprom, MockRadio, MockWeb, RadioCall};

use tickerview::app::commands::AppCommand;
use tickerview::app::events::AppEvent;
use tickerview::app::service::AppService;
use tickerview::config::{DEFAULT_AP_PASSWD, DEFAULT_WIFI_SSID};
use tickerview::network::{ModeStatus, RadioMode};

const MAC: [u8; 6] = [0x24, 0x0A, 0xC4, 0x01, 0x02, 0x03];

fn boot(eeprom: &mut MockEeprom) -> (AppService, LogSink) {
    let mut app = AppService::new(&MAC);
    let mut sink = LogSink::new();
    app.boot(eeprom, &mut sink);
    (app, sink)
}

/// Persist a station-mode configuration through the web form.
fn provision_station(app: &mut AppService, eeprom: &mut MockEeprom, sink: &mut LogSink, fallback: &str) {
    let out = app.apply_form(
        &[
            ("ap_only", "off"),
            ("wifi_ssid", "HomeWiFi"),
            ("sta_wifi_passwd", "mysecret8"),
            ("ap_fallback", fallback),
        ],
        eeprom,
        sink,
    );
    assert_eq!(out.rejected, 0);
    assert!(matches!(out.saved, Some(Ok(_))));
}

// ── First boot ────────────────────────────────────────────────

#[test]
fn first_boot_comes_up_as_access_point() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    assert!(matches!(sink.events[0], AppEvent::DefaultsApplied(_)));

    let (mut radio, mut clock, mut web) = (MockRadio::new(), MockClock::new(), MockWeb::default());
    let status = app.init_wifi(false, &mut radio, &mut clock, &mut web, &mut sink);

    assert_eq!(status, ModeStatus::ApEstablished);
    assert_eq!(app.network().ap_ssid(), "SS010203");
    assert_eq!(radio.last_ap_password(), Some(DEFAULT_AP_PASSWD));
    assert!(radio.calls.contains(&RadioCall::Hostname("SS010203".into())));
    assert_eq!(app.network().ap_ip().to_string(), "10.100.10.1");

    app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink);
    assert!(web.running);
}

#[test]
fn stored_settings_survive_a_reboot() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    provision_station(&mut app, &mut eeprom, &mut sink, "10");
    eeprom.power_cycle();

    let (mut app, mut sink) = boot(&mut eeprom);
    assert!(matches!(sink.events[0], AppEvent::ConfigLoaded { .. }));
    assert_eq!(app.config().wifi_ssid.as_str(), "HomeWiFi");
    assert!(!app.config().ap_only);

    let (mut radio, mut clock, mut web) = (MockRadio::connecting_on(1), MockClock::new(), MockWeb::default());
    let status = app.init_wifi(false, &mut radio, &mut clock, &mut web, &mut sink);
    assert_eq!(status, ModeStatus::StaEstablished);
    assert_eq!(app.network().station_ip().map(|ip| ip.to_string()).as_deref(), Some("192.168.1.77"));
    assert!(radio.calls.contains(&RadioCall::Begin {
        ssid: "HomeWiFi".into(),
        channel: 0
    }));
}

#[test]
fn uncommitted_save_is_lost_on_power_cycle() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    eeprom.fail_commit = true;
    let out = app.apply_form(&[("digits1", "5"), ("digits2", "5")], &mut eeprom, &mut sink);
    assert!(matches!(out.saved, Some(Err(_))));
    assert_eq!(app.config().digits1, 5);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ConfigSaveFailed(_))), 1);

    eeprom.power_cycle();
    let (app, sink) = boot(&mut eeprom);
    assert!(matches!(sink.events[0], AppEvent::DefaultsApplied(_)));
    assert_eq!(app.config().digits1, 2);
}

// ── Restore mode ──────────────────────────────────────────────

#[test]
fn restore_mode_overrides_station_settings() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    provision_station(&mut app, &mut eeprom, &mut sink, "10");
    app.apply_form(
        &[("web_auth", "on"), ("web_user", "owner"), ("web_passwd", "hunter22")],
        &mut eeprom,
        &mut sink,
    );

    let (mut radio, mut clock, mut web) = (MockRadio::connecting_on(1), MockClock::new(), MockWeb::default());
    app.init_wifi(true, &mut radio, &mut clock, &mut web, &mut sink);

    assert_eq!(app.network().mode(), RadioMode::AccessPoint);
    assert_eq!(app.network().status(), ModeStatus::ApEstablished);
    assert_eq!(radio.begins(), 0);
    assert!(web.auth.is_none());
    assert!(sink.events.contains(&AppEvent::WifiInit {
        mode: RadioMode::AccessPoint,
        restore_mode: true
    }));
}

#[test]
fn web_auth_applies_outside_restore_mode() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    app.apply_form(
        &[("web_auth", "on"), ("web_user", "owner"), ("web_passwd", "hunter22")],
        &mut eeprom,
        &mut sink,
    );
    let (mut radio, mut clock, mut web) = (MockRadio::new(), MockClock::new(), MockWeb::default());
    app.init_wifi(false, &mut radio, &mut clock, &mut web, &mut sink);
    assert_eq!(web.auth, Some(("owner".into(), "hunter22".into())));
}

// ── Supervision ───────────────────────────────────────────────

#[test]
fn station_that_never_connects_falls_back_to_ap() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    provision_station(&mut app, &mut eeprom, &mut sink, "3");

    let (mut radio, mut clock, mut web) = (MockRadio::new(), MockClock::new(), MockWeb::default());
    assert_eq!(
        app.init_wifi(false, &mut radio, &mut clock, &mut web, &mut sink),
        ModeStatus::Failed
    );
    assert_eq!(clock.delays.get(), 5);

    let mut ticks = 0;
    while app.network().mode() == RadioMode::Station {
        clock.advance(5_000);
        app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink);
        ticks += 1;
        assert!(ticks < 10, "fallback never happened");
    }
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ApFallback { attempts: 3 })), 1);

    app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink);
    assert_eq!(app.network().status(), ModeStatus::ApEstablished);
    assert!(web.running);
}

#[test]
fn zero_fallback_keeps_retrying_station() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    provision_station(&mut app, &mut eeprom, &mut sink, "0");

    let (mut radio, mut clock, mut web) = (MockRadio::connecting_on(4), MockClock::new(), MockWeb::default());
    app.init_wifi(false, &mut radio, &mut clock, &mut web, &mut sink);
    for _ in 0..6 {
        clock.advance(5_000);
        app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink);
    }
    assert_eq!(app.network().mode(), RadioMode::Station);
    assert_eq!(app.network().status(), ModeStatus::StaEstablished);
    assert_eq!(web.starts, 1);
}

#[test]
fn non_blocking_checks_respect_the_interval() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    provision_station(&mut app, &mut eeprom, &mut sink, "0");
    app.apply_form(&[("wifi_check_sec", "30"), ("ap_channel", "6")], &mut eeprom, &mut sink);

    let (mut radio, mut clock, mut web) = (MockRadio::new(), MockClock::new(), MockWeb::default());
    app.init_wifi(false, &mut radio, &mut clock, &mut web, &mut sink);
    let begins = radio.begins();

    // first non-blocking attempt is due right away
    app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink);
    assert_eq!(radio.begins(), begins + 1);

    clock.advance(29_000);
    app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink);
    assert_eq!(radio.begins(), begins + 1);

    clock.advance(1_000);
    app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink);
    assert_eq!(radio.begins(), begins + 2);
    assert!(web.idle_resets >= 2);
}

#[test]
fn lost_link_is_reestablished_and_web_keeps_running() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    provision_station(&mut app, &mut eeprom, &mut sink, "0");

    let (mut radio, mut clock, mut web) = (MockRadio::connecting_on(1), MockClock::new(), MockWeb::default());
    app.init_wifi(false, &mut radio, &mut clock, &mut web, &mut sink);
    app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink);
    assert!(web.running);

    radio.drop_link();
    clock.advance(5_000);
    assert_eq!(
        app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink),
        ModeStatus::Pending
    );
    assert_eq!(radio.begins(), 2);
    assert_eq!(
        app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink),
        ModeStatus::StaEstablished
    );
    assert!(sink.events.contains(&AppEvent::WifiStatusChanged {
        from: ModeStatus::StaEstablished,
        to: ModeStatus::Pending
    }));
    assert!(web.running);
    assert_eq!(web.starts, 1);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn restore_defaults_command_persists_defaults() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    provision_station(&mut app, &mut eeprom, &mut sink, "10");
    let mut radio = MockRadio::new();

    app.handle_command(AppCommand::RestoreDefaults, &mut radio, &mut eeprom, &mut sink)
        .unwrap();
    eeprom.power_cycle();
    let (app, _) = boot(&mut eeprom);
    assert_eq!(app.config().wifi_ssid.as_str(), DEFAULT_WIFI_SSID);
    assert!(app.config().ap_only);
}

#[test]
fn disable_wifi_command_turns_radio_off() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    let (mut radio, mut clock, mut web) = (MockRadio::new(), MockClock::new(), MockWeb::default());
    app.init_wifi(false, &mut radio, &mut clock, &mut web, &mut sink);

    app.handle_command(AppCommand::DisableWifi, &mut radio, &mut eeprom, &mut sink)
        .unwrap();
    assert_eq!(radio.mode, RadioMode::Off);
    assert_eq!(
        app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink),
        ModeStatus::Disabled
    );
}

#[test]
fn console_lines_drive_commands_to_reboot() {
    use std::io::Cursor;
    use std::time::{Duration, Instant};
    use tickerview::adapters::console::Console;

    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    let mut radio = MockRadio::new();
    let console = Console::from_reader(Cursor::new("mode sta\nreboot\n")).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !app.reboot_requested() && Instant::now() < deadline {
        while let Some(cmd) = console.try_next() {
            app.handle_command(cmd, &mut radio, &mut eeprom, &mut sink).unwrap();
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(app.reboot_requested());
    assert_eq!(app.network().mode(), RadioMode::Station);
    assert!(sink.events.contains(&AppEvent::RebootRequested));
}

#[test]
fn restored_defaults_are_reapplied_to_the_clock() {
    let mut eeprom = MockEeprom::new();
    let (mut app, mut sink) = boot(&mut eeprom);
    let mut radio = MockRadio::new();
    app.apply_form(&[("gmt_offset", "3600")], &mut eeprom, &mut sink);
    assert_eq!(app.take_ntp_change().map(|n| n.gmt_offset_sec), Some(3600));

    app.handle_command(AppCommand::RestoreDefaults, &mut radio, &mut eeprom, &mut sink)
        .unwrap();
    let ntp = app.take_ntp_change().unwrap();
    assert_eq!(ntp.gmt_offset_sec, 0);
    assert_eq!(ntp.posix_tz(), "CET-1CEST,M3.5.0/2,M10.5.0/3");
}
