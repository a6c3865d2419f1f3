//! TickerView Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiRadio     NvsEeprom     SystemClock   WebUi   LogEventSink│
//! │  (RadioPort)   (StoragePort) (ClockPort)   (Web)   (EventSink) │
//! │  RestoreButton (embedded-hal InputPin)  Console  ClockSync     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  DeviceConfig · ConfigRegistry · NetworkModeController │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use tickerview::adapters::console::Console;
use tickerview::adapters::device_id;
use tickerview::adapters::hardware::RestoreButton;
use tickerview::adapters::log_sink::LogEventSink;
use tickerview::adapters::nvs::NvsEeprom;
use tickerview::adapters::sntp::ClockSync;
use tickerview::adapters::time::SystemClock;
use tickerview::adapters::web::WebUi;
use tickerview::adapters::wifi::WifiRadio;
use tickerview::app::ports::{ClockPort, RadioPort};
use tickerview::app::service::AppService;
use tickerview::config::layout::PERSISTED_LEN;
use tickerview::config::{FIRMWARE_VERSION, NTP_UPDATE_INTERVAL_MIN};

/// Control loop period.
const LOOP_PERIOD_MS: u32 = 100;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  TickerView v{}                    ║", FIRMWARE_VERSION);
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    #[cfg(target_os = "espidf")]
    let (mut radio, mut restore) = {
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::hal::gpio::{AnyInputPin, PinDriver};
        use tickerview::pins::RESTORE_PIN_GPIO;
        use esp_idf_svc::hal::prelude::Peripherals;

        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let radio = WifiRadio::new(peripherals.modem, sysloop)?;
        // SAFETY: the restore pin is not claimed by any other driver.
        let restore_pin = unsafe { AnyInputPin::new(RESTORE_PIN_GPIO) };
        let restore = RestoreButton::new(PinDriver::input(restore_pin)?);
        (radio, restore)
    };

    #[cfg(not(target_os = "espidf"))]
    let (mut radio, mut restore) = {
        use tickerview::adapters::hardware::SimPin;
        use tickerview::config::{DEFAULT_WIFI_PASSWD, DEFAULT_WIFI_SSID};

        let radio = WifiRadio::new().with_network(DEFAULT_WIFI_SSID, DEFAULT_WIFI_PASSWD);
        let high = std::env::var_os("TICKERVIEW_RESTORE").is_some();
        (radio, RestoreButton::new(SimPin { high }))
    };

    let mut clock = SystemClock::new();
    let mut web = WebUi::new(SystemClock::new());
    let mut sink = LogEventSink::new();

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let mut eeprom = NvsEeprom::new(PERSISTED_LEN)?;

    let mac = device_id::read_mac();
    let mut app = AppService::new(&mac);
    app.boot(&mut eeprom, &mut sink);

    // ── 4. Bring up WiFi ──────────────────────────────────────
    let restore_mode = restore.restore_requested();
    app.init_wifi(restore_mode, &mut radio, &mut clock, &mut web, &mut sink);

    let console = Console::spawn()?;
    let mut clock_sync = ClockSync::new();
    clock_sync.apply(&app.ntp_settings());

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    let ntp_interval_ms = u64::from(NTP_UPDATE_INTERVAL_MIN) * 60 * 1000;
    let mut last_ntp_sync_ms: Option<u64> = None;

    loop {
        while let Some(cmd) = console.try_next() {
            if let Err(e) = app.handle_command(cmd, &mut radio, &mut eeprom, &mut sink) {
                warn!("Command {cmd:?} failed: {e}");
            }
        }

        app.handle_wifi(&mut radio, &mut clock, &mut web, &mut sink);

        if let Some(ntp) = app.take_ntp_change() {
            clock_sync.apply(&ntp);
        }

        let now = clock.now_ms();
        let ntp_due = last_ntp_sync_ms.is_none_or(|last| now.saturating_sub(last) > ntp_interval_ms);
        if ntp_due && app.request_clock_sync_link(radio.is_connected()) {
            clock_sync.ensure(&app.ntp_settings());
            last_ntp_sync_ms = Some(now);
        }

        if app.reboot_requested() {
            info!("Rebooting");
            clock.delay_ms(LOOP_PERIOD_MS);
            #[cfg(target_os = "espidf")]
            esp_idf_svc::hal::reset::restart();
            #[cfg(not(target_os = "espidf"))]
            return Ok(());
        }

        clock.delay_ms(LOOP_PERIOD_MS);
    }
}
