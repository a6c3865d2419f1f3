//! The device field table.
//!
//! Order here is presentation order in the web UI, which is not the
//! declaration order of [`DeviceConfig`] (that one drives the flash
//! layout).  Text limits come from the buffer types: the maximum length
//! is the storage size minus one.

use super::field::{FieldDescriptor, FieldHook, FieldKind, FieldSlot, FieldValue};
use super::{DeviceConfig, DEFAULT_AP_PASSWD, DEFAULT_WEB_PASSWD, DEFAULT_WEB_USER, DEFAULT_WIFI_PASSWD, DEFAULT_WIFI_SSID};

/// Text field over `DeviceConfig::$field`, max length = `$cap`.
macro_rules! text_field {
    ($kind:ident, $field:ident, $cap:literal, $default:expr, $min:expr) => {{
        fn get(c: &DeviceConfig) -> FieldValue<'_> {
            let s: &heapless::String<$cap> = &c.$field;
            FieldValue::Text(s.as_str())
        }
        fn slot(c: &mut DeviceConfig) -> FieldSlot<'_> {
            FieldSlot::Text(&mut c.$field)
        }
        FieldDescriptor::new(FieldKind::$kind, stringify!($field), $default, get, slot)
            .bounds($min, $cap)
            .size($cap + 1)
    }};
}

macro_rules! u16_field {
    ($field:ident, $default:expr, $min:expr, $max:expr) => {{
        fn get(c: &DeviceConfig) -> FieldValue<'_> {
            FieldValue::U16(c.$field)
        }
        fn slot(c: &mut DeviceConfig) -> FieldSlot<'_> {
            FieldSlot::U16(&mut c.$field)
        }
        FieldDescriptor::new(FieldKind::Uint16, stringify!($field), $default, get, slot).bounds($min, $max)
    }};
}

macro_rules! i32_field {
    ($field:ident, $default:expr, $min:expr, $max:expr) => {{
        fn get(c: &DeviceConfig) -> FieldValue<'_> {
            FieldValue::I32(c.$field)
        }
        fn slot(c: &mut DeviceConfig) -> FieldSlot<'_> {
            FieldSlot::I32(&mut c.$field)
        }
        FieldDescriptor::new(FieldKind::Int32, stringify!($field), $default, get, slot).bounds($min, $max)
    }};
}

macro_rules! checkbox_field {
    ($field:ident, $default:expr) => {{
        fn get(c: &DeviceConfig) -> FieldValue<'_> {
            FieldValue::Bool(c.$field)
        }
        fn slot(c: &mut DeviceConfig) -> FieldSlot<'_> {
            FieldSlot::Bool(&mut c.$field)
        }
        FieldDescriptor::new(FieldKind::Checkbox, stringify!($field), $default, get, slot)
    }};
}

/// Every configurable field, in presentation order.
pub static DEVICE_FIELDS: [FieldDescriptor<DeviceConfig>; 45] = [
    // --- Display ---
    text_field!(String, symbol1, 16, "BTCUSDT", 3),
    text_field!(String, symbol2, 16, "ETHUSDT", 3),
    text_field!(String, symbol3, 16, "XAUUSDT", 3),
    text_field!(String, symbol4, 16, "XAGUSDT", 3),
    text_field!(String, asset1, 6, "BTC", 1),
    text_field!(String, asset2, 6, "ETH", 1),
    text_field!(String, asset3, 6, "XAU", 1),
    text_field!(String, asset4, 6, "XAG", 1),
    u16_field!(digits1, "2", 1, 7),
    u16_field!(digits2, "2", 1, 7),
    u16_field!(digits3, "2", 1, 7),
    u16_field!(digits4, "2", 1, 7),
    u16_field!(price_update, "1", 1, 60),
    u16_field!(display_time, "5", 1, 60),
    u16_field!(history_window, "12", 1, 24),
    checkbox_field!(show_percent, "on"),
    checkbox_field!(show_hw, "on"),
    checkbox_field!(show_hp, "on"),
    checkbox_field!(show_time, "on"),
    u16_field!(x_offset, "5", 0, 10),
    // --- WiFi ---
    text_field!(String, wifi_ssid, 32, DEFAULT_WIFI_SSID, 1),
    text_field!(Password, sta_wifi_passwd, 63, DEFAULT_WIFI_PASSWD, 8),
    checkbox_field!(ap_only, "on"),
    text_field!(Password, ap_wifi_passwd, 63, DEFAULT_AP_PASSWD, 8),
    u16_field!(ap_channel, "1", 1, 13),
    u16_field!(ap_fallback, "34560", 0, 65535),
    u16_field!(wifi_check_sec, "5", 5, 65535),
    checkbox_field!(staticip_enabled, "off"),
    text_field!(String, ip_address, 15, "192.168.0.2", 0),
    text_field!(String, subnetmask, 15, "255.255.255.0", 0),
    text_field!(String, gateway_address, 15, "192.168.0.1", 0),
    text_field!(String, dns1_address, 15, "192.168.0.1", 0),
    text_field!(String, dns2_address, 15, "", 0),
    // --- Web UI ---
    checkbox_field!(web_auth, "off"),
    text_field!(String, web_user, 16, DEFAULT_WEB_USER, 3),
    text_field!(Password, web_passwd, 63, DEFAULT_WEB_PASSWD, 0),
    u16_field!(web_idle_timeout, "1", 1, 60),
    // --- NTP / clock ---
    checkbox_field!(ntp_enabled, "off"),
    text_field!(String, ntp_server, 127, "ts1.univie.ac.at", 0).on_change(FieldHook::NtpConfig),
    i32_field!(gmt_offset, "0", -43200, 50400).on_change(FieldHook::NtpConfig),
    u16_field!(daylight_offset, "0", 0, 7200).on_change(FieldHook::NtpConfig),
    text_field!(String, tz_string, 49, "CET-1CEST,M3.5.0/2,M10.5.0/3", 0).on_change(FieldHook::NtpConfig),
    // --- Runtime only ---
    {
        fn get(c: &DeviceConfig) -> FieldValue<'_> {
            FieldValue::Text(c.runtime.info_text.as_str())
        }
        fn slot(c: &mut DeviceConfig) -> FieldSlot<'_> {
            FieldSlot::Text(&mut c.runtime.info_text)
        }
        FieldDescriptor::new(FieldKind::String, "info_text", "", get, slot)
            .bounds(0, 255)
            .size(256)
            .volatile()
    },
    {
        fn get(c: &DeviceConfig) -> FieldValue<'_> {
            FieldValue::Bool(c.runtime.sw_state)
        }
        fn slot(c: &mut DeviceConfig) -> FieldSlot<'_> {
            FieldSlot::Bool(&mut c.runtime.sw_state)
        }
        FieldDescriptor::new(FieldKind::Checkbox, "sw_state", "off", get, slot).volatile()
    },
    {
        fn get(c: &DeviceConfig) -> FieldValue<'_> {
            FieldValue::Text(c.runtime.date_time.as_str())
        }
        fn slot(c: &mut DeviceConfig) -> FieldSlot<'_> {
            FieldSlot::Text(&mut c.runtime.date_time)
        }
        FieldDescriptor::new(FieldKind::String, "date_time", "", get, slot)
            .bounds(0, 19)
            .size(20)
            .volatile()
    },
];
