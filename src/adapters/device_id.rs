//! Device identity from the ESP32 factory MAC address.
//!
//! The MAC seeds the access point SSID and hostname
//! (see [`crate::network::ap_ssid`]).  It is deterministic across reboots
//! (factory-burned eFuse MAC) and equals the station interface MAC.

use crate::network::MacAddress;

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: the buffer is exactly the 6 bytes the call writes.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}
