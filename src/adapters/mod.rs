//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                      |
//! |-------------|--------------|----------------------------------|
//! | `console`   | -            | Serial console commands          |
//! | `device_id` | -            | eFuse factory MAC                |
//! | `hardware`  | -            | Restore button (embedded-hal)    |
//! | `log_sink`  | EventSink    | Serial log output                |
//! | `nvs`       | StoragePort  | NVS blob / in-memory EEPROM      |
//! | `sntp`      | -            | SNTP client and TZ               |
//! | `time`      | ClockPort    | ESP32 system timer               |
//! | `web`       | WebPort      | Settings web UI lifecycle        |
//! | `wifi`      | RadioPort    | ESP-IDF WiFi driver / simulation |

pub mod console;
pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod sntp;
pub mod time;
pub mod web;
pub mod wifi;
