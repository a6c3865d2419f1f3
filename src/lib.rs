//! TickerView firmware library.
//!
//! Exposes the configuration, persistence and connectivity core for
//! integration testing and the firmware binary.  All ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod network;
pub mod pins;
pub mod storage;
