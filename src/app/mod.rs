//! Application core: orchestration logic, zero I/O.
//!
//! This module wires the configuration registry, the persistent store and
//! the network mode controller into one application context.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
