//! Fuzz target: web form field writes
//!
//! Splits the input into `name=value` pairs, percent-decodes them like a
//! form submission and applies them to a defaulted record, asserting:
//! - No panics for any name or value
//! - Every numeric field stays within its declared bounds
//! - The record still encodes and decodes cleanly
//!
//! cargo fuzz run fuzz_form_fields

#![no_main]

use libfuzzer_sys::fuzz_target;
use tickerview::config::layout;
use tickerview::config::registry::percent_decode;
use tickerview::config::{ConfigRegistry, DeviceConfig, FieldValue, DEVICE_FIELDS};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let mut registry = ConfigRegistry::new(&DEVICE_FIELDS);
    let mut cfg = DeviceConfig::default();
    registry.set_defaults(&mut cfg);

    for pair in text.split('&') {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = percent_decode(name, true);
        let value = percent_decode(value, true);
        let _ = registry.set_value(&mut cfg, &name, &value);
    }

    for field in registry.fields() {
        let value = match field.value(&cfg) {
            FieldValue::U16(v) => i64::from(v),
            FieldValue::I16(v) => i64::from(v),
            FieldValue::U32(v) => i64::from(v),
            FieldValue::I32(v) => i64::from(v),
            FieldValue::Text(_) | FieldValue::Bool(_) => continue,
        };
        assert!(
            (field.min()..=field.max()).contains(&value),
            "{} = {value} escaped its bounds",
            field.name()
        );
    }

    let back = layout::decode(&layout::encode(&cfg)).expect("edited record must round-trip");
    assert!(back.persisted_eq(&cfg));
});
