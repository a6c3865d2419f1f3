//! Integration tests for config persistence over both storage backends.

use super::mock_hw::MockEeprom;

use tickerview::adapters::nvs::NvsEeprom;
use tickerview::app::ports::StoragePort;
use tickerview::config::layout::{FIELDS_OFFSET, HEADER_LEN, PERSISTED_LEN};
use tickerview::config::{ConfigRegistry, DeviceConfig, DEVICE_FIELDS};
use tickerview::storage::{compute_checksum, read_config, write_config, InvalidReason, PersistError};

fn defaults() -> DeviceConfig {
    let mut cfg = DeviceConfig::default();
    assert_eq!(ConfigRegistry::new(&DEVICE_FIELDS).set_defaults(&mut cfg), 0);
    cfg
}

#[test]
fn edited_record_survives_power_cycle() {
    let mut registry = ConfigRegistry::new(&DEVICE_FIELDS);
    let mut cfg = defaults();
    registry.set_value(&mut cfg, "symbol2", "ETHUSDT").unwrap();
    registry.set_value(&mut cfg, "gmt_offset", "-18000").unwrap();
    registry.set_value(&mut cfg, "wifi_ssid", "Cafe Guest").unwrap();

    let mut eeprom = MockEeprom::new();
    let written = write_config(&mut eeprom, &cfg).unwrap();
    assert_eq!(eeprom.commits, 1);
    eeprom.power_cycle();

    let mut loaded = DeviceConfig::default();
    assert_eq!(read_config(&mut eeprom, &mut loaded), Ok(written));
    assert_eq!(loaded.symbol2.as_str(), "ETHUSDT");
    assert_eq!(loaded.gmt_offset, -18000);
    assert_eq!(loaded.wifi_ssid.as_str(), "Cafe Guest");
    assert!(loaded.persisted_eq(&cfg));
}

#[test]
fn stored_checksum_covers_field_span_only() {
    let mut eeprom = MockEeprom::new();
    let sum = write_config(&mut eeprom, &defaults()).unwrap();
    assert_eq!(&eeprom.committed[..HEADER_LEN], b"PET\0");
    assert_eq!(sum, compute_checksum(&eeprom.committed[FIELDS_OFFSET..PERSISTED_LEN]));
    assert_eq!(eeprom.committed[HEADER_LEN..FIELDS_OFFSET], sum.to_le_bytes());
}

#[test]
fn corrupted_field_byte_falls_back() {
    let mut eeprom = MockEeprom::new();
    write_config(&mut eeprom, &defaults()).unwrap();
    eeprom.shadow[FIELDS_OFFSET + 200] ^= 0x55;

    let mut loaded = DeviceConfig::default();
    let result = read_config(&mut eeprom, &mut loaded);
    assert!(matches!(
        result,
        Err(PersistError::Invalid(InvalidReason::ChecksumMismatch { .. }))
    ));
    assert_eq!(loaded, DeviceConfig::default());
}

#[test]
fn truncated_write_is_detected() {
    let mut eeprom = MockEeprom::new();
    let cfg = defaults();
    write_config(&mut eeprom, &cfg).unwrap();

    // an interrupted write leaves the tail of the span zeroed
    let mut partial = eeprom.shadow.clone();
    partial[PERSISTED_LEN / 2..].fill(0);
    eeprom.shadow = partial;

    let mut loaded = DeviceConfig::default();
    assert!(read_config(&mut eeprom, &mut loaded).is_err());
}

#[test]
fn nvs_backend_round_trip() {
    let mut nvs = NvsEeprom::new(PERSISTED_LEN).unwrap();
    assert_eq!(nvs.capacity(), PERSISTED_LEN);

    let mut blank = DeviceConfig::default();
    assert_eq!(
        read_config(&mut nvs, &mut blank),
        Err(PersistError::Invalid(InvalidReason::HeaderMismatch))
    );

    let cfg = defaults();
    let sum = write_config(&mut nvs, &cfg).unwrap();
    nvs.power_cycle();

    let mut loaded = DeviceConfig::default();
    assert_eq!(read_config(&mut nvs, &mut loaded), Ok(sum));
    assert_eq!(loaded.digits1, 2);
    assert_eq!(loaded.ap_fallback, 34560);
}

#[test]
fn nvs_failed_commit_keeps_previous_image() {
    let mut nvs = NvsEeprom::new(PERSISTED_LEN).unwrap();
    let mut registry = ConfigRegistry::new(&DEVICE_FIELDS);
    let mut cfg = defaults();
    let first = write_config(&mut nvs, &cfg).unwrap();

    registry.set_value(&mut cfg, "display_time", "9").unwrap();
    nvs.set_fail_commit(true);
    assert!(matches!(write_config(&mut nvs, &cfg), Err(PersistError::WriteFailed(_))));
    nvs.power_cycle();

    let mut loaded = DeviceConfig::default();
    assert_eq!(read_config(&mut nvs, &mut loaded), Ok(first));
    assert_ne!(loaded.display_time, 9);
}

#[test]
fn nvs_committed_image_tamper_is_rejected() {
    let mut nvs = NvsEeprom::new(PERSISTED_LEN).unwrap();
    write_config(&mut nvs, &defaults()).unwrap();
    nvs.committed_mut()[0] = b'X';
    nvs.power_cycle();

    let mut loaded = DeviceConfig::default();
    assert_eq!(
        read_config(&mut nvs, &mut loaded),
        Err(PersistError::Invalid(InvalidReason::HeaderMismatch))
    );
}
