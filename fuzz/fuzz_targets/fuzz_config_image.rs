//! Fuzz target: persisted config image decoding
//!
//! Loads arbitrary bytes as the stored image and verifies:
//! - No panics for any content, valid header or not
//! - An accepted image re-encodes to an image that decodes identically
//!
//! cargo fuzz run fuzz_config_image

#![no_main]

use libfuzzer_sys::fuzz_target;
use tickerview::config::layout::{self, compute_checksum, FIELDS_OFFSET, HEADER_LEN, MAGIC, PERSISTED_LEN};

fuzz_target!(|data: &[u8]| {
    let mut image = [0u8; PERSISTED_LEN];
    let n = data.len().min(PERSISTED_LEN);
    image[..n].copy_from_slice(&data[..n]);

    // Half the inputs get a valid header and checksum so the field
    // parser is reached.
    if data.first().is_some_and(|b| b & 1 == 1) {
        image[..HEADER_LEN].copy_from_slice(&MAGIC);
        let sum = compute_checksum(&image[FIELDS_OFFSET..]);
        image[HEADER_LEN..FIELDS_OFFSET].copy_from_slice(&sum.to_le_bytes());
    }

    if let Ok(cfg) = layout::decode(&image) {
        // Text padding after the terminator is not preserved; the
        // re-encoded image must decode to the same record.
        let again = layout::decode(&layout::encode(&cfg)).expect("re-encoded image must decode");
        assert!(again.persisted_eq(&cfg));
    }
});
