//! Byte layout of the persisted span.
//!
//! ```text
//! offset 0   "PET\0"             magic header
//! offset 4   u16 LE              checksum over [6, PERSISTED_LEN)
//! offset 6   fields              declared order, little-endian
//! offset 365 pad                 aligns ap_channel to 366
//! offset 635 pad                 aligns gmt_offset to 636
//! ```
//!
//! Fields sit at the offsets a naturally aligned C record gives them, so
//! images written by earlier firmware decode unchanged.  Pad bytes are
//! written as zero, covered by the checksum and ignored on read.  Text
//! fields occupy their full storage size: the content, a NUL terminator
//! and zero padding.  Nothing in [`RuntimeState`] is ever encoded.
//!
//! [`RuntimeState`]: super::RuntimeState

use core::fmt;

use super::{DeviceConfig, TextBuffer};

/// Magic header stamped on every write.
pub const MAGIC: [u8; 4] = *b"PET\0";
pub const HEADER_LEN: usize = 4;
pub const CHECKSUM_LEN: usize = 2;
/// Offset of the first checksummed byte.
pub const FIELDS_OFFSET: usize = HEADER_LEN + CHECKSUM_LEN;

const PAD: usize = 1;
const BOOL: usize = 1;
const U16: usize = 2;
const I32: usize = 4;
const SYMBOL: usize = 17;
const ASSET: usize = 7;
const SSID: usize = 33;
const SECRET: usize = 64;
const ADDRESS: usize = 16;
const USER: usize = 17;
const HOST: usize = 128;
const TZ: usize = 50;

/// Size of the whole persisted span, header included.
pub const PERSISTED_LEN: usize = FIELDS_OFFSET
    // display
    + 4 * SYMBOL
    + 4 * ASSET
    + 4 * U16
    + 4 * U16
    + 4 * BOOL
    // wifi
    + SSID
    + SECRET
    + BOOL
    + 5 * ADDRESS
    + BOOL
    + SECRET
    + PAD
    + 3 * U16
    // web
    + BOOL
    + USER
    + SECRET
    + U16
    // ntp
    + BOOL
    + HOST
    + TZ
    + PAD
    + I32
    + U16;

/// Alignment pad bytes inside the span.
pub const ALIGN_PAD_BYTES: usize = 2 * PAD;

/// The raw persisted image.
pub type Image = [u8; PERSISTED_LEN];

/// Why an image was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    HeaderMismatch,
    ChecksumMismatch { stored: u16, computed: u16 },
    /// Header and checksum are fine but a text field is not UTF-8 or has
    /// no terminator.
    Malformed(&'static str),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderMismatch => write!(f, "header mismatch"),
            Self::ChecksumMismatch { stored, computed } => {
                write!(f, "checksum mismatch (stored 0x{stored:04X}, computed 0x{computed:04X})")
            }
            Self::Malformed(field) => write!(f, "malformed field {field}"),
        }
    }
}

/// Position-weighted 16-bit sum.
///
/// Seeded with the span length; byte `i` (from the start) is weighted by
/// `len - i`.  Cheap corruption detection only, not an integrity or
/// authenticity guarantee.
pub fn compute_checksum(span: &[u8]) -> u16 {
    let len = span.len();
    let mut sum = len as u16;
    for (i, &b) in span.iter().enumerate() {
        sum = sum.wrapping_add((usize::from(b).wrapping_mul(len - i)) as u16);
    }
    sum
}

/// Checksum stored in an image.
pub fn stored_checksum(image: &Image) -> u16 {
    u16::from_le_bytes([image[HEADER_LEN], image[HEADER_LEN + 1]])
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn bytes(&mut self, data: &[u8]) {
        self.buf[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
    }

    /// Content, then zeros up to `size`.  The buffer capacity is always
    /// `size - 1`, so the terminator always fits.
    fn text(&mut self, s: &dyn TextBuffer, size: usize) {
        let n = s.as_str().len().min(size - 1);
        self.buf[self.pos..self.pos + n].copy_from_slice(&s.as_str().as_bytes()[..n]);
        self.pos += size;
    }

    /// Alignment gap, left zero.
    fn pad(&mut self, n: usize) {
        self.pos += n;
    }

    fn u16(&mut self, v: u16) {
        self.bytes(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.bytes(&v.to_le_bytes());
    }

    fn bool(&mut self, v: bool) {
        self.bytes(&[u8::from(v)]);
    }
}

/// Serialise the persisted fields, stamp the header and checksum.
pub fn encode(cfg: &DeviceConfig) -> Image {
    let mut image = [0u8; PERSISTED_LEN];
    let mut w = Writer {
        buf: &mut image,
        pos: FIELDS_OFFSET,
    };

    for s in [&cfg.symbol1, &cfg.symbol2, &cfg.symbol3, &cfg.symbol4] {
        w.text(s, SYMBOL);
    }
    for a in [&cfg.asset1, &cfg.asset2, &cfg.asset3, &cfg.asset4] {
        w.text(a, ASSET);
    }
    for d in [cfg.digits1, cfg.digits2, cfg.digits3, cfg.digits4] {
        w.u16(d);
    }
    w.u16(cfg.history_window);
    w.u16(cfg.price_update);
    w.u16(cfg.display_time);
    w.u16(cfg.x_offset);
    w.bool(cfg.show_percent);
    w.bool(cfg.show_hw);
    w.bool(cfg.show_hp);
    w.bool(cfg.show_time);

    w.text(&cfg.wifi_ssid, SSID);
    w.text(&cfg.sta_wifi_passwd, SECRET);
    w.bool(cfg.staticip_enabled);
    for addr in [
        &cfg.ip_address,
        &cfg.subnetmask,
        &cfg.gateway_address,
        &cfg.dns1_address,
        &cfg.dns2_address,
    ] {
        w.text(addr, ADDRESS);
    }
    w.bool(cfg.ap_only);
    w.text(&cfg.ap_wifi_passwd, SECRET);
    w.pad(PAD);
    w.u16(cfg.ap_channel);
    w.u16(cfg.ap_fallback);
    w.u16(cfg.wifi_check_sec);

    w.bool(cfg.web_auth);
    w.text(&cfg.web_user, USER);
    w.text(&cfg.web_passwd, SECRET);
    w.u16(cfg.web_idle_timeout);

    w.bool(cfg.ntp_enabled);
    w.text(&cfg.ntp_server, HOST);
    w.text(&cfg.tz_string, TZ);
    w.pad(PAD);
    w.i32(cfg.gmt_offset);
    w.u16(cfg.daylight_offset);
    debug_assert_eq!(w.pos, PERSISTED_LEN);

    let sum = compute_checksum(&image[FIELDS_OFFSET..]);
    image[..HEADER_LEN].copy_from_slice(&MAGIC);
    image[HEADER_LEN..FIELDS_OFFSET].copy_from_slice(&sum.to_le_bytes());
    image
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> &'a [u8] {
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        s
    }

    fn text<const N: usize>(
        &mut self,
        field: &'static str,
        out: &mut heapless::String<N>,
    ) -> Result<(), InvalidReason> {
        let raw = self.take(N + 1);
        let end = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or(InvalidReason::Malformed(field))?;
        let s = core::str::from_utf8(&raw[..end]).map_err(|_| InvalidReason::Malformed(field))?;
        TextBuffer::replace(out, s).map_err(|()| InvalidReason::Malformed(field))
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn u16(&mut self) -> u16 {
        let b = self.take(2);
        u16::from_le_bytes([b[0], b[1]])
    }

    fn i32(&mut self) -> i32 {
        let b = self.take(4);
        i32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    fn bool(&mut self) -> bool {
        self.take(1)[0] != 0
    }
}

/// Validate header and checksum, then parse the fields into a record
/// whose runtime part is default.
pub fn decode(image: &Image) -> Result<DeviceConfig, InvalidReason> {
    if image[..HEADER_LEN] != MAGIC {
        return Err(InvalidReason::HeaderMismatch);
    }
    let stored = stored_checksum(image);
    let computed = compute_checksum(&image[FIELDS_OFFSET..]);
    if stored != computed {
        return Err(InvalidReason::ChecksumMismatch { stored, computed });
    }

    let mut cfg = DeviceConfig::default();
    let mut r = Reader {
        buf: image,
        pos: FIELDS_OFFSET,
    };

    r.text("symbol1", &mut cfg.symbol1)?;
    r.text("symbol2", &mut cfg.symbol2)?;
    r.text("symbol3", &mut cfg.symbol3)?;
    r.text("symbol4", &mut cfg.symbol4)?;
    r.text("asset1", &mut cfg.asset1)?;
    r.text("asset2", &mut cfg.asset2)?;
    r.text("asset3", &mut cfg.asset3)?;
    r.text("asset4", &mut cfg.asset4)?;
    cfg.digits1 = r.u16();
    cfg.digits2 = r.u16();
    cfg.digits3 = r.u16();
    cfg.digits4 = r.u16();
    cfg.history_window = r.u16();
    cfg.price_update = r.u16();
    cfg.display_time = r.u16();
    cfg.x_offset = r.u16();
    cfg.show_percent = r.bool();
    cfg.show_hw = r.bool();
    cfg.show_hp = r.bool();
    cfg.show_time = r.bool();

    r.text("wifi_ssid", &mut cfg.wifi_ssid)?;
    r.text("sta_wifi_passwd", &mut cfg.sta_wifi_passwd)?;
    cfg.staticip_enabled = r.bool();
    r.text("ip_address", &mut cfg.ip_address)?;
    r.text("subnetmask", &mut cfg.subnetmask)?;
    r.text("gateway_address", &mut cfg.gateway_address)?;
    r.text("dns1_address", &mut cfg.dns1_address)?;
    r.text("dns2_address", &mut cfg.dns2_address)?;
    cfg.ap_only = r.bool();
    r.text("ap_wifi_passwd", &mut cfg.ap_wifi_passwd)?;
    r.skip(PAD);
    cfg.ap_channel = r.u16();
    cfg.ap_fallback = r.u16();
    cfg.wifi_check_sec = r.u16();

    cfg.web_auth = r.bool();
    r.text("web_user", &mut cfg.web_user)?;
    r.text("web_passwd", &mut cfg.web_passwd)?;
    cfg.web_idle_timeout = r.u16();

    cfg.ntp_enabled = r.bool();
    r.text("ntp_server", &mut cfg.ntp_server)?;
    r.text("tz_string", &mut cfg.tz_string)?;
    r.skip(PAD);
    cfg.gmt_offset = r.i32();
    cfg.daylight_offset = r.u16();
    debug_assert_eq!(r.pos, PERSISTED_LEN);

    Ok(cfg)
}
