//! Validated, name-addressed access to a configuration record.
//!
//! The registry owns nothing but a `'static` field table and the index of
//! the last field touched by name.  The record itself is passed in on every
//! call so the application context decides who holds it.
//!
//! ## Write rules
//!
//! | kind        | accepted when                                   |
//! |-------------|-------------------------------------------------|
//! | STRING      | length within `[min, max]` (equal value: no-op) |
//! | PASSWORD    | as STRING, and the value is not the mask        |
//! | numeric     | parses as an integer within `[min, max]`        |
//! | CHECKBOX    | always (`on` → true, anything else → false)     |
//!
//! A rejected write leaves the record untouched.

use core::fmt;
use core::fmt::Write as _;

use log::{debug, warn};

use super::field::{FieldDescriptor, FieldKind, FieldSlot, FieldValue};

/// Placeholder rendered for every PASSWORD field.
pub const PASSWORD_MASK: &str = "***";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a write was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// No field with that name is registered.
    UnknownField,
    /// Index past the end of the field table.
    IndexOutOfRange(usize),
    /// Text length outside `[min, max]`.
    LengthOutOfBounds {
        field: &'static str,
        len: usize,
        min: i64,
        max: i64,
    },
    /// Parsed number outside `[min, max]`.
    ValueOutOfBounds {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    /// Text did not parse as an integer.
    NotANumber { field: &'static str },
    /// Text contains a NUL, which the stored layout cannot represent.
    EmbeddedNul { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField => write!(f, "unknown field"),
            Self::IndexOutOfRange(i) => write!(f, "field index {i} out of range"),
            Self::LengthOutOfBounds { field, len, min, max } => {
                write!(f, "{field}: length {len} not allowed, min: {min} max: {max}")
            }
            Self::ValueOutOfBounds { field, value, min, max } => {
                write!(f, "{field}: {value} not allowed, min: {min} max: {max}")
            }
            Self::NotANumber { field } => write!(f, "{field}: not a number"),
            Self::EmbeddedNul { field } => write!(f, "{field}: NUL character not allowed"),
        }
    }
}

impl core::error::Error for ValidationError {}

/// Result of an accepted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The stored value was replaced.
    Updated,
    /// Nothing to do: equal text, or the password mask came back.
    Unchanged,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ordered field table plus the last-touched cursor.
pub struct ConfigRegistry<R: 'static> {
    fields: &'static [FieldDescriptor<R>],
    last_touched: Option<usize>,
}

impl<R: 'static> ConfigRegistry<R> {
    pub const fn new(fields: &'static [FieldDescriptor<R>]) -> Self {
        Self {
            fields,
            last_touched: None,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &'static [FieldDescriptor<R>] {
        self.fields
    }

    pub fn descriptor(&self, index: usize) -> Option<&'static FieldDescriptor<R>> {
        self.fields.get(index)
    }

    /// Case-insensitive name lookup.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Index resolved by the most recent [`set_value`](Self::set_value),
    /// `None` if that name was unknown.
    pub fn last_touched(&self) -> Option<usize> {
        self.last_touched
    }

    /// Transport-safe text form of field `index`; empty if out of range.
    pub fn get_value(&self, record: &R, index: usize) -> String {
        let Some(field) = self.fields.get(index) else {
            return String::new();
        };
        if field.kind() == FieldKind::Password {
            return PASSWORD_MASK.to_owned();
        }
        match field.value(record) {
            FieldValue::Text(s) => percent_encode(s),
            // Decimal digits and '-' are already unreserved.
            FieldValue::U16(v) => v.to_string(),
            FieldValue::I16(v) => v.to_string(),
            FieldValue::U32(v) => v.to_string(),
            FieldValue::I32(v) => v.to_string(),
            FieldValue::Bool(b) => checkbox_text(b).to_owned(),
        }
    }

    /// Write `raw` into the field called `name` (case-insensitive).
    ///
    /// The resolved index is remembered for change-hook dispatch even if
    /// the value itself is rejected.
    pub fn set_value(&mut self, record: &mut R, name: &str, raw: &str) -> Result<SetOutcome, ValidationError> {
        self.last_touched = self.index_of(name);
        match self.last_touched {
            Some(index) => self.set_value_at(record, index, raw),
            None => {
                warn!("config: unknown field '{name}'");
                Err(ValidationError::UnknownField)
            }
        }
    }

    /// Write `raw` into field `index`.
    pub fn set_value_at(&self, record: &mut R, index: usize, raw: &str) -> Result<SetOutcome, ValidationError> {
        let field = self
            .fields
            .get(index)
            .ok_or(ValidationError::IndexOutOfRange(index))?;

        let result = apply(field, record, raw);
        match &result {
            Ok(outcome) => debug!("config: {} <- {} ({outcome:?})", field.name(), loggable(field, raw)),
            Err(e) => warn!("config: rejected {e}"),
        }
        result
    }

    /// Apply every field's compiled default through the normal write path.
    ///
    /// Returns the number of defaults that failed validation (zero for a
    /// consistent table).
    pub fn set_defaults(&self, record: &mut R) -> usize {
        self.fields
            .iter()
            .enumerate()
            .filter(|(i, f)| self.set_value_at(record, *i, f.default_text()).is_err())
            .count()
    }

    /// Log every field at debug level, passwords masked.
    pub fn debug_dump(&self, record: &R) {
        for (i, field) in self.fields.iter().enumerate() {
            let shown = match field.value(record) {
                _ if field.kind() == FieldKind::Password => PASSWORD_MASK.to_owned(),
                FieldValue::Text(s) => s.to_owned(),
                FieldValue::U16(v) => v.to_string(),
                FieldValue::I16(v) => v.to_string(),
                FieldValue::U32(v) => v.to_string(),
                FieldValue::I32(v) => v.to_string(),
                FieldValue::Bool(b) => checkbox_text(b).to_owned(),
            };
            debug!("{:>2}. {} = {shown}", i + 1, field.name());
        }
    }
}

fn apply<R>(field: &FieldDescriptor<R>, record: &mut R, raw: &str) -> Result<SetOutcome, ValidationError> {
    let kind = field.kind();
    if kind == FieldKind::Password && raw == PASSWORD_MASK {
        return Ok(SetOutcome::Unchanged);
    }

    match field.slot(record) {
        FieldSlot::Text(buf) => {
            if buf.as_str() == raw {
                return Ok(SetOutcome::Unchanged);
            }
            if raw.contains('\0') {
                return Err(ValidationError::EmbeddedNul { field: field.name() });
            }
            let len = raw.len();
            if (len as i64) < field.min() || (len as i64) > field.max() || buf.replace(raw).is_err() {
                return Err(ValidationError::LengthOutOfBounds {
                    field: field.name(),
                    len,
                    min: field.min(),
                    max: field.max(),
                });
            }
            Ok(SetOutcome::Updated)
        }
        FieldSlot::Bool(b) => {
            *b = raw.eq_ignore_ascii_case("on");
            Ok(SetOutcome::Updated)
        }
        FieldSlot::U16(v) => {
            *v = parse_bounded(field, raw)? as u16;
            Ok(SetOutcome::Updated)
        }
        FieldSlot::I16(v) => {
            *v = parse_bounded(field, raw)? as i16;
            Ok(SetOutcome::Updated)
        }
        FieldSlot::U32(v) => {
            *v = parse_bounded(field, raw)? as u32;
            Ok(SetOutcome::Updated)
        }
        FieldSlot::I32(v) => {
            *v = parse_bounded(field, raw)? as i32;
            Ok(SetOutcome::Updated)
        }
    }
}

/// Parse and range-check a numeric write.  Values outside the native
/// width are rejected, never wrapped.
fn parse_bounded<R>(field: &FieldDescriptor<R>, raw: &str) -> Result<i64, ValidationError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber { field: field.name() })?;

    let (lo, hi) = field.kind().native_range().unwrap_or((i64::MIN, i64::MAX));
    let min = field.min().max(lo);
    let max = field.max().min(hi);
    if value < min || value > max {
        return Err(ValidationError::ValueOutOfBounds {
            field: field.name(),
            value,
            min: field.min(),
            max: field.max(),
        });
    }
    Ok(value)
}

fn checkbox_text(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

fn loggable<'a, R>(field: &FieldDescriptor<R>, raw: &'a str) -> &'a str {
    if field.kind() == FieldKind::Password { PASSWORD_MASK } else { raw }
}

// ---------------------------------------------------------------------------
// Percent encoding
// ---------------------------------------------------------------------------

/// Encode everything except `A-Z a-z 0-9 - _ . ~` as `%XX`.
pub fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}

/// Inverse of [`percent_encode`].  With `plus_as_space`, `+` decodes to a
/// space (form encoding).  Malformed escapes are copied through verbatim;
/// invalid UTF-8 in the result is replaced.
pub fn percent_decode(s: &str, plus_as_space: bool) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(h), Some(l)) => {
                        out.push(h << 4 | l);
                        i += 3;
                        continue;
                    }
                    _ => out.push(b'%'),
                }
            }
            b'+' if plus_as_space => out.push(b' '),
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
