//! Declarative field descriptors.
//!
//! A [`FieldDescriptor`] binds a field name to its type tag, compiled
//! default, bounds and an accessor pair over the record type `R`.  The
//! accessors replace raw byte offsets: `get` borrows the typed value,
//! `slot` hands out a typed mutable reference, and nothing else in the
//! registry ever touches the record directly.

use core::fmt;

/// Type tag of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    /// Text that is never rendered back to the transport.
    Password,
    Uint16,
    Int16,
    Uint32,
    Int32,
    /// Boolean rendered as `on` / `off`.
    Checkbox,
}

impl FieldKind {
    pub fn is_text(self) -> bool {
        matches!(self, Self::String | Self::Password)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Uint16 | Self::Int16 | Self::Uint32 | Self::Int32)
    }

    /// Inclusive range of the native integer type.
    pub(crate) fn native_range(self) -> Option<(i64, i64)> {
        match self {
            Self::Uint16 => Some((0, i64::from(u16::MAX))),
            Self::Int16 => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            Self::Uint32 => Some((0, i64::from(u32::MAX))),
            Self::Int32 => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            Self::Checkbox => Some((0, 1)),
            Self::String | Self::Password => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "STRING"),
            Self::Password => write!(f, "PASSWORD"),
            Self::Uint16 => write!(f, "UINT16"),
            Self::Int16 => write!(f, "INT16"),
            Self::Uint32 => write!(f, "UINT32"),
            Self::Int32 => write!(f, "INT32"),
            Self::Checkbox => write!(f, "CHECKBOX"),
        }
    }
}

/// Whether a field belongs to the persisted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Persisted,
    /// Lives after the sentinel; never written to flash.
    Volatile,
}

/// Change hook fired when a single-field submission touches a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldHook {
    /// NTP server / offsets / TZ changed: the clock must be reconfigured.
    NtpConfig,
}

// ---------------------------------------------------------------------------
// Typed access
// ---------------------------------------------------------------------------

/// Borrowed view of a field's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    Bool(bool),
}

/// Mutable handle onto a field's storage.
pub enum FieldSlot<'a> {
    Text(&'a mut dyn TextBuffer),
    U16(&'a mut u16),
    I16(&'a mut i16),
    U32(&'a mut u32),
    I32(&'a mut i32),
    Bool(&'a mut bool),
}

/// Fixed-capacity text storage.
pub trait TextBuffer {
    fn as_str(&self) -> &str;

    /// Maximum length in bytes (storage size minus the terminator).
    fn capacity(&self) -> usize;

    /// Replace the content.  Fails without modification if `value`
    /// exceeds the capacity.
    fn replace(&mut self, value: &str) -> Result<(), ()>;
}

impl<const N: usize> TextBuffer for heapless::String<N> {
    fn as_str(&self) -> &str {
        heapless::String::as_str(self)
    }

    fn capacity(&self) -> usize {
        N
    }

    fn replace(&mut self, value: &str) -> Result<(), ()> {
        if value.len() > N {
            return Err(());
        }
        self.clear();
        self.push_str(value)
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Read accessor: borrow the typed value of one field.
pub type FieldGetter<R> = fn(&R) -> FieldValue<'_>;
/// Write accessor: borrow the typed storage of one field.
pub type FieldSlotFn<R> = fn(&mut R) -> FieldSlot<'_>;

/// Compile-time metadata for one configuration field.
///
/// Built with the `const` builder methods so whole tables can live in a
/// `static`.
pub struct FieldDescriptor<R> {
    kind: FieldKind,
    name: &'static str,
    default: &'static str,
    size: usize,
    min: i64,
    max: i64,
    hook: Option<FieldHook>,
    persistence: Persistence,
    get: FieldGetter<R>,
    slot: FieldSlotFn<R>,
}

impl<R> Clone for FieldDescriptor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldDescriptor<R> {}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("size", &self.size)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}

impl<R> FieldDescriptor<R> {
    /// A persisted field with bounds `[0, 0]` and no hook.  Chain
    /// [`bounds`](Self::bounds), [`size`](Self::size) etc. to complete it.
    pub const fn new(
        kind: FieldKind,
        name: &'static str,
        default: &'static str,
        get: FieldGetter<R>,
        slot: FieldSlotFn<R>,
    ) -> Self {
        let (size, min, max) = match kind {
            FieldKind::Uint16 | FieldKind::Int16 => (2, 0, 0),
            FieldKind::Uint32 | FieldKind::Int32 => (4, 0, 0),
            FieldKind::Checkbox => (1, 0, 1),
            FieldKind::String | FieldKind::Password => (1, 0, 0),
        };
        Self {
            kind,
            name,
            default,
            size,
            min,
            max,
            hook: None,
            persistence: Persistence::Persisted,
            get,
            slot,
        }
    }

    /// Numeric value bounds, or text length bounds (inclusive).
    pub const fn bounds(mut self, min: i64, max: i64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Storage size in bytes.
    pub const fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub const fn on_change(mut self, hook: FieldHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub const fn volatile(mut self) -> Self {
        self.persistence = Persistence::Volatile;
        self
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_text(&self) -> &'static str {
        self.default
    }

    pub fn storage_size(&self) -> usize {
        self.size
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn hook(&self) -> Option<FieldHook> {
        self.hook
    }

    pub fn persistence(&self) -> Persistence {
        self.persistence
    }

    pub fn value<'a>(&self, record: &'a R) -> FieldValue<'a> {
        (self.get)(record)
    }

    pub fn slot<'a>(&self, record: &'a mut R) -> FieldSlot<'a> {
        (self.slot)(record)
    }
}
