//! GPIO assignments for the TickerView board.
//!
//! Single source of truth: adapters reference this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Restore button
// ---------------------------------------------------------------------------

/// Digital input sampled once at boot.  HIGH = restore mode (access point
/// with the compiled password, web UI without authentication).
pub const RESTORE_PIN_GPIO: i32 = 33;
