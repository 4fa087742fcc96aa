//! Shared primitive types used across the settlement core.

/// A monetary amount in source currency units.
/// Stored unrounded; rounding happens only at display time.
pub type Amount = f64;

/// 0-based position of a record in the ledger.
/// Stable for one loaded batch, not a durable identifier.
pub type RecordIndex = usize;

/// Fixed withholding levy applied to the total delivery fee (3.3%).
pub const WITHHOLDING_RATE: f64 = 0.033;
