//! Read view of the whole ledger, serialized for a renderer.
//!
//! A snapshot is taken from a borrowed ledger, so it always reflects one
//! consistent state between mutations.

use crate::ledger::{RiderLedger, RiderRecord, SettlementTotals};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot<'a> {
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub totals:       SettlementTotals,
    pub records:      &'a [RiderRecord],
}

impl<'a> LedgerSnapshot<'a> {
    pub fn capture(ledger: &'a RiderLedger) -> Self {
        Self {
            generated_at: Utc::now(),
            record_count: ledger.len(),
            totals:       ledger.totals(),
            records:      ledger.records(),
        }
    }
}
