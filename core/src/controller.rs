//! The settlement controller: mediates operator actions against the ledger.
//!
//! RULES:
//!   - The controller owns exactly one `RiderLedger`. There is no shared
//!     or global record collection.
//!   - A load builds the replacement ledger completely before swapping it
//!     in. A failed load leaves the previous ledger in place.
//!   - Reporting is pull based: callers read `ledger()` after a call returns.

use crate::{
    command::OperatorCommand,
    error::SettleResult,
    event::SettlementEvent,
    ledger::{EditableField, RiderLedger, RiderRecord},
    raw::RawRow,
    source::RecordSource,
    types::{Amount, RecordIndex},
};

#[derive(Debug, Default)]
pub struct SettlementController {
    ledger: RiderLedger,
}

/// Result of a single-field edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldEdit {
    pub old_value: Amount,
    pub new_value: Amount,
    pub coerced:   bool,
}

impl SettlementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &RiderLedger {
        &self.ledger
    }

    pub fn records(&self) -> &[RiderRecord] {
        self.ledger.records()
    }

    pub fn record(&self, index: RecordIndex) -> Option<&RiderRecord> {
        self.ledger.get(index)
    }

    pub fn is_loaded(&self) -> bool {
        !self.ledger.is_empty()
    }

    /// Replace the whole collection with a freshly built ledger.
    /// Returns the number of records loaded.
    pub fn load<I>(&mut self, raw_rows: I) -> SettleResult<usize>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let ledger = RiderLedger::build(raw_rows)?;
        let (count, _) = self.install(ledger);
        Ok(count)
    }

    /// Read rows from a record source, then load them.
    pub fn load_from<S: RecordSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> SettleResult<SettlementEvent> {
        let rows = source.read_rows()?;
        let ledger = RiderLedger::build(rows)?;
        let (count, replaced) = self.install(ledger);
        Ok(SettlementEvent::RecordsLoaded { count, replaced })
    }

    /// Swap in a fully built ledger. Returns (loaded, replaced) counts.
    fn install(&mut self, ledger: RiderLedger) -> (usize, usize) {
        let count = ledger.len();
        let replaced = std::mem::replace(&mut self.ledger, ledger).len();
        log::info!("controller: loaded {count} riders (replaced {replaced})");
        (count, replaced)
    }

    /// Set one editable input from raw operator text and recompute that record.
    ///
    /// Unparseable or negative input becomes 0; that is never an error.
    /// Only an index that addresses no record fails.
    pub fn edit_field(
        &mut self,
        index: RecordIndex,
        field: EditableField,
        raw_value: &str,
    ) -> SettleResult<FieldEdit> {
        let (new_value, coerced) = coerce_non_negative(parse_operator_amount(raw_value));
        let old_value = self.ledger.set_input(index, field, new_value)?;

        if coerced {
            log::debug!("controller: record {index} {field} input {raw_value:?} coerced to 0");
        }
        log::debug!("controller: record {index} {field} {old_value} -> {new_value}");

        Ok(FieldEdit { old_value, new_value, coerced })
    }

    /// Overwrite the commission rate on every record.
    ///
    /// Returns `None`, leaving every record untouched, when `raw_rate` is
    /// blank or has no leading number. Negative rates are clamped to 0.
    pub fn apply_bulk_commission(&mut self, raw_rate: &str) -> Option<usize> {
        let rate = bulk_rate(raw_rate)?;
        Some(self.set_commission_all(rate))
    }

    fn set_commission_all(&mut self, rate: Amount) -> usize {
        let updated = self.ledger.set_commission_rate_all(rate);
        log::info!("controller: commission rate {rate} applied to {updated} riders");
        updated
    }

    /// Command entry point for front ends that speak `OperatorCommand`.
    pub fn apply(&mut self, command: OperatorCommand) -> SettleResult<SettlementEvent> {
        match command {
            OperatorCommand::EditField { index, field, value } => {
                let edit = self.edit_field(index, field, &value)?;
                Ok(SettlementEvent::FieldEdited {
                    index,
                    field,
                    old_value: edit.old_value,
                    new_value: edit.new_value,
                    coerced:   edit.coerced,
                })
            }
            OperatorCommand::ApplyBulkCommission { rate: raw } => match bulk_rate(&raw) {
                Some(rate) => {
                    let updated = self.set_commission_all(rate);
                    Ok(SettlementEvent::BulkCommissionApplied { rate, updated })
                }
                None => {
                    log::debug!("controller: bulk commission {raw:?} ignored");
                    Ok(SettlementEvent::BulkCommissionSkipped { raw })
                }
            },
        }
    }
}

/// Parse the number an operator typed.
///
/// Surrounding whitespace and `,` group separators are ignored. The longest
/// leading run that reads as a number wins, so exponents work ("2.5e1" is 25)
/// and a trailing unit suffix such as "원" is tolerated.
/// Returns `None` when there is no leading number at all.
pub fn parse_operator_amount(raw: &str) -> Option<Amount> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();

    cleaned
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .rev()
        .find_map(|end| cleaned[..end].parse::<f64>().ok().filter(|v| v.is_finite()))
}

fn bulk_rate(raw: &str) -> Option<Amount> {
    parse_operator_amount(raw).map(|v| coerce_non_negative(Some(v)).0)
}

/// Clamp to a non-negative amount. The flag reports whether the input
/// had to be replaced.
fn coerce_non_negative(value: Option<Amount>) -> (Amount, bool) {
    match value {
        Some(v) if v > 0.0 => (v, false),
        // Folds -0.0 into 0.0.
        Some(v) if v == 0.0 => (0.0, false),
        _ => (0.0, true),
    }
}
