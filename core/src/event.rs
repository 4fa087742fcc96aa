//! Outcomes reported back to the caller of `SettlementController::apply`
//! and `SettlementController::load_from`.
//!
//! Events are returned, never stored. There is no edit history.

use crate::{
    ledger::EditableField,
    types::{Amount, RecordIndex},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettlementEvent {
    RecordsLoaded {
        count:    usize,
        replaced: usize,
    },
    FieldEdited {
        index:     RecordIndex,
        field:     EditableField,
        old_value: Amount,
        new_value: Amount,
        /// The raw input did not parse as a non-negative number and was set to 0.
        coerced:   bool,
    },
    BulkCommissionApplied {
        rate:    Amount,
        updated: usize,
    },
    BulkCommissionSkipped {
        raw: String,
    },
}
