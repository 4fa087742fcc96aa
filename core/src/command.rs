use crate::{ledger::EditableField, types::RecordIndex};
use serde::{Deserialize, Serialize};

/// All operator-issued edits.
///
/// Values arrive as the raw text an operator typed; the controller owns
/// parsing and coercion so every front end behaves the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum OperatorCommand {
    EditField {
        index: RecordIndex,
        field: EditableField,
        value: String,
    },
    ApplyBulkCommission {
        rate: String,
    },
}
