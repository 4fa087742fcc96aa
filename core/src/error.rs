use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettleError {
    #[error("No rider rows found in the source data")]
    EmptyDataset,

    #[error("Source sheet '{sheet}' not found")]
    MissingSourceSection { sheet: String },

    #[error("Record index {index} out of range (ledger holds {len} records)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown editable field '{name}'")]
    UnknownField { name: String },

    #[error("Invalid source layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SettleResult<T> = Result<T, SettleError>;
