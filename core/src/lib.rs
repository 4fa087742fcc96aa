//! Rider settlement core: builds per-rider payroll settlements from
//! delivery records and keeps them consistent under operator edits.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod export;
pub mod format;
pub mod ledger;
pub mod raw;
pub mod snapshot;
pub mod source;
pub mod summary;
pub mod types;
