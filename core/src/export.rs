//! Summary export: writes settlement cards through a sink.
//!
//! RULES:
//!   - The exporter only ever reads a borrowed `&[RiderRecord]`. It cannot
//!     observe a half-applied edit or reload.
//!   - Bulk export never aborts on a single failure. It counts and moves on.
//!   - Cancellation stops the remaining work between records. Nothing
//!     already written is rolled back and the ledger is never touched.

use crate::{
    config::ExportConfig,
    error::{SettleError, SettleResult},
    format::Formatter,
    ledger::RiderRecord,
    summary::SummaryCard,
    types::RecordIndex,
};
use serde::Serialize;
use std::{
    fs,
    io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

/// Destination for rendered cards.
pub trait SummarySink {
    /// Save one card. Returns where it was written.
    fn save(&mut self, file_name: &str, contents: &str) -> io::Result<PathBuf>;
}

/// Writes each card as a file in one folder.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir:  PathBuf,
    pace: Option<Duration>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), pace: None }
    }

    /// Like `new`, but waits `pace` after every file.
    pub fn paced(dir: impl Into<PathBuf>, pace: Duration) -> Self {
        Self { dir: dir.into(), pace: Some(pace) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SummarySink for DirectorySink {
    fn save(&mut self, file_name: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.dir.join(file_name);
        fs::write(&path, contents)?;
        if let Some(pace) = self.pace {
            thread::sleep(pace);
        }
        Ok(path)
    }
}

/// Pick the folder to export into.
///
/// A chosen folder is used when it exists or can be created. Otherwise the
/// configured fallback folder is used, with paced sequential writes.
pub fn resolve_destination(
    chosen: Option<&Path>,
    config: &ExportConfig,
) -> SettleResult<DirectorySink> {
    if let Some(dir) = chosen {
        match fs::create_dir_all(dir) {
            Ok(()) => return Ok(DirectorySink::new(dir)),
            Err(e) => log::warn!(
                "export: cannot use {} ({e}); falling back to {}",
                dir.display(),
                config.fallback_dir.display()
            ),
        }
    }
    fs::create_dir_all(&config.fallback_dir)?;
    Ok(DirectorySink::paced(
        &config.fallback_dir,
        Duration::from_millis(config.fallback_pace_ms),
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportFailure {
    pub index:  RecordIndex,
    pub label:  String,
    pub reason: String,
}

/// Outcome of a bulk export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportTally {
    pub succeeded: usize,
    pub failed:    usize,
    pub cancelled: bool,
    pub failures:  Vec<ExportFailure>,
}

impl ExportTally {
    /// Every record was written and nothing was cancelled.
    pub fn is_complete(&self, total: usize) -> bool {
        !self.cancelled && self.failed == 0 && self.succeeded == total
    }
}

pub struct SummaryExporter {
    formatter:   Formatter,
    file_prefix: String,
}

impl SummaryExporter {
    pub fn new(formatter: Formatter, config: &ExportConfig) -> Self {
        Self {
            formatter,
            file_prefix: config.file_prefix.clone(),
        }
    }

    pub fn render(&self, record: &RiderRecord) -> String {
        SummaryCard::new(record, &self.formatter).render()
    }

    /// Export one record's card.
    pub fn export_record<S: SummarySink + ?Sized>(
        &self,
        records: &[RiderRecord],
        index: RecordIndex,
        sink: &mut S,
    ) -> SettleResult<PathBuf> {
        let record = records.get(index).ok_or(SettleError::IndexOutOfRange {
            index,
            len: records.len(),
        })?;
        let path = self.save(record, sink)?;
        log::info!("export: saved {} to {}", record.label(), path.display());
        Ok(path)
    }

    /// Export every record's card in order, continuing past failures.
    pub fn export_all<S: SummarySink + ?Sized>(
        &self,
        records: &[RiderRecord],
        sink: &mut S,
        cancel: &AtomicBool,
    ) -> ExportTally {
        let mut tally = ExportTally::default();
        let total = records.len();

        for (index, record) in records.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                log::warn!("export: cancelled after {index}/{total}");
                tally.cancelled = true;
                break;
            }
            match self.save(record, sink) {
                Ok(_) => tally.succeeded += 1,
                Err(e) => {
                    log::warn!("export: {} failed: {e}", record.label());
                    tally.failed += 1;
                    tally.failures.push(ExportFailure {
                        index,
                        label:  record.label(),
                        reason: e.to_string(),
                    });
                }
            }
            log::debug!("export: progress {}/{total}", index + 1);
        }

        log::info!(
            "export: {} saved, {} failed of {total}",
            tally.succeeded,
            tally.failed
        );
        tally
    }

    fn save<S: SummarySink + ?Sized>(&self, record: &RiderRecord, sink: &mut S) -> io::Result<PathBuf> {
        let card = SummaryCard::new(record, &self.formatter);
        sink.save(&card.file_name(&self.file_prefix), &card.render())
    }
}
