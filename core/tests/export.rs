mod common;

use common::{five_riders, init_logging, worked_example};
use rider_settle_core::{
    config::{ExportConfig, FormatConfig},
    controller::SettlementController,
    error::SettleError,
    export::{resolve_destination, SummaryExporter, SummarySink},
    format::Formatter,
    ledger::EditableField,
};
use std::{
    io,
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
};

/// Collects cards in memory; optionally fails for one file name fragment.
#[derive(Default)]
struct MemorySink {
    saved:   Vec<(String, String)>,
    fail_on: Option<String>,
}

impl SummarySink for MemorySink {
    fn save(&mut self, file_name: &str, contents: &str) -> io::Result<PathBuf> {
        if let Some(bad) = &self.fail_on {
            if file_name.contains(bad.as_str()) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
        }
        self.saved.push((file_name.to_string(), contents.to_string()));
        Ok(PathBuf::from(file_name))
    }
}

fn exporter() -> SummaryExporter {
    init_logging();
    SummaryExporter::new(Formatter::new(FormatConfig::default()), &ExportConfig::default())
}

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rider-settle-{tag}-{}", std::process::id()))
}

#[test]
fn card_shows_every_section_with_display_rounding() {
    let mut controller = SettlementController::new();
    controller.load(vec![worked_example()]).unwrap();
    controller.edit_field(0, EditableField::LeaseFee, "2000").unwrap();

    let card = exporter().render(controller.record(0).unwrap());

    for section in ["[Rider]", "[Delivery fees]", "[Deductions]", "[Additional deductions]", "[Final settlement]"] {
        assert!(card.contains(section), "missing {section} in\n{card}");
    }
    assert!(card.contains("105,000원"));
    assert!(card.contains("3,465원"));
    assert!(card.contains("96,535원"));
    assert!(card.contains("-2,000원"));
    assert!(card.contains("50건"));
}

#[test]
fn zero_commission_is_shown_as_plain_zero() {
    let mut controller = SettlementController::new();
    controller.load(vec![worked_example()]).unwrap();

    let card = exporter().render(controller.record(0).unwrap());
    let commission_line = card
        .lines()
        .find(|l| l.trim_start().starts_with("Commission"))
        .unwrap();
    assert!(commission_line.trim_end().ends_with(" 0원"), "{commission_line}");
}

#[test]
fn export_record_names_the_file_after_the_rider() {
    let mut controller = SettlementController::new();
    controller.load(vec![worked_example()]).unwrap();
    let mut sink = MemorySink::default();

    let path = exporter()
        .export_record(controller.records(), 0, &mut sink)
        .unwrap();
    assert_eq!(path, PathBuf::from("rider_settlement_Park_R-100.txt"));
    assert_eq!(sink.saved.len(), 1);

    assert!(matches!(
        exporter().export_record(controller.records(), 3, &mut sink),
        Err(SettleError::IndexOutOfRange { index: 3, len: 1 })
    ));
}

#[test]
fn bulk_export_continues_past_failures() {
    let mut controller = SettlementController::new();
    controller.load(five_riders()).unwrap();
    let mut sink = MemorySink {
        fail_on: Some("R-2".into()),
        ..MemorySink::default()
    };

    let tally = exporter().export_all(controller.records(), &mut sink, &AtomicBool::new(false));

    assert_eq!(tally.succeeded, 4);
    assert_eq!(tally.failed, 1);
    assert!(!tally.cancelled);
    assert!(!tally.is_complete(5));
    assert_eq!(tally.failures[0].index, 2);
    assert_eq!(sink.saved.len(), 4);
}

#[test]
fn cancelled_export_stops_without_touching_records() {
    let mut controller = SettlementController::new();
    controller.load(five_riders()).unwrap();
    let before = controller.records().to_vec();
    let cancel = AtomicBool::new(false);
    cancel.store(true, Ordering::Relaxed);
    let mut sink = MemorySink::default();

    let tally = exporter().export_all(controller.records(), &mut sink, &cancel);

    assert!(tally.cancelled);
    assert_eq!(tally.succeeded, 0);
    assert!(sink.saved.is_empty());
    assert_eq!(controller.records(), &before[..]);
}

#[test]
fn chosen_folder_receives_every_card() {
    let mut controller = SettlementController::new();
    controller.load(five_riders()).unwrap();
    let dir = temp_dir("chosen");

    let mut sink = resolve_destination(Some(dir.as_path()), &ExportConfig::default()).unwrap();
    let tally = exporter().export_all(controller.records(), &mut sink, &AtomicBool::new(false));

    assert!(tally.is_complete(5));
    let written = std::fs::read_dir(&dir).unwrap().count();
    assert_eq!(written, 5);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unusable_folder_falls_back() {
    let blocker = temp_dir("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let fallback = temp_dir("fallback");
    let config = ExportConfig {
        fallback_dir:     fallback.clone(),
        fallback_pace_ms: 0,
        ..ExportConfig::default()
    };

    let sink = resolve_destination(Some(blocker.join("nested").as_path()), &config).unwrap();
    assert_eq!(sink.dir(), fallback.as_path());

    std::fs::remove_file(&blocker).unwrap();
    std::fs::remove_dir_all(&fallback).unwrap();
}
