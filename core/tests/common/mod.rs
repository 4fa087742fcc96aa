#![allow(dead_code)]

use rider_settle_core::raw::RawRow;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn rider(id: &str, name: &str, process_count: f64, delivery_fee: f64) -> RawRow {
    RawRow {
        id:            Some(id.into()),
        name:          Some(name.into()),
        process_count: Some(process_count),
        delivery_fee:  Some(delivery_fee),
        ..RawRow::default()
    }
}

pub fn blank() -> RawRow {
    RawRow::default()
}

/// The worked example: 100,000 delivery + 5,000 additional, 50 deliveries,
/// 2,000 employment and 1,000 accident insurance.
pub fn worked_example() -> RawRow {
    RawRow {
        id:                   Some("R-100".into()),
        name:                 Some("Park".into()),
        process_count:        Some(50.0),
        delivery_fee:         Some(100_000.0),
        additional_payment:   Some(5_000.0),
        employment_insurance: Some(2_000.0),
        accident_insurance:   Some(1_000.0),
        ..RawRow::default()
    }
}

pub fn five_riders() -> Vec<RawRow> {
    (0..5)
        .map(|i| rider(&format!("R-{i}"), &format!("Rider {i}"), 10.0 * i as f64, 50_000.0 + i as f64))
        .collect()
}
