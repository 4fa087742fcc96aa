//! Raw rider rows as extracted by a record source, and the single
//! normalization step that turns absent cells into explicit defaults.
//!
//! RULE: nothing downstream of `RawRow::normalized` ever sees an `Option`.
//! An absent amount becomes 0 here and only here, so an operator's explicit
//! zero edit later on is never confused with a blank source cell.

use crate::types::Amount;
use serde::{Deserialize, Serialize};

/// One row exactly as the record source found it.
/// `None` means the cell was blank or unusable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub id:                     Option<String>,
    pub name:                   Option<String>,
    pub process_count:          Option<f64>,
    pub delivery_fee:           Option<f64>,
    pub additional_payment:     Option<f64>,
    pub hourly_insurance:       Option<f64>,
    pub employment_insurance:   Option<f64>,
    pub accident_insurance:     Option<f64>,
    pub employment_retroactive: Option<f64>,
    pub accident_retroactive:   Option<f64>,
}

/// Source fields after normalization. Immutable once a record is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceFields {
    pub rider_id:               String,
    pub name:                   String,
    pub process_count:          u64,
    pub delivery_fee:           Amount,
    pub additional_payment:     Amount,
    pub hourly_insurance:       Amount,
    pub employment_insurance:   Amount,
    pub accident_insurance:     Amount,
    pub employment_retroactive: Amount,
    pub accident_retroactive:   Amount,
}

impl RawRow {
    /// A row identifies a rider when either the id or the name is non-blank.
    /// The first row failing this ends a batch.
    pub fn has_identity(&self) -> bool {
        !is_blank(&self.id) || !is_blank(&self.name)
    }

    pub fn normalized(&self) -> SourceFields {
        SourceFields {
            rider_id:               text_or_empty(&self.id),
            name:                   text_or_empty(&self.name),
            process_count:          count_or_zero(self.process_count),
            delivery_fee:           amount_or_zero(self.delivery_fee),
            additional_payment:     amount_or_zero(self.additional_payment),
            hourly_insurance:       amount_or_zero(self.hourly_insurance),
            employment_insurance:   amount_or_zero(self.employment_insurance),
            accident_insurance:     amount_or_zero(self.accident_insurance),
            employment_retroactive: amount_or_zero(self.employment_retroactive),
            accident_retroactive:   amount_or_zero(self.accident_retroactive),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn text_or_empty(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Absent or non-finite amounts default to 0.
pub fn amount_or_zero(value: Option<f64>) -> Amount {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Counts are whole and non-negative.
pub fn count_or_zero(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.round() as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identity_is_detected() {
        let row = RawRow {
            id:   Some("   ".into()),
            name: None,
            ..RawRow::default()
        };
        assert!(!row.has_identity());

        let named = RawRow {
            name: Some("Kim".into()),
            ..RawRow::default()
        };
        assert!(named.has_identity());
    }

    #[test]
    fn absent_amounts_normalize_to_zero() {
        let row = RawRow {
            id:            Some(" R-1 ".into()),
            process_count: Some(-3.0),
            delivery_fee:  Some(f64::NAN),
            additional_payment: Some(1200.5),
            ..RawRow::default()
        };
        let fields = row.normalized();

        assert_eq!(fields.rider_id, "R-1");
        assert_eq!(fields.name, "");
        assert_eq!(fields.process_count, 0);
        assert_eq!(fields.delivery_fee, 0.0);
        assert_eq!(fields.additional_payment, 1200.5);
        assert_eq!(fields.accident_retroactive, 0.0);
    }

    #[test]
    fn fractional_counts_round() {
        assert_eq!(count_or_zero(Some(41.6)), 42);
        assert_eq!(count_or_zero(None), 0);
    }
}
