//! The rider ledger: the ordered record collection and the recompute rule.
//!
//! RULES:
//!   - Derived fields are private. They are only ever written by
//!     `DerivedFields::compute`, called from `RiderRecord::recompute`.
//!   - Every mutation of an editable input recomputes before returning.
//!   - Nothing here rounds. Rounding is a display concern (see format.rs).
//!   - No I/O.

use crate::{
    error::{SettleError, SettleResult},
    raw::{RawRow, SourceFields},
    types::{Amount, RecordIndex, WITHHOLDING_RATE},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The three inputs an operator may change per rider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditableField {
    #[serde(alias = "branchPromotion")]
    BranchPromotion,
    #[serde(alias = "commissionRate", alias = "commission")]
    CommissionRate,
    #[serde(alias = "leaseFee", alias = "rebate")]
    LeaseFee,
}

impl EditableField {
    pub const ALL: [EditableField; 3] = [
        EditableField::BranchPromotion,
        EditableField::CommissionRate,
        EditableField::LeaseFee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BranchPromotion => "branch_promotion",
            Self::CommissionRate  => "commission_rate",
            Self::LeaseFee        => "lease_fee",
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditableField {
    type Err = SettleError;

    /// Accepts snake_case and camelCase spellings, plus the older
    /// `commission` / `rebate` names some sheets and UIs still send.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "branch_promotion" | "branchPromotion"                 => Ok(Self::BranchPromotion),
            "commission_rate" | "commissionRate" | "commission"    => Ok(Self::CommissionRate),
            "lease_fee" | "leaseFee" | "rebate"                    => Ok(Self::LeaseFee),
            other => Err(SettleError::UnknownField { name: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EditableInputs {
    pub branch_promotion: Amount,
    pub commission_rate:  Amount,
    pub lease_fee:        Amount,
}

impl EditableInputs {
    pub fn get(&self, field: EditableField) -> Amount {
        match field {
            EditableField::BranchPromotion => self.branch_promotion,
            EditableField::CommissionRate  => self.commission_rate,
            EditableField::LeaseFee        => self.lease_fee,
        }
    }

    fn set(&mut self, field: EditableField, value: Amount) {
        match field {
            EditableField::BranchPromotion => self.branch_promotion = value,
            EditableField::CommissionRate  => self.commission_rate = value,
            EditableField::LeaseFee        => self.lease_fee = value,
        }
    }
}

/// The five dependent monetary fields plus the commission amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DerivedFields {
    pub commission_amount:  Amount,
    pub total_delivery_fee: Amount,
    pub deductions_total:   Amount,
    pub settlement_amount:  Amount,
    pub withholding_tax:    Amount,
    pub final_payment:      Amount,
}

impl DerivedFields {
    /// The settlement rule. Operand order is fixed so results are
    /// bit-for-bit reproducible.
    pub fn compute(source: &SourceFields, inputs: &EditableInputs) -> Self {
        let commission_amount = source.process_count as f64 * inputs.commission_rate;

        let total_delivery_fee = source.delivery_fee
            + source.additional_payment
            + inputs.branch_promotion
            - commission_amount;

        // Commission is not a deduction here; it already reduced the total fee.
        let deductions_total = source.employment_insurance
            + source.accident_insurance
            + source.hourly_insurance
            + source.employment_retroactive
            + source.accident_retroactive;

        let settlement_amount = total_delivery_fee - deductions_total;
        let withholding_tax = total_delivery_fee * WITHHOLDING_RATE;
        let final_payment = settlement_amount - withholding_tax - inputs.lease_fee;

        Self {
            commission_amount,
            total_delivery_fee,
            deductions_total,
            settlement_amount,
            withholding_tax,
            final_payment,
        }
    }
}

/// One rider's settlement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiderRecord {
    #[serde(flatten)]
    source:  SourceFields,
    #[serde(flatten)]
    inputs:  EditableInputs,
    #[serde(flatten)]
    derived: DerivedFields,
}

impl RiderRecord {
    /// Build from normalized source fields with all inputs at 0.
    pub fn new(source: SourceFields) -> Self {
        let mut record = Self {
            source,
            inputs:  EditableInputs::default(),
            derived: DerivedFields::default(),
        };
        record.recompute();
        record
    }

    /// Re-derive every dependent field from the current source and inputs.
    pub fn recompute(&mut self) {
        self.derived = DerivedFields::compute(&self.source, &self.inputs);
    }

    /// Set one input and recompute. Returns the previous value.
    pub(crate) fn set_input(&mut self, field: EditableField, value: Amount) -> Amount {
        let previous = self.inputs.get(field);
        self.inputs.set(field, value);
        self.recompute();
        previous
    }

    pub fn source(&self) -> &SourceFields   { &self.source }
    pub fn inputs(&self) -> &EditableInputs { &self.inputs }
    pub fn derived(&self) -> &DerivedFields { &self.derived }

    pub fn rider_id(&self) -> &str { &self.source.rider_id }
    pub fn name(&self) -> &str     { &self.source.name }
    pub fn process_count(&self) -> u64 { self.source.process_count }

    pub fn branch_promotion(&self) -> Amount { self.inputs.branch_promotion }
    pub fn commission_rate(&self) -> Amount  { self.inputs.commission_rate }
    pub fn lease_fee(&self) -> Amount        { self.inputs.lease_fee }

    pub fn commission_amount(&self) -> Amount  { self.derived.commission_amount }
    pub fn total_delivery_fee(&self) -> Amount { self.derived.total_delivery_fee }
    pub fn deductions_total(&self) -> Amount   { self.derived.deductions_total }
    pub fn settlement_amount(&self) -> Amount  { self.derived.settlement_amount }
    pub fn withholding_tax(&self) -> Amount    { self.derived.withholding_tax }
    pub fn final_payment(&self) -> Amount      { self.derived.final_payment }

    /// "name (ID: id)", as shown in rider pickers.
    pub fn label(&self) -> String {
        format!("{} (ID: {})", self.source.name, self.source.rider_id)
    }
}

/// Column sums across the whole ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SettlementTotals {
    pub process_count:      u64,
    pub total_delivery_fee: Amount,
    pub deductions_total:   Amount,
    pub settlement_amount:  Amount,
    pub withholding_tax:    Amount,
    pub lease_fee:          Amount,
    pub final_payment:      Amount,
}

/// The ordered collection of rider records for one loaded batch.
#[derive(Debug, Clone, Default)]
pub struct RiderLedger {
    records: Vec<RiderRecord>,
}

impl RiderLedger {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a ledger from raw rows.
    ///
    /// Rows are consumed in order until the first one with neither an id
    /// nor a name; anything after it is ignored. Fails with `EmptyDataset`
    /// when that leaves no records.
    pub fn build<I>(raw_rows: I) -> SettleResult<Self>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let records: Vec<RiderRecord> = raw_rows
            .into_iter()
            .take_while(RawRow::has_identity)
            .map(|row| RiderRecord::new(row.normalized()))
            .collect();

        if records.is_empty() {
            return Err(SettleError::EmptyDataset);
        }

        log::debug!("ledger: built {} records", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[RiderRecord] {
        &self.records
    }

    pub fn get(&self, index: RecordIndex) -> Option<&RiderRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Set one input on one record and recompute it.
    /// Returns the previous value. The ledger is untouched on error.
    pub fn set_input(
        &mut self,
        index: RecordIndex,
        field: EditableField,
        value: Amount,
    ) -> SettleResult<Amount> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(SettleError::IndexOutOfRange { index, len })?;
        Ok(record.set_input(field, value))
    }

    /// Overwrite the commission rate on every record and recompute each.
    /// Returns how many records were updated.
    pub fn set_commission_rate_all(&mut self, rate: Amount) -> usize {
        for record in &mut self.records {
            record.set_input(EditableField::CommissionRate, rate);
        }
        self.records.len()
    }

    pub fn totals(&self) -> SettlementTotals {
        self.records
            .iter()
            .fold(SettlementTotals::default(), |mut acc, r| {
                acc.process_count      += r.process_count();
                acc.total_delivery_fee += r.total_delivery_fee();
                acc.deductions_total   += r.deductions_total();
                acc.settlement_amount  += r.settlement_amount();
                acc.withholding_tax    += r.withholding_tax();
                acc.lease_fee          += r.lease_fee();
                acc.final_payment      += r.final_payment();
                acc
            })
    }
}
