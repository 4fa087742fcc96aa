//! Per-rider settlement card, rendered as plain text.
//!
//! Sections, in order: basic info, delivery fees, deductions,
//! additional deductions, final settlement.

use crate::{format::Formatter, ledger::RiderRecord};
use std::fmt::Write;

pub struct SummaryCard<'a> {
    record:    &'a RiderRecord,
    formatter: &'a Formatter,
}

impl<'a> SummaryCard<'a> {
    pub fn new(record: &'a RiderRecord, formatter: &'a Formatter) -> Self {
        Self { record, formatter }
    }

    pub fn render(&self) -> String {
        let r = self.record;
        let f = self.formatter;
        let mut out = String::new();

        section(&mut out, "Rider");
        line(&mut out, "Rider ID", r.rider_id());
        line(&mut out, "Name", r.name());
        line(&mut out, "Deliveries", &f.count(r.process_count()));

        section(&mut out, "Delivery fees");
        line(&mut out, "Delivery fee", &f.currency(r.source().delivery_fee));
        line(&mut out, "Additional payment", &f.currency(r.source().additional_payment));
        line(&mut out, "Branch promotion", &f.currency(r.branch_promotion()));
        line(
            &mut out,
            &format!(
                "Commission ({} x {})",
                f.count(r.process_count()),
                f.currency(r.commission_rate())
            ),
            &f.deduction_field(r.commission_amount()),
        );
        line(&mut out, "Total delivery fee", &f.currency(r.total_delivery_fee()));

        section(&mut out, "Deductions");
        line(&mut out, "Employment insurance", &f.currency(r.source().employment_insurance));
        line(&mut out, "Accident insurance", &f.currency(r.source().accident_insurance));
        line(&mut out, "Hourly insurance", &f.currency(r.source().hourly_insurance));
        line(&mut out, "Employment retroactive", &f.currency(r.source().employment_retroactive));
        line(&mut out, "Accident retroactive", &f.currency(r.source().accident_retroactive));

        section(&mut out, "Additional deductions");
        line(&mut out, "Lease fee", &f.deduction_field(r.lease_fee()));

        section(&mut out, "Final settlement");
        line(&mut out, "Settlement amount", &f.currency(r.settlement_amount()));
        line(&mut out, "Withholding tax (3.3%)", &f.currency(r.withholding_tax()));
        line(&mut out, "Final payment", &f.currency(r.final_payment()));

        out
    }

    /// `{prefix}_{name}_{id}.txt` with path-unsafe characters replaced.
    pub fn file_name(&self, prefix: &str) -> String {
        format!(
            "{}_{}_{}.txt",
            prefix,
            sanitize(self.record.name()),
            sanitize(self.record.rider_id())
        )
    }
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    // Writing to a String cannot fail.
    let _ = writeln!(out, "[{title}]");
}

fn line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {label:<28} {value}");
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
