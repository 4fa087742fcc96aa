use proptest::prelude::*;
use rider_settle_core::{
    controller::SettlementController,
    ledger::{DerivedFields, EditableField, RiderLedger},
    raw::RawRow,
};

fn amount() -> impl Strategy<Value = f64> {
    (0u32..50_000_000).prop_map(|cents| cents as f64 / 100.0)
}

fn raw_row() -> impl Strategy<Value = RawRow> {
    (
        "[A-Z]-[0-9]{1,4}",
        0u32..500,
        amount(),
        amount(),
        amount(),
        (amount(), amount(), amount(), amount()),
    )
        .prop_map(|(id, count, fee, extra, hourly, (emp, acc, emp_r, acc_r))| RawRow {
            id:                     Some(id),
            name:                   None,
            process_count:          Some(count as f64),
            delivery_fee:           Some(fee),
            additional_payment:     Some(extra),
            hourly_insurance:       Some(hourly),
            employment_insurance:   Some(emp),
            accident_insurance:     Some(acc),
            employment_retroactive: Some(emp_r),
            accident_retroactive:   Some(acc_r),
        })
}

fn field() -> impl Strategy<Value = EditableField> {
    prop::sample::select(EditableField::ALL.to_vec())
}

proptest! {
    #[test]
    fn recompute_is_idempotent(row in raw_row(), promo in amount(), rate in amount(), lease in amount()) {
        let mut ledger = RiderLedger::build(vec![row]).unwrap();
        ledger.set_input(0, EditableField::BranchPromotion, promo).unwrap();
        ledger.set_input(0, EditableField::CommissionRate, rate).unwrap();
        ledger.set_input(0, EditableField::LeaseFee, lease).unwrap();

        let mut record = ledger.get(0).unwrap().clone();
        let before = *record.derived();
        record.recompute();
        record.recompute();
        let after = *record.derived();

        prop_assert_eq!(before.total_delivery_fee.to_bits(), after.total_delivery_fee.to_bits());
        prop_assert_eq!(before.settlement_amount.to_bits(), after.settlement_amount.to_bits());
        prop_assert_eq!(before.withholding_tax.to_bits(), after.withholding_tax.to_bits());
        prop_assert_eq!(before.final_payment.to_bits(), after.final_payment.to_bits());
    }

    #[test]
    fn derived_fields_track_inputs_through_any_edit_sequence(
        rows in prop::collection::vec(raw_row(), 1..8),
        edits in prop::collection::vec((0usize..10, field(), "[0-9a-z,.-]{0,8}"), 0..20),
        bulk in prop::option::of("[0-9]{1,3}"),
    ) {
        let mut controller = SettlementController::new();
        let loaded = controller.load(rows).unwrap();

        for (index, field, value) in edits {
            let result = controller.edit_field(index, field, &value);
            prop_assert_eq!(result.is_err(), index >= loaded);
        }
        if let Some(rate) = bulk {
            prop_assert_eq!(controller.apply_bulk_commission(&rate), Some(loaded));
        }

        for r in controller.records() {
            prop_assert!(r.branch_promotion() >= 0.0);
            prop_assert!(r.commission_rate() >= 0.0);
            prop_assert!(r.lease_fee() >= 0.0);
            prop_assert_eq!(*r.derived(), DerivedFields::compute(r.source(), r.inputs()));
        }
    }
}
