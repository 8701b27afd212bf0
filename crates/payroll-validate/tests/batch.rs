//! Batch-level properties: AND over rows, preserved order, determinism.

use payroll_model::{CanonicalRecord, FieldOutcome, RawRow, Row, ScalarOutcome};
use payroll_validate::{RowValidator, ScalarRule};
use proptest::prelude::*;

fn make_row(index: usize, matched: bool, hours: &str) -> Row {
    let mut row = Row::from_raw(index, RawRow::default());
    let outcome = if matched {
        FieldOutcome::exact("1001", CanonicalRecord::employee("1001", "John", "Smith"))
    } else {
        FieldOutcome::unmatched("")
    };
    row.fields.insert("employee_id".to_string(), outcome);
    row.scalars
        .insert("hours_or_amount".to_string(), ScalarOutcome::pending(hours));
    row
}

fn validator() -> RowValidator {
    RowValidator::new(
        vec!["employee_id".to_string()],
        vec![ScalarRule::required("hours_or_amount")],
    )
}

proptest! {
    #[test]
    fn all_valid_is_and_over_rows(
        specs in prop::collection::vec((any::<bool>(), prop_oneof![
            Just("8"), Just("$1,200.50"), Just(""), Just("-1"), Just("abc"),
        ]), 0..40),
    ) {
        let rows: Vec<Row> = specs
            .iter()
            .enumerate()
            .map(|(idx, (matched, hours))| make_row(idx, *matched, hours))
            .collect();
        let batch = validator().validate_batch(rows);

        let indexes: Vec<usize> = batch.rows.iter().map(|row| row.index).collect();
        prop_assert_eq!(indexes, (0..specs.len()).collect::<Vec<_>>());

        let expected = specs
            .iter()
            .all(|(matched, hours)| *matched && !hours.is_empty() && !hours.starts_with('-') && *hours != "abc");
        prop_assert_eq!(batch.all_valid, expected);
        prop_assert_eq!(batch.is_all_valid(), expected);

        let again = validator().validate_batch(batch.rows.clone());
        prop_assert_eq!(again, batch);
    }
}

#[test]
fn empty_batch_is_trivially_valid() {
    let batch = validator().validate_batch(Vec::new());
    assert!(batch.all_valid);
    assert!(batch.is_empty());
}
