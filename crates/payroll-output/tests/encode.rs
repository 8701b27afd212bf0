//! Encoding valid and invalid batches.

use payroll_model::{Batch, CanonicalRecord, FieldOutcome, RawRow, Row, ScalarOutcome};
use payroll_output::{OutputError, OutputLayout, encode};

fn row(index: usize, employee: Option<&str>, hours: &str) -> Row {
    let mut row = Row::from_raw(index, RawRow::default());
    let employee = match employee {
        Some(key) => FieldOutcome::exact("Jane Doe", CanonicalRecord::employee(key, "Jane", "Doe")),
        None => FieldOutcome::unmatched(""),
    };
    row.fields.insert("employee_id".to_string(), employee);
    for (field, key) in [
        ("gross_to_net_code", "1"),
        ("type_code", "REG"),
        ("distributed_dept_code", "4287"),
    ] {
        row.fields.insert(
            field.to_string(),
            FieldOutcome::exact(key, CanonicalRecord::new(key)),
        );
    }
    for (name, value) in [("hours_or_amount", hours), ("temporary_rate", "")] {
        row.scalars.insert(
            name.to_string(),
            ScalarOutcome {
                value: value.to_string(),
                valid: true,
                note: None,
            },
        );
    }
    row.valid = row.fields.values().all(|f| f.valid);
    row
}

#[test]
fn valid_batch_encodes_canonical_keys() {
    let batch = Batch::new(vec![row(0, Some("1001"), "$1,250.00"), row(1, Some("1009"), "12")]);
    let bytes = encode(&batch, &OutputLayout::default()).expect("encode");
    let text = String::from_utf8(bytes).expect("utf8");
    insta::assert_snapshot!(text, @r"
    Employee ID,Gross to Net Code,Type Code,Hours or Amount,Temporary Rate,Distributed Dept Code
    1001,1,REG,1250.00,,4287
    1009,1,REG,12,,4287
    ");
}

#[test]
fn invalid_batch_is_rejected_with_row_numbers() {
    let batch = Batch::new(vec![row(0, Some("1001"), "8"), row(1, None, "8")]);
    let err = encode(&batch, &OutputLayout::default()).unwrap_err();
    match err {
        OutputError::NotAllValid { rows } => assert_eq!(rows, vec![2]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn forged_all_valid_flag_is_not_trusted() {
    let mut batch = Batch::new(vec![row(0, None, "8")]);
    batch.all_valid = true;
    assert!(matches!(
        encode(&batch, &OutputLayout::default()),
        Err(OutputError::NotAllValid { .. })
    ));
}

#[test]
fn missing_column_value_fails_before_writing() {
    let mut incomplete = row(0, Some("1001"), "8");
    incomplete.scalars.remove("temporary_rate");
    let batch = Batch::new(vec![incomplete]);
    let err = encode(&batch, &OutputLayout::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "row 1 has no value for output column 'Temporary Rate'"
    );
}
