use std::cmp::Ordering;

use payroll_model::{FieldEdit, compare_keys, normalize_amount, parse_amount};
use proptest::prelude::*;

proptest! {
    #[test]
    fn numeric_keys_order_as_numbers(a in 0u64..100_000, b in 0u64..100_000) {
        prop_assert_eq!(compare_keys(&a.to_string(), &b.to_string()), a.cmp(&b));
    }

    #[test]
    fn key_order_is_antisymmetric(a in "[0-9A-Za-z]{0,5}", b in "[0-9A-Za-z]{0,5}") {
        prop_assert_eq!(compare_keys(&a, &b), compare_keys(&b, &a).reverse());
        prop_assert_eq!(compare_keys(&a, &a), Ordering::Equal);
    }

    #[test]
    fn formatted_amounts_parse(cents in 0u64..1_000_000_000) {
        let whole = cents / 100;
        let grouped = whole
            .to_string()
            .as_bytes()
            .rchunks(3)
            .rev()
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        let formatted = format!("${grouped}.{:02}", cents % 100);
        let expected = format!("{whole}.{:02}", cents % 100);
        prop_assert_eq!(normalize_amount(&formatted), expected.clone());
        let parsed = parse_amount(&formatted).expect("amount");
        prop_assert!((parsed - expected.parse::<f64>().expect("float")).abs() < 1e-9);
    }

    #[test]
    fn edits_parse_from_their_text_form(
        row in 1usize..500,
        field in "[a-z_]{1,12}",
        value in "[A-Za-z0-9 .]{0,10}",
    ) {
        let edit: FieldEdit = format!("{row}:{field}={value}").parse().expect("edit");
        prop_assert_eq!(edit, FieldEdit::new(row, field, value.trim()));
    }
}
