use payroll_model::{Batch, FieldOutcome, Row, ScalarOutcome, parse_amount};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::rule::ScalarRule;

/// Check one scalar of `row` against `rule`.
///
/// A blank scalar whose derivation failed on this pass (a row issue lists
/// it as an output) stays invalid until the caller supplies a value.
pub fn check_scalar(rule: &ScalarRule, row: &Row) -> ScalarOutcome {
    let current = row.scalar(&rule.name).cloned().unwrap_or_default();
    let value = current.value.trim();

    if value.is_empty() {
        if let Some(issue) = row
            .issues
            .iter()
            .find(|issue| issue.outputs.iter().any(|output| output == &rule.name))
        {
            return ScalarOutcome {
                value: current.value,
                valid: false,
                note: Some(format!("{}: {}", issue.stage, issue.message)),
            };
        }
        if rule.allows_blank(row) {
            return ScalarOutcome {
                value: current.value,
                valid: true,
                note: None,
            };
        }
        return ScalarOutcome {
            value: current.value,
            valid: false,
            note: Some("value is required".to_string()),
        };
    }

    let note = match parse_amount(value) {
        None => Some(format!("'{value}' is not a number")),
        Some(amount) if amount < 0.0 => Some(format!("'{value}' is negative")),
        Some(_) => None,
    };
    ScalarOutcome {
        value: current.value,
        valid: note.is_none(),
        note,
    }
}

fn field_is_valid(outcome: Option<&FieldOutcome>) -> bool {
    outcome.is_some_and(|outcome| outcome.valid && outcome.is_consistent())
}

/// Validates rows against the fields and scalar rules of one integration.
#[derive(Debug, Clone, Default)]
pub struct RowValidator {
    fields: Vec<String>,
    scalars: Vec<ScalarRule>,
}

impl RowValidator {
    /// `fields` are the lookup fields every row must carry.
    pub fn new(fields: Vec<String>, scalars: Vec<ScalarRule>) -> Self {
        Self { fields, scalars }
    }

    pub fn scalar_rules(&self) -> &[ScalarRule] {
        &self.scalars
    }

    fn rule_for(&self, name: &str) -> ScalarRule {
        self.scalars
            .iter()
            .find(|rule| rule.name == name)
            .cloned()
            .unwrap_or_else(|| ScalarRule::required(name))
    }

    /// Recompute scalar outcomes and the validity flag of `row`.
    pub fn validate(&self, row: &mut Row) -> bool {
        let mut names: Vec<String> = self.scalars.iter().map(|rule| rule.name.clone()).collect();
        names.extend(
            row.scalars
                .keys()
                .filter(|name| !self.scalars.iter().any(|rule| &rule.name == *name))
                .cloned(),
        );
        // Conditions read fields only, so every check sees the same row.
        let checked: Vec<(String, ScalarOutcome)> = names
            .into_iter()
            .map(|name| {
                let outcome = check_scalar(&self.rule_for(&name), row);
                (name, outcome)
            })
            .collect();
        row.scalars.extend(checked);

        let fields_valid = self
            .fields
            .iter()
            .all(|name| field_is_valid(row.field(name)))
            && row.fields.values().all(|outcome| field_is_valid(Some(outcome)));
        let scalars_valid = row.scalars.values().all(|scalar| scalar.valid);
        let unblocked = !row.issues.iter().any(|issue| issue.blocking);

        row.valid = fields_valid && scalars_valid && unblocked;
        if !row.valid {
            debug!(row = row.index, "row invalid");
        }
        row.valid
    }

    /// Validate every row and derive the batch flag. Row order is kept.
    pub fn validate_batch(&self, rows: Vec<Row>) -> Batch {
        let rows: Vec<Row> = rows
            .into_par_iter()
            .map(|mut row| {
                self.validate(&mut row);
                row
            })
            .collect();
        let batch = Batch::new(rows);
        info!(
            rows = batch.len(),
            invalid = batch.invalid_rows().count(),
            all_valid = batch.all_valid,
            "validated batch"
        );
        batch
    }
}

#[cfg(test)]
mod tests {
    use payroll_model::{CanonicalRecord, RawRow, RowIssue};

    use super::*;

    fn row_with(hours: &str, rate: &str, type_code: &str) -> Row {
        let mut row = Row::from_raw(0, RawRow::default());
        row.fields.insert(
            "employee_id".to_string(),
            FieldOutcome::exact("1001", CanonicalRecord::new("1001")),
        );
        row.fields.insert(
            "type_code".to_string(),
            FieldOutcome::exact(type_code, CanonicalRecord::new(type_code)),
        );
        row.scalars
            .insert("hours_or_amount".to_string(), ScalarOutcome::pending(hours));
        row.scalars
            .insert("temporary_rate".to_string(), ScalarOutcome::pending(rate));
        row
    }

    fn validator() -> RowValidator {
        RowValidator::new(
            vec!["employee_id".to_string()],
            vec![
                ScalarRule::required("hours_or_amount"),
                ScalarRule::optional("temporary_rate").required_when("type_code", ["TMP"]),
            ],
        )
    }

    #[test]
    fn currency_amounts_are_valid() {
        let mut row = row_with("$1,250.00", "", "REG");
        assert!(validator().validate(&mut row));
        assert!(row.scalar("temporary_rate").is_some_and(|s| s.valid));
    }

    #[test]
    fn negative_and_garbage_amounts_are_invalid() {
        let mut row = row_with("-3", "", "REG");
        assert!(!validator().validate(&mut row));
        assert_eq!(
            row.scalar("hours_or_amount").and_then(|s| s.note.as_deref()),
            Some("'-3' is negative")
        );

        let mut row = row_with("ten", "", "REG");
        assert!(!validator().validate(&mut row));
    }

    #[test]
    fn optional_rate_becomes_required_for_type_code() {
        let mut row = row_with("8", "", "TMP");
        assert!(!validator().validate(&mut row));
        assert_eq!(
            row.scalar("temporary_rate").and_then(|s| s.note.as_deref()),
            Some("value is required")
        );

        let mut row = row_with("8", "21.50", "TMP");
        assert!(validator().validate(&mut row));
    }

    #[test]
    fn missing_identity_field_is_invalid() {
        let mut row = row_with("8", "", "REG");
        row.fields.remove("employee_id");
        assert!(!validator().validate(&mut row));
    }

    #[test]
    fn tampered_valid_flag_is_rejected() {
        let mut row = row_with("8", "", "REG");
        row.fields.insert(
            "employee_id".to_string(),
            FieldOutcome {
                valid: true,
                ..FieldOutcome::unmatched("John")
            },
        );
        assert!(!validator().validate(&mut row));
    }

    #[test]
    fn failed_derivation_stays_invalid() {
        let mut row = row_with("8", "", "REG");
        row.scalars
            .insert("temporary_rate".to_string(), ScalarOutcome::failed("ignored"));
        row.issues.push(RowIssue {
            stage: "currency".to_string(),
            message: "malformed cell".to_string(),
            outputs: vec!["temporary_rate".to_string()],
            blocking: false,
        });
        let validator = validator();
        assert!(!validator.validate(&mut row));
        assert!(!validator.validate(&mut row));
        assert_eq!(
            row.scalar("temporary_rate").and_then(|s| s.note.as_deref()),
            Some("currency: malformed cell")
        );
    }

    #[test]
    fn blocking_issue_invalidates_an_otherwise_valid_row() {
        let mut row = row_with("8", "", "REG");
        row.issues.push(RowIssue {
            stage: "boom".to_string(),
            message: "malformed cell".to_string(),
            outputs: vec!["note".to_string()],
            blocking: true,
        });
        assert!(!validator().validate(&mut row));
        assert!(row.scalars.values().all(|scalar| scalar.valid));

        row.issues[0].blocking = false;
        assert!(validator().validate(&mut row));
    }

    #[test]
    fn missing_configured_scalar_counts_as_blank() {
        let mut row = row_with("8", "", "REG");
        row.scalars.remove("hours_or_amount");
        assert!(!validator().validate(&mut row));
        assert!(row.scalar("hours_or_amount").is_some());
    }
}
