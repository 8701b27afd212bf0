//! Reconciled rows and batches.
//!
//! A [`Batch`] is the session state the caller holds between requests and
//! sends back for re-validation: `{ "rows": [...], "all_valid": bool }`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::outcome::{FieldOutcome, MatchStatus, ScalarOutcome};
use crate::raw::RawRow;

/// Diagnostic recorded when a stage failed on this row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    pub stage: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    /// Nothing a caller can edit replaces the failed outputs; the row
    /// stays invalid while the issue is present.
    #[serde(default)]
    pub blocking: bool,
}

/// One payroll line under reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Zero-based position in the upload; output order follows it.
    #[serde(default)]
    pub index: usize,
    /// The uploaded cells this row was derived from.
    #[serde(default)]
    pub source: RawRow,
    /// Working values derived by transform stages on the last pass.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldOutcome>,
    #[serde(default)]
    pub scalars: BTreeMap<String, ScalarOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<RowIssue>,
    #[serde(default)]
    pub valid: bool,
}

impl Row {
    pub fn from_raw(index: usize, source: RawRow) -> Self {
        Self {
            index,
            source,
            ..Self::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldOutcome> {
        self.fields.get(name)
    }

    pub fn scalar(&self, name: &str) -> Option<&ScalarOutcome> {
        self.scalars.get(name)
    }

    /// Overwrite the selected value of a lookup field. Match state is
    /// cleared until the next pass recomputes it.
    pub fn set_field_value(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .insert(name.to_string(), FieldOutcome::unmatched(value));
        self.valid = false;
    }

    pub fn set_scalar_value(&mut self, name: &str, value: impl Into<String>) {
        self.scalars
            .insert(name.to_string(), ScalarOutcome::pending(value));
        self.valid = false;
    }

    /// Look up a working value, falling back to the uploaded cell.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .or_else(|| self.source.get(name))
    }
}

/// Counts describing how far a batch is from being exportable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub valid_rows: usize,
    pub exact_fields: usize,
    pub ambiguous_fields: usize,
    pub unmatched_fields: usize,
    pub invalid_scalars: usize,
}

impl BatchSummary {
    pub fn invalid_rows(&self) -> usize {
        self.rows - self.valid_rows
    }
}

/// Ordered rows plus the derived `all_valid` flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub rows: Vec<Row>,
    #[serde(default)]
    pub all_valid: bool,
}

impl Batch {
    /// Build a batch, deriving `all_valid` from the rows' flags.
    pub fn new(rows: Vec<Row>) -> Self {
        let all_valid = rows.iter().all(|row| row.valid);
        Self { rows, all_valid }
    }

    /// `all_valid` cross-checked against every row, for callers that got
    /// the batch back from a client.
    pub fn is_all_valid(&self) -> bool {
        self.all_valid && self.rows.iter().all(|row| row.valid)
    }

    pub fn invalid_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| !row.valid)
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            rows: self.rows.len(),
            ..BatchSummary::default()
        };
        for row in &self.rows {
            if row.valid {
                summary.valid_rows += 1;
            }
            for outcome in row.fields.values() {
                match outcome.status() {
                    MatchStatus::Exact => summary.exact_fields += 1,
                    MatchStatus::Ambiguous => summary.ambiguous_fields += 1,
                    MatchStatus::Unmatched => summary.unmatched_fields += 1,
                }
            }
            summary.invalid_scalars += row.scalars.values().filter(|s| !s.valid).count();
        }
        summary
    }
}
