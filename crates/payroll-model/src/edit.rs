//! Caller edits applied between reconciliation passes.

use std::str::FromStr;

use crate::error::ModelError;
use crate::row::Row;

/// Which part of a row an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Field,
    Scalar,
}

/// A manual correction: set `field` on row `row` to `value`.
///
/// Textual form is `ROW:FIELD=VALUE` with a one-based row number, e.g.
/// `3:employee=1009`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub row: usize,
    pub field: String,
    pub value: String,
}

impl FieldEdit {
    pub fn new(row: usize, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            value: value.into(),
        }
    }

    /// Overwrite the named lookup field or scalar on `row`. Which one the
    /// name refers to is decided by the integration.
    pub fn apply(&self, row: &mut Row, target: EditTarget) {
        match target {
            EditTarget::Field => row.set_field_value(&self.field, self.value.clone()),
            EditTarget::Scalar => row.set_scalar_value(&self.field, self.value.clone()),
        }
    }
}

impl FromStr for FieldEdit {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, value) = s
            .split_once('=')
            .ok_or_else(|| ModelError::InvalidEdit(s.to_string()))?;
        let (row, field) = target
            .split_once(':')
            .ok_or_else(|| ModelError::InvalidEdit(s.to_string()))?;
        let row: usize = row
            .trim()
            .parse()
            .map_err(|_| ModelError::InvalidEditRow(s.to_string()))?;
        if row == 0 {
            return Err(ModelError::InvalidEditRow(s.to_string()));
        }
        let field = field.trim();
        if field.is_empty() {
            return Err(ModelError::InvalidEdit(s.to_string()));
        }
        Ok(Self::new(row, field, value.trim()))
    }
}
