//! Built-in transforms.
//!
//! | name | inputs | outputs | params |
//! |------|--------|---------|--------|
//! | `copy` | 1 | 1 | |
//! | `title_case` | 1 | 1 | |
//! | `join` | 1+ | 1 | `separator` (default `" "`) |
//! | `split_name` | 1 | 2 (first, last) | |
//! | `constant` | 0 | 1 | `value` |
//! | `coalesce` | 1+ | 1 | `default` |
//! | `currency` | 1 | 1 | |
//! | `scalar` | 1 | 1 (scalar name) | |

use payroll_model::{Row, ScalarOutcome, normalize_amount, parse_amount};

use crate::error::StageError;
use crate::registry::{Arity, StageRegistry};
use crate::stage::TransformStage;

pub(crate) fn register(registry: &mut StageRegistry) {
    registry
        .register("copy", Arity::exact(1, 1), copy)
        .register("title_case", Arity::exact(1, 1), title_case)
        .register("join", Arity::at_least(1, 1), join)
        .register("split_name", Arity::exact(1, 2), split_name)
        .register("constant", Arity::exact(0, 1), constant)
        .register("coalesce", Arity::at_least(1, 1), coalesce)
        .register("currency", Arity::exact(1, 1), currency)
        .register("scalar", Arity::exact(1, 1), scalar);
}

fn copy(stage: &TransformStage, row: &mut Row) -> Result<(), StageError> {
    let value = stage.read(row, 0)?.trim().to_string();
    stage.write(row, 0, value)
}

/// Capitalize the first letter of every word ("o'neil" → "O'Neil").
pub fn to_title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}

fn title_case(stage: &TransformStage, row: &mut Row) -> Result<(), StageError> {
    let value = to_title_case(stage.read(row, 0)?.trim());
    stage.write(row, 0, value)
}

fn join(stage: &TransformStage, row: &mut Row) -> Result<(), StageError> {
    let separator = stage.param("separator").unwrap_or(" ");
    let value = stage
        .read_all(row)
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator);
    stage.write(row, 0, value)
}

/// Split "Last, First" or "First Middle Last" into (first, last).
pub fn split_full_name(value: &str) -> (String, String) {
    let value = value.trim();
    if let Some((last, first)) = value.split_once(',') {
        return (first.trim().to_string(), last.trim().to_string());
    }
    match value.rsplit_once(char::is_whitespace) {
        Some((first, last)) => (first.trim().to_string(), last.trim().to_string()),
        None => (value.to_string(), String::new()),
    }
}

fn split_name(stage: &TransformStage, row: &mut Row) -> Result<(), StageError> {
    let (first, last) = split_full_name(stage.read(row, 0)?);
    stage.write(row, 0, first)?;
    stage.write(row, 1, last)
}

fn constant(stage: &TransformStage, row: &mut Row) -> Result<(), StageError> {
    let value = stage.require_param("value")?.to_string();
    stage.write(row, 0, value)
}

fn coalesce(stage: &TransformStage, row: &mut Row) -> Result<(), StageError> {
    let value = stage
        .read_all(row)
        .into_iter()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .or_else(|| stage.param("default"))
        .unwrap_or_default()
        .to_string();
    stage.write(row, 0, value)
}

fn currency(stage: &TransformStage, row: &mut Row) -> Result<(), StageError> {
    let raw = stage.read(row, 0)?;
    let normalized = normalize_amount(raw);
    if !normalized.is_empty() && parse_amount(&normalized).is_none() {
        return Err(StageError::Failed(format!("'{}' is not an amount", raw.trim())));
    }
    stage.write(row, 0, normalized)
}

/// Write a scalar field unless the row already holds a value for it.
fn scalar(stage: &TransformStage, row: &mut Row) -> Result<(), StageError> {
    let value = stage.read(row, 0)?.to_string();
    let name = stage.output(0)?;
    let held = row
        .scalar(name)
        .is_some_and(|current| !current.value.trim().is_empty());
    if !held {
        row.scalars
            .insert(name.to_string(), ScalarOutcome::pending(value));
    }
    Ok(())
}
