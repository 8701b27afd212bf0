use std::io::Write;

use payroll_model::{Batch, Row, normalize_amount};
use tracing::info;

use crate::error::{OutputError, Result};
use crate::layout::{ColumnKind, OutputColumn, OutputLayout};

fn cell(row: &Row, column: &OutputColumn) -> Result<String> {
    let missing = || OutputError::MissingValue {
        row: row.index + 1,
        column: column.header.clone(),
    };
    match column.kind {
        ColumnKind::Field => row
            .field(&column.name)
            .and_then(|outcome| outcome.canonical_key())
            .map(str::to_string)
            .ok_or_else(missing),
        ColumnKind::Scalar => row
            .scalar(&column.name)
            .map(|scalar| normalize_amount(&scalar.value))
            .ok_or_else(missing),
    }
}

fn check_batch(batch: &Batch) -> Result<()> {
    if batch.is_all_valid() {
        return Ok(());
    }
    let rows = batch.invalid_rows().map(|row| row.index + 1).collect();
    Err(OutputError::NotAllValid { rows })
}

/// Write `batch` as CSV to `writer`.
///
/// Nothing is written unless the whole batch is valid and every cell
/// resolves.
pub fn write_csv<W: Write>(writer: W, batch: &Batch, layout: &OutputLayout) -> Result<()> {
    check_batch(batch)?;
    let records = batch
        .rows
        .iter()
        .map(|row| {
            layout
                .columns
                .iter()
                .map(|column| cell(row, column))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(layout.headers())?;
    for record in &records {
        csv.write_record(record)?;
    }
    csv.flush()?;
    info!(rows = records.len(), columns = layout.columns.len(), "encoded batch");
    Ok(())
}

/// Encode a fully valid batch to CSV bytes.
pub fn encode(batch: &Batch, layout: &OutputLayout) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, batch, layout)?;
    Ok(buffer)
}
