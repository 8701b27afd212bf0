use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;
use payroll_model::RawRow;
use rapidfuzz::distance::jaro_winkler;
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::options::IngestOptions;

/// A parsed upload.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    /// Preamble label → value, for labels that were found.
    pub preamble: BTreeMap<String, String>,
    /// Zero-based index of the header among non-blank lines.
    pub header_index: usize,
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Lowercased label without the trailing colon report exports add.
fn normalize_label(raw: &str) -> String {
    normalize_header(raw)
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

fn label_matches(cell: &str, label: &str, threshold: f64) -> bool {
    let cell = normalize_label(cell);
    if cell.is_empty() {
        return false;
    }
    let label = normalize_label(label);
    jaro_winkler::similarity(cell.chars(), label.chars()) >= threshold
}

fn find_header(rows: &[Vec<String>], options: &IngestOptions) -> Result<usize> {
    let Some(anchor) = options.header_anchor.as_deref() else {
        return Ok(0);
    };
    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            row.first()
                .is_some_and(|cell| label_matches(cell, anchor, options.anchor_threshold))
        })
        .map(|(idx, _)| idx)
        .last()
        .ok_or_else(|| IngestError::HeaderNotFound {
            anchor: anchor.to_string(),
        })
}

fn collect_preamble(rows: &[Vec<String>], options: &IngestOptions) -> BTreeMap<String, String> {
    let mut preamble = BTreeMap::new();
    for label in &options.preamble {
        let value = rows.iter().find_map(|row| {
            let first = row.first()?;
            if !label_matches(first, label, options.anchor_threshold) {
                return None;
            }
            Some(row.get(1).map(|v| normalize_cell(v)).unwrap_or_default())
        });
        if let Some(value) = value {
            preamble.insert(label.clone(), value);
        }
    }
    preamble
}

fn missing_columns(headers: &[String], expected: &[String]) -> Vec<String> {
    expected
        .iter()
        .filter(|column| {
            let wanted = normalize_header(column);
            !headers.iter().any(|h| h.eq_ignore_ascii_case(&wanted))
        })
        .cloned()
        .collect()
}

/// Parse upload bytes into raw rows.
///
/// Blank lines are dropped, short lines are padded with empty cells and
/// extra cells beyond the header are ignored.
pub fn read_upload(bytes: &[u8], options: &IngestOptions) -> Result<Upload> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    if raw_rows.is_empty() {
        return Err(IngestError::Empty);
    }

    let header_index = find_header(&raw_rows, options)?;
    let preamble = collect_preamble(&raw_rows[..header_index], options);
    let headers: Vec<String> = raw_rows[header_index]
        .iter()
        .map(|value| normalize_header(value))
        .collect();

    let missing = missing_columns(&headers, &options.columns);
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns { columns: missing });
    }

    let extra: Vec<(&String, &String)> = preamble
        .iter()
        .filter(|(label, _)| !headers.iter().any(|h| h.eq_ignore_ascii_case(label)))
        .collect();

    let mut rows = Vec::with_capacity(raw_rows.len() - header_index - 1);
    for record in raw_rows.iter().skip(header_index + 1) {
        let cells = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let value = record.get(idx).cloned().unwrap_or_default();
                (header.clone(), value)
            })
            .chain(
                extra
                    .iter()
                    .map(|(label, value)| ((*label).clone(), (*value).clone())),
            );
        rows.push(RawRow::new(cells));
    }

    debug!(
        header_index,
        columns = headers.len(),
        preamble = preamble.len(),
        "located header"
    );
    info!(rows = rows.len(), "parsed upload");

    Ok(Upload {
        headers,
        rows,
        preamble,
        header_index,
    })
}

pub fn read_upload_path(path: &Path, options: &IngestOptions) -> Result<Upload> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_upload(&bytes, options)
}
