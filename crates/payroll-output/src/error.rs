use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("batch is not fully valid ({} invalid rows: {})", rows.len(), format_rows(rows))]
    NotAllValid { rows: Vec<usize> },

    #[error("row {row} has no value for output column '{column}'")]
    MissingValue { row: usize, column: String },

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

fn format_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, OutputError>;
