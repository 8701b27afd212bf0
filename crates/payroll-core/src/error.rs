use payroll_ingest::IngestError;
use payroll_model::ModelError;
use payroll_output::OutputError;
use payroll_pipeline::ConfigError;
use payroll_reference::ReferenceError;
use thiserror::Error;

/// Whole-call failures. Per-row problems are reported on the rows.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("reference data error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("upload error: {0}")]
    Ingest(#[from] IngestError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("edit targets row {row} but the batch has {rows} rows")]
    UnknownRow { row: usize, rows: usize },

    #[error("edit of row {row} names '{field}', which is not a field or scalar of {integration}")]
    UnknownField {
        row: usize,
        field: String,
        integration: String,
    },
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
