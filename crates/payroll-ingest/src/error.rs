use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read upload {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("upload contains no rows")]
    Empty,

    #[error("could not find header row starting with '{anchor}'")]
    HeaderNotFound { anchor: String },

    #[error("upload is missing expected columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },
}

pub type Result<T> = std::result::Result<T, IngestError>;
