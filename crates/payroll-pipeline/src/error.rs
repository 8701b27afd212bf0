use std::path::PathBuf;

use thiserror::Error;

/// Whole-configuration failures, raised before any row is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read integration catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid integration catalog {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported integration {integration}")]
    UnsupportedIntegration { integration: String },

    #[error("integration {integration} is defined more than once")]
    DuplicateIntegration { integration: String },

    #[error("unknown stage function '{function}' in integration {integration}")]
    UnknownStage {
        function: String,
        integration: String,
    },

    #[error("stage {stage} of integration {integration} reads '{input}' before it is produced")]
    UnknownInput {
        stage: usize,
        input: String,
        integration: String,
    },

    #[error("field '{field}' is matched more than once in integration {integration}")]
    DuplicateField { field: String, integration: String },

    #[error("stage {stage} ('{function}') of integration {integration}: {message}")]
    InvalidStage {
        stage: usize,
        function: String,
        integration: String,
        message: String,
    },

    #[error("scalar '{name}' of integration {integration} is not produced by any stage")]
    UnknownScalar { name: String, integration: String },

    #[error("output column '{column}' of integration {integration} has no source '{name}'")]
    UnknownOutputSource {
        column: String,
        name: String,
        integration: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Failure of one transform on one row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("missing input '{0}'")]
    MissingInput(String),

    #[error("missing parameter '{0}'")]
    MissingParam(String),

    #[error("{0}")]
    Failed(String),
}
