use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to read reference file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reference data in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("reference service request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("reference service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("no reference data for company {company_id}")]
    NotFound { company_id: u64 },

    #[error("reference data for company {company_id} is empty")]
    Empty { company_id: u64 },

    #[error("reference fetch for company {company_id} exceeded {timeout_ms} ms")]
    Timeout { company_id: u64, timeout_ms: u128 },

    #[error("reference fetch for company {company_id} aborted")]
    Aborted { company_id: u64 },
}

impl ReferenceError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReferenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let busy = ReferenceError::Status {
            status: 503,
            message: "busy".to_string(),
        };
        assert!(busy.is_retryable());
        let denied = ReferenceError::Status {
            status: 401,
            message: "bad key".to_string(),
        };
        assert!(!denied.is_retryable());
        assert!(!ReferenceError::Empty { company_id: 7 }.is_retryable());
    }
}
