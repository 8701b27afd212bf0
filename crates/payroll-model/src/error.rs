use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("integration {part} must not be empty")]
    EmptyIntegrationPart { part: &'static str },
    #[error("invalid edit '{0}': expected ROW:FIELD=VALUE")]
    InvalidEdit(String),
    #[error("invalid row number in edit '{0}'")]
    InvalidEditRow(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
