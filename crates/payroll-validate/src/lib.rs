//! Row and batch validation.
//!
//! Lookup fields are valid when their match outcome is; scalar fields
//! (hours, rates) are checked against [`ScalarRule`]s. A row is valid when
//! every field and scalar is, and a batch when every row is.

#![deny(unsafe_code)]

pub mod rule;
pub mod validator;

pub use rule::{FieldCondition, ScalarRule};
pub use validator::{RowValidator, check_scalar};
