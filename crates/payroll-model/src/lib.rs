//! Data model for payroll reconciliation.
//!
//! - **raw**: parsed upload rows, immutable once read
//! - **reference**: canonical employee and code records from the directory
//! - **outcome**: per-field match outcomes and scalar outcomes
//! - **row**: reconciled rows and batches exchanged with the caller
//! - **amount**: currency/hours parsing shared by transforms and validation
//! - **redact**: opt-in logging of personal data

#![deny(unsafe_code)]

pub mod amount;
pub mod edit;
pub mod error;
pub mod integration;
pub mod outcome;
pub mod raw;
pub mod redact;
pub mod reference;
pub mod row;

pub use amount::{normalize_amount, parse_amount};
pub use edit::{EditTarget, FieldEdit};
pub use error::{ModelError, Result};
pub use integration::IntegrationKey;
pub use outcome::{FieldOutcome, MatchStatus, ScalarOutcome};
pub use raw::{RawCell, RawRow};
pub use redact::{REDACTED_VALUE, redact_value};
pub use reference::{CanonicalRecord, CodeRecord, ReferenceData, ReferenceDomain, compare_keys};
pub use row::{Batch, BatchSummary, Row, RowIssue};
