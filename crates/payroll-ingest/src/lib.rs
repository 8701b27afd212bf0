//! Payroll upload ingestion.
//!
//! Provider exports are not clean CSV: they start with report preamble lines
//! (`Department:,Aquatics`) and repeat header blocks. The reader locates the
//! header by a fuzzy anchor, captures preamble values and returns one
//! [`RawRow`](payroll_model::RawRow) per data line.

#![deny(unsafe_code)]

pub mod error;
pub mod options;
pub mod upload;

pub use error::{IngestError, Result};
pub use options::{DEFAULT_ANCHOR_THRESHOLD, IngestOptions};
pub use upload::{Upload, read_upload, read_upload_path};
