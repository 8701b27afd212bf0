//! Reconciliation sessions.
//!
//! [`Reconciler`] ties the stage pipeline, the validator and a reference
//! gateway together. It holds no batch state: callers keep the returned
//! [`Batch`](payroll_model::Batch), apply edits and send it back through
//! [`Reconciler::reconcile`] until every row is valid, then encode it.

#![deny(unsafe_code)]

pub mod error;
pub mod session;

pub use error::{ReconcileError, Result};
pub use session::{Reconciler, apply_edits, encode_batch};
