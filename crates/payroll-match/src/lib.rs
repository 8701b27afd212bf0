//! Field matching for payroll reconciliation.
//!
//! Resolves a raw field value against the canonical records of one lookup
//! domain and classifies it as exact, ambiguous or unmatched.

#![deny(unsafe_code)]

pub mod matcher;
pub mod policy;

pub use matcher::{FieldMatcher, match_field, tokenize};
pub use policy::MatchPolicy;
