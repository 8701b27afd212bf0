//! Output encoding.
//!
//! A batch is only encoded once every row is valid. Lookup columns carry the
//! resolved canonical key, scalar columns the normalized amount.

#![deny(unsafe_code)]

pub mod encode;
pub mod error;
pub mod layout;

pub use encode::{encode, write_csv};
pub use error::{OutputError, Result};
pub use layout::{ColumnKind, OutputColumn, OutputLayout};
