//! Reference data gateways.
//!
//! The reconciler never talks to a directory service directly. It receives
//! a [`ReferenceGateway`] and asks it for the [`ReferenceData`] of one
//! company, bounded by a deadline (see [`fetch_with_deadline`]).
//!
//! [`ReferenceData`]: payroll_model::ReferenceData

#![deny(unsafe_code)]

pub mod error;
pub mod fetch;
pub mod file;
pub mod gateway;
pub mod http;

pub use error::{ReferenceError, Result};
pub use fetch::{DEFAULT_FETCH_TIMEOUT, fetch_with_deadline};
pub use file::FileGateway;
pub use gateway::{InMemoryGateway, ReferenceGateway};
pub use http::{API_KEY_HEADER, HttpGateway, HttpGatewayConfig};
