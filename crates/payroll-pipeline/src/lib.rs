//! Stage pipeline for payroll reconciliation.
//!
//! An integration (type + provider) is described by an [`IntegrationConfig`]:
//! the shape of its upload, an ordered list of stages, scalar rules and the
//! output layout. Stages are either transforms, looked up by name in a
//! [`StageRegistry`], or matches that resolve one lookup field against the
//! reference data.
//!
//! Configurations are checked when compiled into a [`Pipeline`], so an
//! unknown stage or a stage reading a value nobody produced fails before
//! any row is touched.

#![deny(unsafe_code)]

pub mod builtins;
pub mod catalog;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod stage;

pub use catalog::{IntegrationCatalog, IntegrationConfig};
pub use error::{ConfigError, Result, StageError};
pub use pipeline::Pipeline;
pub use registry::{Arity, StageRegistry, TransformFn};
pub use stage::{MatchStage, StageConfig, TransformStage};
