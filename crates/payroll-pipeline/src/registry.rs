//! Named transform functions available to stage configurations.
//!
//! The registry is built by the caller and handed to the pipeline, so tests
//! and integrations can add or replace functions without global state.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use payroll_model::Row;

use crate::builtins;
use crate::error::StageError;
use crate::stage::TransformStage;

/// A transform: reads inputs of `stage` from the row, writes its outputs.
pub type TransformFn = Arc<dyn Fn(&TransformStage, &mut Row) -> Result<(), StageError> + Send + Sync>;

/// Accepted number of inputs and outputs for a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min_inputs: usize,
    pub max_inputs: Option<usize>,
    pub outputs: usize,
}

impl Arity {
    pub const fn exact(inputs: usize, outputs: usize) -> Self {
        Self {
            min_inputs: inputs,
            max_inputs: Some(inputs),
            outputs,
        }
    }

    pub const fn at_least(inputs: usize, outputs: usize) -> Self {
        Self {
            min_inputs: inputs,
            max_inputs: None,
            outputs,
        }
    }

    /// Describe why `stage` does not fit, if it does not.
    pub fn check(&self, stage: &TransformStage) -> Option<String> {
        let inputs = stage.inputs.len();
        if inputs < self.min_inputs || self.max_inputs.is_some_and(|max| inputs > max) {
            let expected = match self.max_inputs {
                Some(max) if max == self.min_inputs => format!("{max}"),
                Some(max) => format!("{}..={max}", self.min_inputs),
                None => format!("at least {}", self.min_inputs),
            };
            return Some(format!("expected {expected} inputs, got {inputs}"));
        }
        if stage.outputs.len() != self.outputs {
            return Some(format!(
                "expected {} outputs, got {}",
                self.outputs,
                stage.outputs.len()
            ));
        }
        None
    }
}

#[derive(Clone)]
pub(crate) struct RegisteredTransform {
    pub(crate) arity: Arity,
    pub(crate) function: TransformFn,
}

#[derive(Clone, Default)]
pub struct StageRegistry {
    transforms: BTreeMap<String, RegisteredTransform>,
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry")
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StageRegistry {
    /// A registry without any functions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the built-in transforms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        builtins::register(&mut registry);
        registry
    }

    /// Register `function` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, arity: Arity, function: F) -> &mut Self
    where
        F: Fn(&TransformStage, &mut Row) -> Result<(), StageError> + Send + Sync + 'static,
    {
        self.transforms.insert(
            name.into(),
            RegisteredTransform {
                arity,
                function: Arc::new(function),
            },
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    pub fn arity(&self, name: &str) -> Option<Arity> {
        self.transforms.get(name).map(|entry| entry.arity)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&RegisteredTransform> {
        self.transforms.get(name)
    }
}
