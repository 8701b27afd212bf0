use std::collections::BTreeMap;

use payroll_match::MatchPolicy;
use payroll_model::{ReferenceDomain, Row};
use serde::{Deserialize, Serialize};

use crate::error::StageError;

/// One pipeline stage, tagged by `kind` in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageConfig {
    Transform(TransformStage),
    Match(MatchStage),
}

impl StageConfig {
    /// Registry name for transforms, `match:<field>` for matches.
    pub fn label(&self) -> String {
        match self {
            Self::Transform(stage) => stage.function.clone(),
            Self::Match(stage) => format!("match:{}", stage.field),
        }
    }

    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Self::Transform(stage) => stage.inputs.iter().map(String::as_str).collect(),
            Self::Match(stage) => vec![stage.input.as_str()],
        }
    }
}

/// A registered function deriving working values from earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformStage {
    pub function: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl TransformStage {
    pub fn new<I, O, S, T>(function: impl Into<String>, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            function: function.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn require_param(&self, name: &str) -> Result<&str, StageError> {
        self.param(name)
            .ok_or_else(|| StageError::MissingParam(name.to_string()))
    }

    /// Name of the output at `position`. Arity is checked at compile time.
    pub fn output(&self, position: usize) -> Result<&str, StageError> {
        self.outputs
            .get(position)
            .map(String::as_str)
            .ok_or_else(|| StageError::Failed(format!("no output #{}", position + 1)))
    }

    /// Value of the input at `position`; the row must carry it.
    pub fn read<'r>(&self, row: &'r Row, position: usize) -> Result<&'r str, StageError> {
        let name = self
            .inputs
            .get(position)
            .ok_or_else(|| StageError::Failed(format!("no input #{}", position + 1)))?;
        row.value(name)
            .ok_or_else(|| StageError::MissingInput(name.clone()))
    }

    /// Every input value, blank for inputs the row does not carry.
    pub fn read_all<'r>(&self, row: &'r Row) -> Vec<&'r str> {
        self.inputs
            .iter()
            .map(|name| row.value(name).unwrap_or(""))
            .collect()
    }

    pub fn write(&self, row: &mut Row, position: usize, value: String) -> Result<(), StageError> {
        let name = self.output(position)?;
        row.values.insert(name.to_string(), value);
        Ok(())
    }
}

/// Resolve one lookup field against a reference domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStage {
    /// Field written on the row.
    pub field: String,
    /// Working value or column the raw value is read from.
    pub input: String,
    pub domain: ReferenceDomain,
    #[serde(default)]
    pub policy: MatchPolicy,
}

impl MatchStage {
    pub fn new(
        field: impl Into<String>,
        input: impl Into<String>,
        domain: ReferenceDomain,
        policy: MatchPolicy,
    ) -> Self {
        Self {
            field: field.into(),
            input: input.into(),
            domain,
            policy,
        }
    }
}
