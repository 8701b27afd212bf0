//! Compiled stage pipelines.
//!
//! Every pass starts from the uploaded cells: working values and row issues
//! are cleared and all transforms run again. Field and scalar values the
//! row already holds (from a previous pass or a caller edit) win over what
//! the transforms derive, and matching is redone against them.
//!
//! A transform that fails on a row (error or panic) marks its outputs as
//! failed for that row only. Stages reading a failed value are skipped and
//! the lookup fields or scalars depending on it end up invalid with a note.
//! A failure nothing downstream reads is recorded as a blocking issue, so
//! the row is still invalid.
//!
//! Stage inputs are resolved case-insensitively at compile time and stored
//! with the spelling of the column or output they read.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use payroll_match::match_field;
use payroll_model::{
    FieldOutcome, RawRow, ReferenceData, Row, RowIssue, ScalarOutcome, redact_value,
};
use payroll_output::ColumnKind;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::catalog::IntegrationConfig;
use crate::error::{ConfigError, Result};
use crate::registry::{StageRegistry, TransformFn};
use crate::stage::{MatchStage, StageConfig, TransformStage};

/// Rows logged at debug level after a pass.
const DEBUG_ROWS: usize = 5;

enum CompiledStage {
    Transform {
        stage: TransformStage,
        function: TransformFn,
        /// No later stage or scalar reads any output.
        blocking: bool,
    },
    Match(MatchStage),
}

/// A validated, ready-to-run stage list for one integration.
pub struct Pipeline {
    integration: String,
    stages: Vec<CompiledStage>,
    fields: BTreeSet<String>,
    scalars: Vec<String>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("integration", &self.integration)
            .field("stages", &self.stages.len())
            .field("scalars", &self.scalars)
            .finish()
    }
}

fn normalized(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Names available to later stages: normalized name → spelling to read.
struct Produced {
    names: BTreeMap<String, String>,
    check: bool,
}

impl Produced {
    fn resolve(&self, input: &str) -> Option<String> {
        match self.names.get(&normalized(input)) {
            Some(spelling) => Some(spelling.clone()),
            None if self.check => None,
            None => Some(input.to_string()),
        }
    }

    fn add(&mut self, name: &str) {
        self.names.insert(normalized(name), name.to_string());
    }
}

/// Flag transforms whose failure no later stage or scalar would surface.
fn mark_blocking(stages: &mut [CompiledStage], scalars: &[String]) {
    let mut read_later: BTreeSet<String> = scalars.iter().cloned().collect();
    for compiled in stages.iter_mut().rev() {
        match compiled {
            CompiledStage::Transform {
                stage, blocking, ..
            } => {
                *blocking = !stage.outputs.iter().any(|output| read_later.contains(output));
                read_later.extend(stage.inputs.iter().cloned());
            }
            CompiledStage::Match(stage) => {
                read_later.insert(stage.input.clone());
            }
        }
    }
}

impl Pipeline {
    /// Check `config` against `registry` and resolve every transform.
    ///
    /// Fails on unknown functions, wrong arity, stages reading values that
    /// no earlier stage or declared column provides, fields matched twice,
    /// and scalars or output columns without a source.
    pub fn compile(config: &IntegrationConfig, registry: &StageRegistry) -> Result<Self> {
        let integration = config.integration();
        let mut produced = Produced {
            names: BTreeMap::new(),
            check: false,
        };
        for column in config.input.known_columns() {
            produced.add(column);
        }
        produced.check = !produced.names.is_empty();
        let mut outputs: BTreeSet<&str> = BTreeSet::new();
        let mut fields: BTreeSet<String> = BTreeSet::new();
        let mut stages = Vec::with_capacity(config.stages.len());

        for (position, stage) in config.stages.iter().enumerate() {
            let number = position + 1;
            let unknown = |input: &str| ConfigError::UnknownInput {
                stage: number,
                input: input.to_string(),
                integration: integration.clone(),
            };

            match stage {
                StageConfig::Transform(transform) => {
                    let inputs = transform
                        .inputs
                        .iter()
                        .map(|input| produced.resolve(input).ok_or_else(|| unknown(input)))
                        .collect::<Result<Vec<_>>>()?;
                    let entry = registry.get(&transform.function).ok_or_else(|| {
                        ConfigError::UnknownStage {
                            function: transform.function.clone(),
                            integration: integration.clone(),
                        }
                    })?;
                    if let Some(message) = entry.arity.check(transform) {
                        return Err(ConfigError::InvalidStage {
                            stage: number,
                            function: transform.function.clone(),
                            integration,
                            message,
                        });
                    }
                    for output in &transform.outputs {
                        produced.add(output);
                        outputs.insert(output.as_str());
                    }
                    stages.push(CompiledStage::Transform {
                        stage: TransformStage {
                            inputs,
                            ..transform.clone()
                        },
                        function: entry.function.clone(),
                        blocking: false,
                    });
                }
                StageConfig::Match(matcher) => {
                    let input = produced
                        .resolve(&matcher.input)
                        .ok_or_else(|| unknown(&matcher.input))?;
                    if !fields.insert(matcher.field.clone()) {
                        return Err(ConfigError::DuplicateField {
                            field: matcher.field.clone(),
                            integration,
                        });
                    }
                    stages.push(CompiledStage::Match(MatchStage {
                        input,
                        ..matcher.clone()
                    }));
                }
            }
        }

        // Scalars are keyed on the row by the exact output name.
        for rule in &config.scalars {
            if !outputs.contains(rule.name.as_str()) {
                return Err(ConfigError::UnknownScalar {
                    name: rule.name.clone(),
                    integration,
                });
            }
        }
        let scalar_names: BTreeSet<&str> =
            config.scalars.iter().map(|rule| rule.name.as_str()).collect();
        for column in &config.output.columns {
            let known = match column.kind {
                ColumnKind::Field => fields.contains(&column.name),
                ColumnKind::Scalar => scalar_names.contains(column.name.as_str()),
            };
            if !known {
                return Err(ConfigError::UnknownOutputSource {
                    column: column.header.clone(),
                    name: column.name.clone(),
                    integration,
                });
            }
        }

        let scalars: Vec<String> = config.scalars.iter().map(|rule| rule.name.clone()).collect();
        mark_blocking(&mut stages, &scalars);
        debug!(
            integration = %integration,
            stages = stages.len(),
            "compiled pipeline"
        );
        Ok(Self {
            integration,
            stages,
            fields,
            scalars,
        })
    }

    pub fn integration(&self) -> &str {
        &self.integration
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run the pipeline over freshly uploaded rows.
    pub fn run_raw(&self, rows: Vec<RawRow>, reference: &ReferenceData) -> Vec<Row> {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Row::from_raw(index, raw))
            .collect();
        self.run(rows, reference)
    }

    /// Run the pipeline over rows, in parallel. Output order equals input
    /// order.
    pub fn run(&self, rows: Vec<Row>, reference: &ReferenceData) -> Vec<Row> {
        let started = Instant::now();
        let rows: Vec<Row> = rows
            .into_par_iter()
            .map(|row| self.run_row(row, reference))
            .collect();

        for row in rows.iter().take(DEBUG_ROWS) {
            debug!(
                row = row.index,
                values = %redact_value(&format!("{:?}", row.values)),
                fields = row.fields.len(),
                issues = row.issues.len(),
                "transformed row"
            );
        }
        let failed_rows = rows.iter().filter(|row| !row.issues.is_empty()).count();
        info!(
            integration = %self.integration,
            rows = rows.len(),
            failed_rows,
            duration_ms = started.elapsed().as_millis(),
            "pipeline pass complete"
        );
        rows
    }

    fn run_row(&self, mut row: Row, reference: &ReferenceData) -> Row {
        row.values.clear();
        row.issues.clear();
        row.fields.retain(|name, _| self.fields.contains(name));
        for scalar in row.scalars.values_mut() {
            scalar.valid = false;
            scalar.note = None;
        }
        // Output name → note explaining why it could not be derived.
        let mut failed: BTreeMap<String, String> = BTreeMap::new();

        for stage in &self.stages {
            match stage {
                CompiledStage::Transform {
                    stage,
                    function,
                    blocking,
                } => apply_transform(stage, function, *blocking, &mut row, &mut failed),
                CompiledStage::Match(stage) => apply_match(stage, &mut row, &failed, reference),
            }
        }

        for name in &self.scalars {
            let Some(note) = failed.get(name) else {
                continue;
            };
            let held = row
                .scalar(name)
                .is_some_and(|current| !current.value.trim().is_empty());
            if !held {
                row.scalars
                    .insert(name.clone(), ScalarOutcome::failed(note.clone()));
            }
        }
        row
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn apply_transform(
    stage: &TransformStage,
    function: &TransformFn,
    blocking: bool,
    row: &mut Row,
    failed: &mut BTreeMap<String, String>,
) {
    let upstream = stage
        .inputs
        .iter()
        .find_map(|input| failed.get(input).map(|note| (input, note)));
    let error = match upstream {
        Some((input, note)) => Some(format!("input '{input}' unavailable ({note})")),
        None => match panic::catch_unwind(AssertUnwindSafe(|| function(stage, row))) {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(payload) => Some(format!("panicked: {}", panic_message(payload.as_ref()))),
        },
    };
    let Some(message) = error else {
        return;
    };

    warn!(
        row = row.index,
        stage = %stage.function,
        error = %message,
        blocking,
        "transform failed on row"
    );
    for output in &stage.outputs {
        row.values.remove(output);
        failed.insert(output.clone(), format!("{}: {message}", stage.function));
    }
    row.issues.push(RowIssue {
        stage: stage.function.clone(),
        message,
        outputs: stage.outputs.clone(),
        blocking,
    });
}

fn apply_match(
    stage: &MatchStage,
    row: &mut Row,
    failed: &BTreeMap<String, String>,
    reference: &ReferenceData,
) {
    let records = reference.set(stage.domain);
    let held = row
        .field(&stage.field)
        .map(|outcome| outcome.value.clone())
        .filter(|value| !value.trim().is_empty());

    let outcome = match held {
        Some(value) => match_field(&value, records, stage.policy),
        None => match failed.get(&stage.input) {
            Some(note) => FieldOutcome::failed("", note.clone()),
            None => {
                let raw = row.value(&stage.input).unwrap_or("").to_string();
                match_field(&raw, records, stage.policy)
            }
        },
    };
    row.fields.insert(stage.field.clone(), outcome);
}
