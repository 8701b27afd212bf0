use std::sync::Arc;
use std::time::{Duration, Instant};

use payroll_ingest::read_upload;
use payroll_model::{Batch, EditTarget, FieldEdit, IntegrationKey, RawRow, Row};
use payroll_pipeline::{IntegrationCatalog, IntegrationConfig, Pipeline, StageRegistry};
use payroll_reference::{DEFAULT_FETCH_TIMEOUT, ReferenceGateway, fetch_with_deadline};
use tracing::{info, info_span};

use crate::error::{ReconcileError, Result};

fn edit_target(config: &IntegrationConfig, edit: &FieldEdit) -> Result<EditTarget> {
    if config.scalars.iter().any(|rule| rule.name == edit.field) {
        Ok(EditTarget::Scalar)
    } else if config.match_fields().contains(&edit.field) {
        Ok(EditTarget::Field)
    } else {
        Err(ReconcileError::UnknownField {
            row: edit.row,
            field: edit.field.clone(),
            integration: config.integration(),
        })
    }
}

/// Apply caller edits to rows, addressed by 1-based position.
///
/// Edits may only name lookup fields and scalars of `config`. Every edit is
/// checked before any row changes.
pub fn apply_edits(
    rows: &mut [Row],
    edits: &[FieldEdit],
    config: &IntegrationConfig,
) -> Result<()> {
    let mut targets = Vec::with_capacity(edits.len());
    for edit in edits {
        if edit.row == 0 || edit.row > rows.len() {
            return Err(ReconcileError::UnknownRow {
                row: edit.row,
                rows: rows.len(),
            });
        }
        targets.push(edit_target(config, edit)?);
    }
    for (edit, target) in edits.iter().zip(targets) {
        edit.apply(&mut rows[edit.row - 1], target);
    }
    Ok(())
}

/// Re-validate `batch` with the integration's rules and encode it.
///
/// The caller-held validity flags are recomputed first, so values changed
/// since the last reconciliation cannot reach the output unchecked. No
/// reference data is fetched.
pub fn encode_batch(config: &IntegrationConfig, batch: &Batch) -> Result<Vec<u8>> {
    let checked = config.validator().validate_batch(batch.rows.clone());
    Ok(payroll_output::encode(&checked, &config.output)?)
}

/// Runs reconciliation passes for the integrations of a catalog.
pub struct Reconciler {
    catalog: IntegrationCatalog,
    registry: StageRegistry,
    gateway: Arc<dyn ReferenceGateway>,
    fetch_timeout: Duration,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("integrations", &self.catalog.len())
            .field("registry", &self.registry)
            .field("gateway", &self.gateway.describe())
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

impl Reconciler {
    pub fn new(
        catalog: IntegrationCatalog,
        registry: StageRegistry,
        gateway: Arc<dyn ReferenceGateway>,
    ) -> Self {
        Self {
            catalog,
            registry,
            gateway,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Built-in catalog and transforms.
    pub fn with_builtins(gateway: Arc<dyn ReferenceGateway>) -> Result<Self> {
        Ok(Self::new(
            IntegrationCatalog::builtin()?,
            StageRegistry::with_builtins(),
            gateway,
        ))
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &IntegrationCatalog {
        &self.catalog
    }

    pub fn integration(&self, key: &IntegrationKey) -> Result<&IntegrationConfig> {
        Ok(self.catalog.get(key)?)
    }

    /// Resolve and compile the integration before anything else happens.
    fn prepare(&self, key: &IntegrationKey) -> Result<(&IntegrationConfig, Pipeline)> {
        let config = self.catalog.get(key)?;
        let pipeline = config.compile(&self.registry)?;
        Ok((config, pipeline))
    }

    fn pass(
        &self,
        key: &IntegrationKey,
        rows: Vec<Row>,
        config: &IntegrationConfig,
        pipeline: &Pipeline,
    ) -> Result<Batch> {
        let started = Instant::now();
        let reference = fetch_with_deadline(&self.gateway, key, self.fetch_timeout)?;
        let rows = pipeline.run(rows, &reference);
        let batch = config.validator().validate_batch(rows);
        let summary = batch.summary();
        info!(
            rows = summary.rows,
            invalid_rows = summary.invalid_rows(),
            ambiguous_fields = summary.ambiguous_fields,
            unmatched_fields = summary.unmatched_fields,
            all_valid = batch.all_valid,
            duration_ms = started.elapsed().as_millis(),
            "reconciliation pass complete"
        );
        Ok(batch)
    }

    fn first_pass(
        &self,
        key: &IntegrationKey,
        raw_rows: Vec<RawRow>,
        config: &IntegrationConfig,
        pipeline: &Pipeline,
    ) -> Result<Batch> {
        let rows = raw_rows
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Row::from_raw(index, raw))
            .collect();
        self.pass(key, rows, config, pipeline)
    }

    /// First pass over freshly uploaded rows.
    pub fn process_initial(&self, raw_rows: Vec<RawRow>, key: &IntegrationKey) -> Result<Batch> {
        let span = info_span!(
            "process_initial",
            company_id = key.company_id,
            integration = %key.integration(),
            rows = raw_rows.len()
        );
        let _guard = span.enter();

        let (config, pipeline) = self.prepare(key)?;
        self.first_pass(key, raw_rows, config, &pipeline)
    }

    /// Parse upload bytes with the integration's input options, then run
    /// the first pass.
    pub fn process_upload(&self, bytes: &[u8], key: &IntegrationKey) -> Result<Batch> {
        let span = info_span!(
            "process_upload",
            company_id = key.company_id,
            integration = %key.integration(),
            bytes = bytes.len()
        );
        let _guard = span.enter();

        let (config, pipeline) = self.prepare(key)?;
        let upload = read_upload(bytes, &config.input)?;
        info!(rows = upload.rows.len(), "upload parsed");
        self.first_pass(key, upload.rows, config, &pipeline)
    }

    /// Re-run the whole pipeline and validation over caller-held rows.
    ///
    /// Reference data is fetched again; values the rows hold are matched
    /// anew.
    pub fn reconcile(&self, rows: Vec<Row>, key: &IntegrationKey) -> Result<Batch> {
        let span = info_span!(
            "reconcile",
            company_id = key.company_id,
            integration = %key.integration(),
            rows = rows.len()
        );
        let _guard = span.enter();

        let (config, pipeline) = self.prepare(key)?;
        self.pass(key, rows, config, &pipeline)
    }

    /// Apply `edits` to `batch` and reconcile it.
    pub fn reconcile_with_edits(
        &self,
        batch: Batch,
        edits: &[FieldEdit],
        key: &IntegrationKey,
    ) -> Result<Batch> {
        let config = self.catalog.get(key)?;
        let mut rows = batch.into_rows();
        apply_edits(&mut rows, edits, config)?;
        self.reconcile(rows, key)
    }

    /// Encode a batch with the integration's output layout, once it
    /// re-validates as a whole. See [`encode_batch`].
    pub fn encode(&self, batch: &Batch, key: &IntegrationKey) -> Result<Vec<u8>> {
        encode_batch(self.catalog.get(key)?, batch)
    }
}
