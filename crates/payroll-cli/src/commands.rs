use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;
use payroll_cli::engine::{build_reconciler, load_catalog};
use payroll_cli::session::{SessionFile, read_upload_file};
use payroll_core::encode_batch;
use payroll_model::{Batch, IntegrationKey};
use tracing::{info, info_span};

use crate::cli::{EncodeArgs, ProcessArgs, ReconcileArgs};
use crate::summary::apply_table_style;

/// A batch written back to a session file.
pub struct SessionResult {
    pub batch: Batch,
    pub path: PathBuf,
}

pub fn run_process(args: &ProcessArgs, catalog: Option<&Path>) -> Result<SessionResult> {
    let key = IntegrationKey::new(args.company_id, &args.integration_type, &args.provider)?;
    let span = info_span!("process", upload = %args.upload.display());
    let _guard = span.enter();

    let reconciler = build_reconciler(&args.reference.settings(catalog.map(Path::to_path_buf))?)?;
    let bytes = read_upload_file(&args.upload, args.max_upload_bytes)?;
    let batch = reconciler
        .process_upload(&bytes, &key)
        .with_context(|| format!("process {}", args.upload.display()))?;

    let session = SessionFile::new(key, batch);
    session.save(&args.session)?;
    info!(session = %args.session.display(), "session written");
    Ok(SessionResult {
        batch: session.batch,
        path: args.session.clone(),
    })
}

pub fn run_reconcile(args: &ReconcileArgs, catalog: Option<&Path>) -> Result<SessionResult> {
    let span = info_span!("reconcile", session = %args.session.display());
    let _guard = span.enter();

    let session = SessionFile::load(&args.session)?;
    let reconciler = build_reconciler(&args.reference.settings(catalog.map(Path::to_path_buf))?)?;
    let batch = reconciler
        .reconcile_with_edits(session.batch, &args.edits, &session.key)
        .with_context(|| format!("reconcile {}", args.session.display()))?;

    let path = args.out.clone().unwrap_or_else(|| args.session.clone());
    let session = SessionFile::new(session.key, batch);
    session.save(&path)?;
    info!(edits = args.edits.len(), session = %path.display(), "session written");
    Ok(SessionResult {
        batch: session.batch,
        path,
    })
}

pub fn run_encode(args: &EncodeArgs, catalog: Option<&Path>) -> Result<()> {
    let session = SessionFile::load(&args.session)?;
    let catalog = load_catalog(catalog)?;
    let config = catalog.get(&session.key)?;
    let bytes = encode_batch(config, &session.batch)
        .with_context(|| format!("encode {}", args.session.display()))?;
    match &args.output {
        Some(path) => {
            fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?;
            info!(rows = session.batch.len(), output = %path.display(), "payroll CSV written");
        }
        None => io::stdout()
            .lock()
            .write_all(&bytes)
            .context("write payroll CSV to stdout")?,
    }
    Ok(())
}

pub fn run_integrations(catalog: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(catalog)?;
    let mut table = Table::new();
    table.set_header(vec!["Integration", "Description", "Stages", "Output columns"]);
    apply_table_style(&mut table);
    for config in catalog.iter() {
        table.add_row(vec![
            config.integration(),
            config.description.clone().unwrap_or_default(),
            config.stages.len().to_string(),
            config.output.headers().collect::<Vec<_>>().join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}
