//! Builds a [`Reconciler`] from command-line settings.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use payroll_core::Reconciler;
use payroll_pipeline::{IntegrationCatalog, StageRegistry};
use payroll_reference::{FileGateway, HttpGateway, HttpGatewayConfig, ReferenceGateway};
use tracing::debug;

/// Where reference data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    /// A JSON export on disk.
    File(PathBuf),
    /// The directory service.
    Http {
        base_url: String,
        api_key: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Catalog replacing the built-in integrations.
    pub catalog: Option<PathBuf>,
    pub reference: ReferenceSource,
    pub fetch_timeout: Duration,
}

/// The catalog at `path`, or the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<IntegrationCatalog> {
    match path {
        Some(path) => IntegrationCatalog::load(path)
            .with_context(|| format!("load integration catalog {}", path.display())),
        None => IntegrationCatalog::builtin().context("load built-in integration catalog"),
    }
}

pub fn build_gateway(
    source: &ReferenceSource,
    fetch_timeout: Duration,
) -> Result<Arc<dyn ReferenceGateway>> {
    match source {
        ReferenceSource::File(path) => Ok(Arc::new(FileGateway::new(path.clone()))),
        ReferenceSource::Http { base_url, api_key } => {
            let mut config =
                HttpGatewayConfig::new(base_url.clone()).with_deadline(fetch_timeout);
            if let Some(api_key) = api_key {
                config = config.with_api_key(api_key.clone());
            }
            let gateway = HttpGateway::new(config).context("build reference client")?;
            Ok(Arc::new(gateway))
        }
    }
}

pub fn build_reconciler(settings: &EngineSettings) -> Result<Reconciler> {
    let catalog = load_catalog(settings.catalog.as_deref())?;
    let gateway = build_gateway(&settings.reference, settings.fetch_timeout)?;
    debug!(
        integrations = catalog.len(),
        gateway = %gateway.describe(),
        "reconciler ready"
    );
    Ok(
        Reconciler::new(catalog, StageRegistry::with_builtins(), gateway)
            .with_fetch_timeout(settings.fetch_timeout),
    )
}
