//! Session files carry a batch between CLI calls.
//!
//! The file is the JSON the reconciler exchanges with its caller, wrapped
//! with the integration key so `reconcile` and `encode` need no flags to
//! find the integration again.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use payroll_model::{Batch, IntegrationKey};
use serde::{Deserialize, Serialize};

/// Uploads above this size are refused unless raised with
/// `--max-upload-bytes`.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    pub key: IntegrationKey,
    pub batch: Batch,
}

impl SessionFile {
    pub fn new(key: IntegrationKey, batch: Batch) -> Self {
        Self { key, batch }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read session {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse session {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self).context("serialize session")?;
        json.push('\n');
        fs::write(path, json).with_context(|| format!("write session {}", path.display()))
    }
}

/// Read an upload, refusing files larger than `max_bytes`.
pub fn read_upload_file(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let size = fs::metadata(path)
        .with_context(|| format!("read upload {}", path.display()))?
        .len();
    if size > max_bytes {
        bail!(
            "upload {} is {size} bytes, above the limit of {max_bytes} bytes",
            path.display()
        );
    }
    fs::read(path).with_context(|| format!("read upload {}", path.display()))
}
