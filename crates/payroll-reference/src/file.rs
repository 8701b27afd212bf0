use std::path::{Path, PathBuf};

use payroll_model::{IntegrationKey, ReferenceData};
use tracing::debug;

use crate::error::{ReferenceError, Result};
use crate::gateway::ReferenceGateway;

/// Gateway reading a JSON reference export from disk on every fetch.
///
/// The file holds `{"employees": [...], "codes": [...]}`.
#[derive(Debug, Clone)]
pub struct FileGateway {
    path: PathBuf,
}

impl FileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReferenceGateway for FileGateway {
    fn fetch(&self, key: &IntegrationKey) -> Result<ReferenceData> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ReferenceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let data: ReferenceData =
            serde_json::from_str(&text).map_err(|source| ReferenceError::Json {
                origin: self.path.display().to_string(),
                source,
            })?;
        debug!(
            company_id = key.company_id,
            path = %self.path.display(),
            employees = data.employees().len(),
            "loaded reference file"
        );
        Ok(data)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use payroll_model::ReferenceDomain;

    use super::*;

    #[test]
    fn reads_json_export() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "employees": [{{"key": "1001", "first_name": "John", "last_name": "Smith"}}],
                "codes": [{{"domain": "type_code", "key": "REG", "description": "Regular"}}]
            }}"#
        )
        .expect("write");
        let key = IntegrationKey::new(1, "payroll", "daxco").expect("key");
        let data = FileGateway::new(file.path()).fetch(&key).expect("fetch");
        assert_eq!(data.employees().len(), 1);
        assert_eq!(data.count(ReferenceDomain::TypeCode), 1);
    }

    #[test]
    fn malformed_json_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");
        let key = IntegrationKey::new(1, "payroll", "daxco").expect("key");
        let err = FileGateway::new(file.path()).fetch(&key).unwrap_err();
        assert!(matches!(err, ReferenceError::Json { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
