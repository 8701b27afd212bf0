//! Integration catalog: one [`IntegrationConfig`] per (type, provider).

use std::path::Path;

use payroll_ingest::IngestOptions;
use payroll_model::IntegrationKey;
use payroll_output::OutputLayout;
use payroll_validate::{RowValidator, ScalarRule};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::pipeline::Pipeline;
use crate::registry::StageRegistry;
use crate::stage::StageConfig;

const BUILTIN_CATALOG: &str = include_str!("../integrations.toml");

/// Everything needed to reconcile uploads of one integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    pub integration_type: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub input: IngestOptions,
    pub stages: Vec<StageConfig>,
    #[serde(default)]
    pub scalars: Vec<ScalarRule>,
    #[serde(default)]
    pub output: OutputLayout,
}

impl IntegrationConfig {
    /// `type/provider`, lowercased.
    pub fn integration(&self) -> String {
        format!(
            "{}/{}",
            self.integration_type.trim().to_ascii_lowercase(),
            self.provider.trim().to_ascii_lowercase()
        )
    }

    pub fn serves(&self, key: &IntegrationKey) -> bool {
        self.integration_type
            .trim()
            .eq_ignore_ascii_case(&key.integration_type)
            && self.provider.trim().eq_ignore_ascii_case(&key.provider)
    }

    /// Lookup fields written by match stages, in stage order.
    pub fn match_fields(&self) -> Vec<String> {
        self.stages
            .iter()
            .filter_map(|stage| match stage {
                StageConfig::Match(matcher) => Some(matcher.field.clone()),
                StageConfig::Transform(_) => None,
            })
            .collect()
    }

    pub fn validator(&self) -> RowValidator {
        RowValidator::new(self.match_fields(), self.scalars.clone())
    }

    pub fn compile(&self, registry: &StageRegistry) -> Result<Pipeline> {
        Pipeline::compile(self, registry)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationCatalog {
    #[serde(default)]
    integrations: Vec<IntegrationConfig>,
}

impl IntegrationCatalog {
    pub fn new(integrations: Vec<IntegrationConfig>) -> Result<Self> {
        let catalog = Self { integrations };
        catalog.check_unique()?;
        Ok(catalog)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG, "built-in catalog")
    }

    /// Parse a TOML catalog; `origin` names it in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        let catalog: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        catalog.check_unique()?;
        debug!(
            origin,
            integrations = catalog.integrations.len(),
            "loaded integration catalog"
        );
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    fn check_unique(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for config in &self.integrations {
            let integration = config.integration();
            if !seen.insert(integration.clone()) {
                return Err(ConfigError::DuplicateIntegration { integration });
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &IntegrationKey) -> Result<&IntegrationConfig> {
        self.integrations
            .iter()
            .find(|config| config.serves(key))
            .ok_or_else(|| ConfigError::UnsupportedIntegration {
                integration: key.integration(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntegrationConfig> {
        self.integrations.iter()
    }

    pub fn len(&self) -> usize {
        self.integrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_compiles() {
        let catalog = IntegrationCatalog::builtin().expect("builtin catalog");
        let registry = StageRegistry::with_builtins();
        for config in catalog.iter() {
            config.compile(&registry).expect("builtin integration compiles");
        }
        let key = IntegrationKey::new(1, "Payroll", "DAXCO").expect("key");
        let daxco = catalog.get(&key).expect("daxco");
        assert_eq!(
            daxco.match_fields(),
            vec![
                "employee_id",
                "gross_to_net_code",
                "type_code",
                "distributed_dept_code"
            ]
        );
        assert_eq!(daxco.output, OutputLayout::default());
    }

    #[test]
    fn unknown_integration_is_unsupported() {
        let catalog = IntegrationCatalog::builtin().expect("builtin catalog");
        let key = IntegrationKey::new(1, "payroll", "mindbody").expect("key");
        let err = catalog.get(&key).unwrap_err();
        assert_eq!(err.to_string(), "unsupported integration payroll/mindbody");
    }

    #[test]
    fn duplicate_integrations_are_rejected() {
        let text = r#"
            [[integrations]]
            integration_type = "payroll"
            provider = "daxco"
            stages = []

            [[integrations]]
            integration_type = "Payroll"
            provider = "Daxco"
            stages = []
        "#;
        assert!(matches!(
            IntegrationCatalog::from_toml_str(text, "test"),
            Err(ConfigError::DuplicateIntegration { .. })
        ));
    }

    #[test]
    fn parse_errors_name_the_origin() {
        let err = IntegrationCatalog::from_toml_str("integrations = 3", "custom.toml").unwrap_err();
        assert!(err.to_string().starts_with("invalid integration catalog custom.toml"));
    }
}
