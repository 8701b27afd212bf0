use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Identifies which company's directory to consult and which
/// integration (type/provider pair) the upload came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegrationKey {
    pub company_id: u64,
    pub integration_type: String,
    pub provider: String,
}

impl IntegrationKey {
    pub fn new(
        company_id: u64,
        integration_type: impl Into<String>,
        provider: impl Into<String>,
    ) -> Result<Self> {
        let integration_type = integration_type.into().trim().to_ascii_lowercase();
        let provider = provider.into().trim().to_ascii_lowercase();
        if integration_type.is_empty() {
            return Err(ModelError::EmptyIntegrationPart { part: "type" });
        }
        if provider.is_empty() {
            return Err(ModelError::EmptyIntegrationPart { part: "provider" });
        }
        Ok(Self {
            company_id,
            integration_type,
            provider,
        })
    }

    /// `type/provider`, as used in configuration and log fields.
    pub fn integration(&self) -> String {
        format!("{}/{}", self.integration_type, self.provider)
    }
}

impl fmt::Display for IntegrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} (company {})",
            self.integration_type, self.provider, self.company_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_parts() {
        let key = IntegrationKey::new(42, " Payroll ", "DAXCO").expect("key");
        assert_eq!(key.integration(), "payroll/daxco");
        assert_eq!(key.to_string(), "payroll/daxco (company 42)");
    }

    #[test]
    fn rejects_empty_provider() {
        assert_eq!(
            IntegrationKey::new(1, "payroll", "  "),
            Err(ModelError::EmptyIntegrationPart { part: "provider" })
        );
    }
}
