use std::collections::BTreeMap;

use payroll_model::{IntegrationKey, ReferenceData};

use crate::error::{ReferenceError, Result};

/// Source of canonical reference records for a company.
///
/// Implementations are called from a worker thread when a deadline is in
/// force, hence the `Send + Sync` bound.
pub trait ReferenceGateway: Send + Sync {
    fn fetch(&self, key: &IntegrationKey) -> Result<ReferenceData>;

    /// Short label used in logs.
    fn describe(&self) -> String {
        "reference gateway".to_string()
    }
}

/// Gateway over preloaded data, keyed by company.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    companies: BTreeMap<u64, ReferenceData>,
    fallback: Option<ReferenceData>,
}

impl InMemoryGateway {
    /// Serve `data` for every company.
    pub fn new(data: ReferenceData) -> Self {
        Self {
            companies: BTreeMap::new(),
            fallback: Some(data),
        }
    }

    #[must_use]
    pub fn with_company(mut self, company_id: u64, data: ReferenceData) -> Self {
        self.companies.insert(company_id, data);
        self
    }
}

impl ReferenceGateway for InMemoryGateway {
    fn fetch(&self, key: &IntegrationKey) -> Result<ReferenceData> {
        self.companies
            .get(&key.company_id)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or(ReferenceError::NotFound {
                company_id: key.company_id,
            })
    }

    fn describe(&self) -> String {
        format!("in-memory ({} companies)", self.companies.len())
    }
}

#[cfg(test)]
mod tests {
    use payroll_model::CanonicalRecord;

    use super::*;

    fn key(company_id: u64) -> IntegrationKey {
        IntegrationKey::new(company_id, "payroll", "daxco").expect("key")
    }

    #[test]
    fn company_data_overrides_fallback() {
        let shared = ReferenceData::new(vec![CanonicalRecord::employee("1", "A", "B")], vec![]);
        let own = ReferenceData::new(vec![CanonicalRecord::employee("2", "C", "D")], vec![]);
        let gateway = InMemoryGateway::new(shared).with_company(42, own);

        assert_eq!(gateway.fetch(&key(42)).expect("fetch").employees()[0].key, "2");
        assert_eq!(gateway.fetch(&key(7)).expect("fetch").employees()[0].key, "1");
    }

    #[test]
    fn unknown_company_without_fallback() {
        let gateway = InMemoryGateway::default();
        assert!(matches!(
            gateway.fetch(&key(9)),
            Err(ReferenceError::NotFound { company_id: 9 })
        ));
    }
}
