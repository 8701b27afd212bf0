//! Canonical reference records fetched from the employee directory.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lookup domain a canonical record belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceDomain {
    Employee,
    GrossToNet,
    TypeCode,
    Department,
}

impl ReferenceDomain {
    pub const ALL: [ReferenceDomain; 4] = [
        ReferenceDomain::Employee,
        ReferenceDomain::GrossToNet,
        ReferenceDomain::TypeCode,
        ReferenceDomain::Department,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::GrossToNet => "gross_to_net",
            Self::TypeCode => "type_code",
            Self::Department => "department",
        }
    }
}

impl fmt::Display for ReferenceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference-dataset entry: an employee or a code.
///
/// `key` identifies the record (employee id, code value). The remaining
/// attributes disambiguate candidates for the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CanonicalRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            first_name: None,
            last_name: None,
            department: None,
            description: None,
        }
    }

    pub fn employee(
        key: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Self::new(key)
        }
    }

    pub fn code(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::new(key)
        }
    }

    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// "First Last" for employees, the description for codes, else the key.
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            return name;
        }
        self.description.clone().unwrap_or_else(|| self.key.clone())
    }
}

impl PartialOrd for CanonicalRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_keys(&self.key, &other.key)
            .then_with(|| self.key.cmp(&other.key))
            .then_with(|| self.last_name.cmp(&other.last_name))
            .then_with(|| self.first_name.cmp(&other.first_name))
            .then_with(|| self.department.cmp(&other.department))
            .then_with(|| self.description.cmp(&other.description))
    }
}

/// Order record keys numerically when both are integers, else as text.
pub fn compare_keys(left: &str, right: &str) -> Ordering {
    let (left, right) = (left.trim(), right.trim());
    match (left.parse::<u64>(), right.parse::<u64>()) {
        (Ok(l), Ok(r)) => l.cmp(&r),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.to_ascii_lowercase().cmp(&right.to_ascii_lowercase()),
    }
}

/// A code record tagged with the lookup domain it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub domain: ReferenceDomain,
    #[serde(flatten)]
    pub record: CanonicalRecord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ReferencePayload {
    #[serde(default)]
    employees: Vec<CanonicalRecord>,
    #[serde(default)]
    codes: Vec<CodeRecord>,
}

/// Snapshot of the reference dataset for one company.
///
/// Records are grouped per domain and de-duplicated by key (first wins),
/// since directory exports repeat employees once per pay or deduction code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReferencePayload", into = "ReferencePayload")]
pub struct ReferenceData {
    sets: BTreeMap<ReferenceDomain, Vec<CanonicalRecord>>,
}

impl ReferenceData {
    pub fn new(employees: Vec<CanonicalRecord>, codes: Vec<CodeRecord>) -> Self {
        let mut sets: BTreeMap<ReferenceDomain, Vec<CanonicalRecord>> = BTreeMap::new();
        let mut seen: BTreeSet<(ReferenceDomain, String)> = BTreeSet::new();
        let tagged = employees
            .into_iter()
            .map(|record| (ReferenceDomain::Employee, record))
            .chain(codes.into_iter().map(|code| (code.domain, code.record)));
        for (domain, record) in tagged {
            let key = record.key.trim().to_ascii_lowercase();
            if seen.insert((domain, key)) {
                sets.entry(domain).or_default().push(record);
            }
        }
        Self { sets }
    }

    /// Records of one lookup domain (empty when the directory has none).
    pub fn set(&self, domain: ReferenceDomain) -> &[CanonicalRecord] {
        self.sets.get(&domain).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn employees(&self) -> &[CanonicalRecord] {
        self.set(ReferenceDomain::Employee)
    }

    pub fn count(&self, domain: ReferenceDomain) -> usize {
        self.set(domain).len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.values().all(Vec::is_empty)
    }
}

impl From<ReferencePayload> for ReferenceData {
    fn from(payload: ReferencePayload) -> Self {
        Self::new(payload.employees, payload.codes)
    }
}

impl From<ReferenceData> for ReferencePayload {
    fn from(data: ReferenceData) -> Self {
        let mut payload = ReferencePayload::default();
        for (domain, records) in data.sets {
            if domain == ReferenceDomain::Employee {
                payload.employees = records;
            } else {
                payload
                    .codes
                    .extend(records.into_iter().map(|record| CodeRecord { domain, record }));
            }
        }
        payload
    }
}
