use std::fmt;

use serde::{Deserialize, Serialize};

/// How a raw value is compared with reference records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Trimmed, case-insensitive equality with the record key.
    #[default]
    ExactKey,
    /// Every name token must occur in the first name, last name or key.
    FuzzyName,
}

impl MatchPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactKey => "exact_key",
            Self::FuzzyName => "fuzzy_name",
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
