//! Per-field reconciliation outcomes.

use serde::{Deserialize, Serialize};

use crate::reference::CanonicalRecord;

/// Classification of a lookup field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Resolved to exactly one canonical record.
    Exact,
    /// More than one candidate; the user must pick one.
    Ambiguous,
    /// No candidate; the user must type a value.
    Unmatched,
}

/// Reconciliation result for one lookup field of a row.
///
/// `valid` implies `exact_match` is present and `possible_matches` is empty.
/// An invalid outcome with candidates is ambiguous, without is unmatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutcome {
    /// Currently selected field content, possibly edited by the user.
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub exact_match: Option<CanonicalRecord>,
    #[serde(default)]
    pub possible_matches: Vec<CanonicalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FieldOutcome {
    pub fn exact(value: impl Into<String>, record: CanonicalRecord) -> Self {
        Self {
            value: value.into(),
            valid: true,
            exact_match: Some(record),
            possible_matches: Vec::new(),
            note: None,
        }
    }

    /// Candidates are stored sorted by key so repeated runs are identical.
    pub fn ambiguous(value: impl Into<String>, mut candidates: Vec<CanonicalRecord>) -> Self {
        candidates.sort();
        Self {
            value: value.into(),
            valid: false,
            exact_match: None,
            possible_matches: candidates,
            note: None,
        }
    }

    pub fn unmatched(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            valid: false,
            exact_match: None,
            possible_matches: Vec::new(),
            note: None,
        }
    }

    /// Unmatched outcome explaining why the value could not be derived.
    pub fn failed(value: impl Into<String>, note: impl Into<String>) -> Self {
        Self::unmatched(value).with_note(note)
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn status(&self) -> MatchStatus {
        if self.valid && self.exact_match.is_some() {
            MatchStatus::Exact
        } else if self.possible_matches.is_empty() {
            MatchStatus::Unmatched
        } else {
            MatchStatus::Ambiguous
        }
    }

    /// Key of the resolved record, when valid.
    pub fn canonical_key(&self) -> Option<&str> {
        if !self.valid {
            return None;
        }
        self.exact_match.as_ref().map(|record| record.key.as_str())
    }

    /// Whether the outcome satisfies the validity invariant.
    pub fn is_consistent(&self) -> bool {
        !self.valid || (self.exact_match.is_some() && self.possible_matches.is_empty())
    }
}

/// A non-lookup field (hours, temporary rate) with its validity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarOutcome {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ScalarOutcome {
    /// A value awaiting validation.
    pub fn pending(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            valid: false,
            note: None,
        }
    }

    pub fn failed(note: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            valid: false,
            note: Some(note.into()),
        }
    }
}
