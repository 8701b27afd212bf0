//! Exact-key and fuzzy name-token matching.
//!
//! Matching is a pure function of the raw value, the reference records and
//! the policy. Candidates are returned sorted by key, so two runs over the
//! same input produce identical outcomes.
//!
//! # Rules
//!
//! - An empty (or whitespace-only) value is always unmatched.
//! - Exact-key: the value equals the key of exactly one record.
//! - Fuzzy name: the value is split into lowercase tokens; a record is a
//!   candidate when every token is a substring of its first name, last name
//!   or key. A value equal to exactly one key resolves to that record first,
//!   so a candidate id picked by the user always sticks.
//! - One candidate resolves to an exact match, several are ambiguous.

use payroll_model::{CanonicalRecord, FieldOutcome};

use crate::policy::MatchPolicy;

/// Matcher bound to the records of one lookup domain.
#[derive(Debug, Clone, Copy)]
pub struct FieldMatcher<'a> {
    records: &'a [CanonicalRecord],
    policy: MatchPolicy,
}

impl<'a> FieldMatcher<'a> {
    pub fn new(records: &'a [CanonicalRecord], policy: MatchPolicy) -> Self {
        Self { records, policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Resolve `raw` to a field outcome. The outcome keeps `raw` verbatim
    /// as its value.
    pub fn resolve(&self, raw: &str) -> FieldOutcome {
        let value = raw.trim();
        if value.is_empty() {
            return FieldOutcome::unmatched(raw);
        }

        let key_hits = self.key_hits(value);
        let candidates = match self.policy {
            MatchPolicy::ExactKey => key_hits,
            MatchPolicy::FuzzyName if key_hits.len() == 1 => key_hits,
            MatchPolicy::FuzzyName => self.token_hits(value),
        };

        classify(raw, candidates)
    }

    fn key_hits(&self, value: &str) -> Vec<CanonicalRecord> {
        self.records
            .iter()
            .filter(|record| {
                let key = record.key.trim();
                !key.is_empty() && key.eq_ignore_ascii_case(value)
            })
            .cloned()
            .collect()
    }

    fn token_hits(&self, value: &str) -> Vec<CanonicalRecord> {
        let tokens = tokenize(value);
        if tokens.is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|record| {
                let haystacks = [
                    record.first_name.as_deref().unwrap_or("").to_lowercase(),
                    record.last_name.as_deref().unwrap_or("").to_lowercase(),
                    record.key.trim().to_lowercase(),
                ];
                tokens
                    .iter()
                    .all(|token| haystacks.iter().any(|hay| hay.contains(token.as_str())))
            })
            .cloned()
            .collect()
    }
}

fn classify(raw: &str, mut candidates: Vec<CanonicalRecord>) -> FieldOutcome {
    match candidates.len() {
        0 => FieldOutcome::unmatched(raw),
        1 => match candidates.pop() {
            Some(record) => FieldOutcome::exact(raw, record),
            None => FieldOutcome::unmatched(raw),
        },
        _ => FieldOutcome::ambiguous(raw, candidates),
    }
}

/// Resolve `raw` against `records` under `policy`.
pub fn match_field(raw: &str, records: &[CanonicalRecord], policy: MatchPolicy) -> FieldOutcome {
    FieldMatcher::new(records, policy).resolve(raw)
}

/// Lowercase name tokens, split on whitespace and commas with surrounding
/// punctuation removed ("Smith, J." → `["smith", "j"]`).
pub fn tokenize(value: &str) -> Vec<String> {
    value
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .map(|part| part.trim_matches(|ch: char| !ch.is_alphanumeric()))
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect()
}
