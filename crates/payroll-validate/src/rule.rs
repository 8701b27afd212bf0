use payroll_model::Row;
use serde::{Deserialize, Serialize};

/// Matches when a lookup field resolves to one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub field: String,
    pub values: Vec<String>,
}

impl FieldCondition {
    /// Compares against the resolved key, or the raw value while the field
    /// is unresolved.
    pub fn holds(&self, row: &Row) -> bool {
        let Some(outcome) = row.field(&self.field) else {
            return false;
        };
        let current = outcome.canonical_key().unwrap_or(&outcome.value).trim();
        self.values
            .iter()
            .any(|value| value.trim().eq_ignore_ascii_case(current))
    }
}

/// Validation rule for a non-lookup field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarRule {
    pub name: String,
    /// Blank is accepted unless `required_when` holds.
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_when: Option<FieldCondition>,
}

impl ScalarRule {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
            required_when: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::required(name)
        }
    }

    #[must_use]
    pub fn required_when<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_when = Some(FieldCondition {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Whether a blank value is acceptable on `row`.
    pub fn allows_blank(&self, row: &Row) -> bool {
        self.optional
            && !self
                .required_when
                .as_ref()
                .is_some_and(|condition| condition.holds(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_from_toml() {
        let rule: ScalarRule = toml::from_str(
            r#"
            name = "temporary_rate"
            optional = true
            required_when = { field = "type_code", values = ["TMP"] }
            "#,
        )
        .expect("parse rule");
        assert_eq!(
            rule,
            ScalarRule::optional("temporary_rate").required_when("type_code", ["TMP"])
        );
        let required: ScalarRule = toml::from_str(r#"name = "hours_or_amount""#).expect("parse");
        assert!(!required.optional);
    }
}
