use serde::{Deserialize, Serialize};

/// Minimum Jaro-Winkler similarity for anchor and preamble labels.
pub const DEFAULT_ANCHOR_THRESHOLD: f64 = 0.85;

/// Expected shape of one provider's export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Columns the header must contain (case-insensitive).
    #[serde(default)]
    pub columns: Vec<String>,
    /// Columns the export may carry but is not required to.
    #[serde(default)]
    pub optional_columns: Vec<String>,
    /// Label of the header row's first cell. When several lines match, the
    /// last one is the header. Without an anchor the first line is used.
    #[serde(default)]
    pub header_anchor: Option<String>,
    /// Labels of `Label:,Value` lines above the header whose values are
    /// copied onto every row as an extra cell named after the label.
    #[serde(default)]
    pub preamble: Vec<String>,
    #[serde(default = "default_threshold")]
    pub anchor_threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_ANCHOR_THRESHOLD
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            optional_columns: Vec::new(),
            header_anchor: None,
            preamble: Vec::new(),
            anchor_threshold: DEFAULT_ANCHOR_THRESHOLD,
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_optional_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Every column name a row of this export can carry, preamble labels
    /// included.
    pub fn known_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .chain(&self.optional_columns)
            .chain(&self.preamble)
            .map(String::as_str)
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.header_anchor = Some(anchor.into());
        self
    }

    #[must_use]
    pub fn with_preamble<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preamble = labels.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_section_fills_defaults() {
        let options: IngestOptions = toml::from_str(
            r#"
            header_anchor = "Staff First Name"
            columns = ["Staff First Name", "Staff Last Name"]
            "#,
        )
        .expect("parse options");
        assert_eq!(options.anchor_threshold, DEFAULT_ANCHOR_THRESHOLD);
        assert!(options.preamble.is_empty());
        assert_eq!(options.columns.len(), 2);
    }
}
