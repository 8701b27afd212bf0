use serde::{Deserialize, Serialize};

/// Where an output column takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Resolved key of a lookup field.
    Field,
    /// Scalar value.
    Scalar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumn {
    pub header: String,
    pub kind: ColumnKind,
    /// Field or scalar name on the row.
    pub name: String,
}

impl OutputColumn {
    pub fn field(header: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            kind: ColumnKind::Field,
            name: name.into(),
        }
    }

    pub fn scalar(header: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            kind: ColumnKind::Scalar,
            name: name.into(),
        }
    }
}

/// Ordered output columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLayout {
    pub columns: Vec<OutputColumn>,
}

impl Default for OutputLayout {
    /// The six canonical payroll import columns.
    fn default() -> Self {
        Self {
            columns: vec![
                OutputColumn::field("Employee ID", "employee_id"),
                OutputColumn::field("Gross to Net Code", "gross_to_net_code"),
                OutputColumn::field("Type Code", "type_code"),
                OutputColumn::scalar("Hours or Amount", "hours_or_amount"),
                OutputColumn::scalar("Temporary Rate", "temporary_rate"),
                OutputColumn::field("Distributed Dept Code", "distributed_dept_code"),
            ],
        }
    }
}

impl OutputLayout {
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.header.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns_of(ColumnKind::Field)
    }

    pub fn scalars(&self) -> impl Iterator<Item = &str> {
        self.columns_of(ColumnKind::Scalar)
    }

    fn columns_of(&self, kind: ColumnKind) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(move |column| column.kind == kind)
            .map(|column| column.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_from_toml() {
        let layout: OutputLayout = toml::from_str(
            r#"
            [[columns]]
            header = "Employee ID"
            kind = "field"
            name = "employee_id"

            [[columns]]
            header = "Hours"
            kind = "scalar"
            name = "hours"
            "#,
        )
        .expect("parse layout");
        assert_eq!(layout.fields().collect::<Vec<_>>(), vec!["employee_id"]);
        assert_eq!(layout.scalars().collect::<Vec<_>>(), vec!["hours"]);
    }

    #[test]
    fn default_headers() {
        let layout = OutputLayout::default();
        let headers: Vec<&str> = layout.headers().collect::<Vec<_>>();
        assert_eq!(
            headers.join(","),
            "Employee ID,Gross to Net Code,Type Code,Hours or Amount,Temporary Rate,Distributed Dept Code"
        );
    }
}
