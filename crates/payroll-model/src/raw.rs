use serde::{Deserialize, Serialize};

/// One cell of an uploaded row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCell {
    pub column: String,
    pub value: String,
}

/// Ordered column → value mapping for one uploaded line.
///
/// Column lookup is case-insensitive; the first column with a matching
/// name wins when a header repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    cells: Vec<RawCell>,
}

impl RawRow {
    pub fn new<I, C, V>(cells: I) -> Self
    where
        I: IntoIterator<Item = (C, V)>,
        C: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: cells
                .into_iter()
                .map(|(column, value)| RawCell {
                    column: column.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        let wanted = column.trim();
        self.cells
            .iter()
            .find(|cell| cell.column.trim().eq_ignore_ascii_case(wanted))
            .map(|cell| cell.value.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|cell| cell.column.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawCell> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_padding() {
        let row = RawRow::new([("Staff First Name", "ann"), ("Scheduled Hours", "4")]);
        assert_eq!(row.get("staff first name"), Some("ann"));
        assert_eq!(row.get(" Scheduled Hours "), Some("4"));
        assert_eq!(row.get("Details"), None);
    }

    #[test]
    fn keeps_column_order() {
        let row = RawRow::new([("b", "1"), ("a", "2")]);
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["b", "a"]);
    }
}
