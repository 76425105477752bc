use crate::stmt::Value;

/// Outcome of a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResponse {
    /// Rows changed by the statement. `None` when the backend does not
    /// report it.
    pub rows_affected: Option<u64>,

    /// Value generated for the auto-increment column, if any.
    pub last_insert_id: Option<i64>,
}

impl ExecResponse {
    pub fn count(rows_affected: u64) -> Self {
        Self {
            rows_affected: Some(rows_affected),
            last_insert_id: None,
        }
    }

    /// A response from a backend without affected-row counts.
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Result rows of a read, with the backend's column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Rows {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of `name` among the result columns.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|column| column.eq_ignore_ascii_case(name))
            })
    }

    /// The first value of the first row, if any.
    pub fn into_scalar(self) -> Option<Value> {
        self.rows.into_iter().next()?.into_iter().next()
    }
}
