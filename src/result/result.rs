use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::core::Value;

pub type Row = Vec<Value>;

/// A materialized result set: ordered column names plus rows of dynamically
/// typed cells. The free-form console can produce arbitrary column sets, so
/// nothing here is tied to the patient schema.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Cell lookup by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Render as an aligned text table, one line per entry.
    pub fn format_table(&self) -> Vec<String> {
        if self.columns.is_empty() {
            return vec!["Empty result set".to_string()];
        }

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().enumerate() {
                widths[i] = widths[i].max(value.to_string().len());
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 3);

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{:width$}", col, width = widths[i]))
            .collect();
        lines.push(header.join(" | "));

        let separator: String = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-");
        lines.push(separator);

        for row in &self.rows {
            let row_str: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, val)| format!("{:width$}", val.to_string(), width = widths[i]))
                .collect();
            lines.push(row_str.join(" | "));
        }

        lines.push(format!("{} row(s)", self.rows.len()));
        lines
    }

    pub fn print(&self) {
        for line in self.format_table() {
            println!("{}", line);
        }
    }
}

// Serializes as an array of column-keyed objects with explicit JSON nulls,
// the shape the original console exported to the clipboard.
impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowObject {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

struct RowObject<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.row.len()))?;
        for (name, value) in self.columns.iter().zip(self.row.iter()) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Outcome of one console statement. Failures travel as data, never as an
/// error, so an interactive console can render them without a handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub success: bool,
    pub rows: QueryResult,
    pub error: Option<String>,
}

impl QueryOutcome {
    pub fn ok(rows: QueryResult) -> Self {
        Self {
            success: true,
            rows,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            rows: QueryResult::empty(),
            error: Some(message.into()),
        }
    }
}
