use std::fmt;

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Value – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.  Coercion failures become `Missing`
/// rather than errors, mirroring best-effort numeric conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Parse a raw string cell: empty → `Missing`, numeric → `Number`,
    /// everything else → `Text`.
    pub fn from_raw(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Value::Number(v),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    /// Best-effort numeric view: numbers pass through, text is re-parsed,
    /// anything unconvertible is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Missing => write!(f, ""),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An in-memory rectangular dataset: ordered named columns of equal length.
/// Row order is significant and preserved through every transform except
/// explicit partitioning.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table from columns, padding short columns with `Missing`
    /// so the equal-length invariant always holds.
    pub fn from_columns(mut columns: Vec<Column>) -> Self {
        let row_count = columns.iter().map(Column::len).max().unwrap_or(0);
        for col in &mut columns {
            col.values.resize(row_count, Value::Missing);
        }
        Table { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Ordered column names.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name; fails with `UnknownColumn`.
    pub fn column(&self, name: &str) -> Result<&Column, PipelineError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PipelineError::UnknownColumn(name.to_string()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_parsing_classifies_cells() {
        assert_eq!(Value::from_raw("3.5"), Value::Number(3.5));
        assert_eq!(Value::from_raw("  -2e3 "), Value::Number(-2000.0));
        assert_eq!(Value::from_raw("bad"), Value::Text("bad".into()));
        assert_eq!(Value::from_raw("   "), Value::Missing);
    }

    #[test]
    fn text_cells_reparse_as_numbers() {
        assert_eq!(Value::Text("7.25".into()).as_number(), Some(7.25));
        assert_eq!(Value::Text("seven".into()).as_number(), None);
        assert_eq!(Value::Missing.as_number(), None);
    }

    #[test]
    fn short_columns_pad_to_common_length() {
        let table = Table::from_columns(vec![
            Column::new("a", vec![Value::Number(1.0), Value::Number(2.0)]),
            Column::new("b", vec![Value::Number(9.0)]),
        ]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("b").unwrap().values[1], Value::Missing);
    }

    #[test]
    fn unknown_column_is_reported() {
        let table = Table::from_columns(vec![Column::new("a", vec![])]);
        assert!(matches!(
            table.column("nope"),
            Err(PipelineError::UnknownColumn(_))
        ));
    }
}
