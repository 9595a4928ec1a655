//! The extracted-table data model.
//!
//! Cells are strings or null; no type coercion happens at this layer.

use std::collections::BTreeMap;
use std::fmt;

/// A column of an extracted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name, unique within its table after disambiguation.
    pub name: String,
    /// Half-open `[start_col, end_col)` character interval of the header
    /// tokens this column was built from, when the source had visual layout.
    /// Columns seeded from template metadata have no interval.
    pub interval: Option<(usize, usize)>,
}

impl ColumnSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interval: None,
        }
    }

    pub fn with_interval(name: impl Into<String>, interval: (usize, usize)) -> Self {
        Self {
            name: name.into(),
            interval: Some(interval),
        }
    }
}

/// A single row; always exactly as wide as the table's column list.
/// Missing cells are `None`, never dropped positions.
pub type Row = Vec<Option<String>>;

/// An extracted table: ordered columns, rows of string-or-null cells, and
/// free-form key/value attributes.
///
/// Tables own their strings and outlive the line buffer they were built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Row>,
    pub attrs: BTreeMap<String, String>,
}

impl Table {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ordered column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Append a row, padding or truncating to the table width so the arity
    /// invariant holds regardless of caller sloppiness.
    pub fn push_row(&mut self, mut row: Row) {
        let width = self.width();
        debug_assert!(row.len() <= width, "row wider than table");
        row.truncate(width);
        row.resize(width, None);
        self.rows.push(row);
    }

    /// Set an attribute, returning `self` for chaining during construction.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}",
            self.columns
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join("\t")
        )?;
        for row in &self.rows {
            let cells: Vec<&str> = row
                .iter()
                .map(|c| c.as_deref().unwrap_or(""))
                .collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}
