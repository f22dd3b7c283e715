// Normalized (frame/time indexed) snapshot table

use crate::core::constants::{FRAME_COLUMN, TIME_COLUMN};
use crate::core::error::{Result, SnapshotError};
use crate::core::format::format_number;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    /// Numeric value at `row`; text cells are parsed on the fly.
    pub fn get_f64(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Numeric(v) => v.get(row).copied().flatten(),
            ColumnData::Text(v) => v.get(row).and_then(|s| s.trim().parse::<f64>().ok()),
        }
    }

    pub fn display(&self, row: usize) -> String {
        match self {
            ColumnData::Numeric(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(format_number)
                .unwrap_or_default(),
            ColumnData::Text(v) => v.get(row).cloned().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// One row per recorded frame. Column 0 is "Frame", column 1 is "Time";
/// rows are in recording order starting at the Frame == 0 marker when present.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NormalizedTable {
    columns: Vec<Column>,
    rows: usize,
}

impl NormalizedTable {
    pub(crate) fn from_columns(columns: Vec<Column>) -> Self {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        debug_assert!(columns.iter().all(|c| c.data.len() == rows));
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// First column with this exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(|c| c.data.as_numeric())
    }

    pub fn frame(&self) -> Option<&[Option<f64>]> {
        self.numeric(FRAME_COLUMN)
    }

    pub fn time(&self) -> Option<&[Option<f64>]> {
        self.numeric(TIME_COLUMN)
    }

    /// Row index of the first Frame == 0.
    pub fn frame_zero_row(&self) -> Option<usize> {
        self.frame()?.iter().position(|f| *f == Some(0.0))
    }

    pub fn value_at_frame_zero(&self, name: &str) -> Option<f64> {
        let row = self.frame_zero_row()?;
        self.column(name)?.data.get_f64(row)
    }

    /// Adds a computed column for a one-off view. Existing columns are never replaced.
    pub(crate) fn push_column(&mut self, column: Column) -> Result<()> {
        if self.contains(&column.name) {
            return Err(SnapshotError::DuplicateColumn(column.name));
        }
        if !self.columns.is_empty() && column.data.len() != self.rows {
            return Err(SnapshotError::ColumnLengthMismatch {
                name: column.name,
                expected: self.rows,
                got: column.data.len(),
            });
        }
        if self.columns.is_empty() {
            self.rows = column.data.len();
        }
        self.columns.push(column);
        Ok(())
    }
}
