// Data structures shared by the ingestion stages

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cell of the raw spreadsheet grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Trimmed text form of the cell. NaN, "nan" and "none" collapse to "".
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(v) => format_number(*v),
            Cell::Text(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("none") {
                    String::new()
                } else {
                    s.to_string()
                }
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        self.to_text().is_empty()
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

pub(crate) fn format_number(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Untyped rows x columns grid, no header promotion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl RawTable {
    /// Builds a rectangular grid; short rows are padded with empty cells.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self { rows, width }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.width
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    /// No rows, or no cell holding anything.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.rows.iter().all(|r| r.iter().all(Cell::is_blank))
    }

    pub fn row(&self, r: usize) -> Option<&[Cell]> {
        self.rows.get(r).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Out-of-range positions read as empty.
    pub fn cell(&self, r: usize, c: usize) -> &Cell {
        self.rows
            .get(r)
            .and_then(|row| row.get(c))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn text(&self, r: usize, c: usize) -> String {
        self.cell(r, c).to_text()
    }
}

/// Chain-of-custody label/value pair from the preamble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub label: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PidDescriptor {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Unit")]
    pub unit: String,
}

impl PidDescriptor {
    pub fn new(description: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            unit: unit.into(),
        }
    }
}

/// Signal name -> description/unit.
pub type PidInfo = BTreeMap<String, PidDescriptor>;
