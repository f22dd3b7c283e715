// Table normalization: header promotion, Frame == 0 trim, numeric coercion, Time as duration

use crate::core::constants::{FRAME_COLUMN, TIME_COLUMN};
use crate::core::format::{Cell, RawTable};
use crate::core::lookup::LookupTables;
use crate::core::table::{Column, ColumnData, NormalizedTable};
use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info, warn};

// chrono durations are i64 nanoseconds
const MAX_DURATION_SECONDS: f64 = 9.2e9;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CoercionOutcome {
    Numeric,
    /// Coerced regardless; unparseable cells became missing values.
    Forced { unparsed: usize },
    Text { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnCoercion {
    pub column: String,
    #[serde(flatten)]
    pub outcome: CoercionOutcome,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scrubbed {
    pub table: NormalizedTable,
    pub coercion: Vec<ColumnCoercion>,
    pub warnings: Vec<String>,
}

/// Promotes `header_row` to column names and cleans the body beneath it.
///
/// Order: names (Frame/Time forced) -> apostrophe strip on the bit-stream
/// column -> trim to first Frame == 0 -> per-column numeric coercion ->
/// Time re-read as a duration in seconds.
pub fn scrub(raw: &RawTable, header_row: usize, tables: &LookupTables) -> Scrubbed {
    let mut warnings = Vec::new();

    let mut names: Vec<String> = (0..raw.n_cols()).map(|c| raw.text(header_row, c)).collect();
    for (slot, forced) in names.iter_mut().zip([FRAME_COLUMN, TIME_COLUMN]) {
        *slot = forced.to_string();
    }

    let body: Vec<&[Cell]> = raw.rows().skip(header_row + 1).collect();
    let mut columns: Vec<Vec<Cell>> = (0..names.len())
        .map(|c| body.iter().map(|row| row[c].clone()).collect())
        .collect();

    let bit_stream_idx = names.iter().position(|n| *n == tables.bit_stream.column);
    if let Some(idx) = bit_stream_idx {
        strip_leading_apostrophes(&mut columns[idx]);
    }

    if let Some(frame) = columns.first() {
        let frame_values: Vec<Option<f64>> = frame.iter().map(|c| parse_cell(c).ok().flatten()).collect();
        match frame_values.iter().position(|f| *f == Some(0.0)) {
            Some(start) => {
                if start > 0 {
                    debug!("dropping {} rows before Frame == 0", start);
                }
                for col in &mut columns {
                    col.drain(..start);
                }
            }
            None => {
                let msg = "couldn't find the start-of-recording marker (Frame == 0); showing all rows after the header".to_string();
                warn!("{}", msg);
                warnings.push(msg);
            }
        }
    }

    let mut coercion = Vec::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for (idx, (name, cells)) in names.into_iter().zip(columns).enumerate() {
        let (data, outcome) = if idx == 0 {
            force_numeric(&cells)
        } else if Some(idx) == bit_stream_idx {
            let reason = "bit-stream column kept as text".to_string();
            (text_column(&cells), CoercionOutcome::Text { reason })
        } else {
            coerce_numeric(&cells)
        };

        if let CoercionOutcome::Text { reason } = &outcome {
            debug!("column '{}' left as text: {}", name, reason);
        }
        coercion.push(ColumnCoercion {
            column: name.clone(),
            outcome,
        });
        out.push(Column::new(name, data));
    }

    if let Some(time) = out.iter_mut().find(|c| c.name == TIME_COLUMN) {
        match &mut time.data {
            ColumnData::Numeric(values) => {
                let lost = seconds_as_durations(values);
                if lost > 0 {
                    let msg = format!("{} Time values could not be read as durations", lost);
                    warn!("{}", msg);
                    warnings.push(msg);
                }
            }
            ColumnData::Text(_) => {
                let msg = "Time column is not numeric; left as text".to_string();
                warn!("{}", msg);
                warnings.push(msg);
            }
        }
    }

    let table = NormalizedTable::from_columns(out);
    info!(
        "normalized table: {} rows x {} columns",
        table.row_count(),
        table.column_count()
    );

    Scrubbed {
        table,
        coercion,
        warnings,
    }
}

fn strip_leading_apostrophes(cells: &mut [Cell]) {
    for cell in cells {
        if let Cell::Text(s) = cell {
            if let Some(rest) = s.strip_prefix('\'') {
                *s = rest.to_string();
            }
        }
    }
}

/// Ok(None) for blank cells, Err for text that is not a number.
fn parse_cell(cell: &Cell) -> Result<Option<f64>, String> {
    match cell {
        Cell::Number(v) if v.is_nan() => Ok(None),
        Cell::Number(v) => Ok(Some(*v)),
        other => {
            let text = other.to_text();
            if text.is_empty() {
                return Ok(None);
            }
            match text.parse::<f64>() {
                Ok(v) if v.is_nan() => Ok(None),
                Ok(v) => Ok(Some(v)),
                Err(_) => Err(text),
            }
        }
    }
}

fn text_column(cells: &[Cell]) -> ColumnData {
    ColumnData::Text(cells.iter().map(Cell::to_text).collect())
}

fn coerce_numeric(cells: &[Cell]) -> (ColumnData, CoercionOutcome) {
    let mut values = Vec::with_capacity(cells.len());
    for (row, cell) in cells.iter().enumerate() {
        match parse_cell(cell) {
            Ok(v) => values.push(v),
            Err(text) => {
                let reason = format!("non-numeric value {:?} at row {}", text, row);
                return (text_column(cells), CoercionOutcome::Text { reason });
            }
        }
    }
    (ColumnData::Numeric(values), CoercionOutcome::Numeric)
}

fn force_numeric(cells: &[Cell]) -> (ColumnData, CoercionOutcome) {
    let mut unparsed = 0;
    let values: Vec<Option<f64>> = cells
        .iter()
        .map(|c| {
            parse_cell(c).unwrap_or_else(|_| {
                unparsed += 1;
                None
            })
        })
        .collect();
    let outcome = if unparsed == 0 {
        CoercionOutcome::Numeric
    } else {
        CoercionOutcome::Forced { unparsed }
    };
    (ColumnData::Numeric(values), outcome)
}

/// Rewrites each value as the total seconds of the equivalent duration.
/// Returns how many values could not be represented.
fn seconds_as_durations(values: &mut [Option<f64>]) -> usize {
    let mut lost = 0;
    for value in values.iter_mut() {
        if let Some(v) = *value {
            *value = seconds_as_duration(v);
            if value.is_none() {
                lost += 1;
            }
        }
    }
    lost
}

fn seconds_as_duration(seconds: f64) -> Option<f64> {
    if !seconds.is_finite() || seconds.abs() >= MAX_DURATION_SECONDS {
        return None;
    }
    let duration = Duration::nanoseconds((seconds * 1e9).round() as i64);
    duration.num_nanoseconds().map(|ns| ns as f64 / 1e9)
}
