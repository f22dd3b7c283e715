// Raw table loading: .xlsx via calamine, .xls as UTF-16 tab-delimited text

use crate::core::constants::*;
use crate::core::error::{Result, SnapshotError};
use crate::core::format::{Cell, RawTable};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::{debug, info};

/// Reads a snapshot export into an untyped grid. No row is promoted to a header.
pub fn load<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let table = match ext.as_str() {
        XLSX_EXTENSION => load_xlsx(path)?,
        LEGACY_EXTENSION => load_legacy(path)?,
        _ => return Err(SnapshotError::UnsupportedFormat(ext)),
    };

    if table.is_empty() {
        return Err(SnapshotError::EmptyTable(path.to_path_buf()));
    }

    info!(
        "loaded {} as {} rows x {} columns",
        path.display(),
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}

fn load_xlsx(path: &Path) -> Result<RawTable> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| SnapshotError::load_failed(path, e))?;

    let sheet_name = match workbook.sheet_names().first() {
        Some(name) => name.clone(),
        None => return Err(SnapshotError::EmptyTable(path.to_path_buf())),
    };
    debug!("reading sheet '{}'", sheet_name);

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SnapshotError::load_failed(path, e))?;

    Ok(grid_from_range(&range))
}

/// Converts a calamine range into a grid anchored at A1, so row indices match the sheet.
pub fn grid_from_range(range: &Range<Data>) -> RawTable {
    let (row_off, col_off) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_off];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_off];
        cells.extend(row.iter().map(cell_from_data));
        rows.push(cells);
    }
    RawTable::from_rows(rows)
}

fn cell_from_data(data: &Data) -> Cell {
    #[allow(unreachable_patterns)]
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(s) => Cell::from(s.as_str()),
        Data::Bool(b) => Cell::Text(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Cell::Text(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
        other => Cell::from(other.to_string().as_str()),
    }
}

fn load_legacy(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path).map_err(|e| SnapshotError::load_failed(path, e))?;
    let text = decode_utf16(&bytes).map_err(|e| SnapshotError::load_failed(path, e))?;
    Ok(grid_from_tab_text(&text))
}

/// Decodes UTF-16 honoring a BOM; little-endian when there is none.
pub(crate) fn decode_utf16(bytes: &[u8]) -> std::result::Result<String, String> {
    let (body, big_endian) = if bytes.starts_with(&UTF16_BE_BOM) {
        (&bytes[2..], true)
    } else if bytes.starts_with(&UTF16_LE_BOM) {
        (&bytes[2..], false)
    } else {
        (bytes, false)
    };

    if body.len() % 2 != 0 {
        return Err(format!(
            "truncated UTF-16 data ({} bytes after BOM)",
            body.len()
        ));
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|p| {
            if big_endian {
                u16::from_be_bytes([p[0], p[1]])
            } else {
                u16::from_le_bytes([p[0], p[1]])
            }
        })
        .collect();

    String::from_utf16(&units).map_err(|e| format!("invalid UTF-16: {}", e))
}

/// Rows on '\n', cells on '\t'. A trailing empty line is not a row.
pub fn grid_from_tab_text(text: &str) -> RawTable {
    let mut lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let rows = lines
        .into_iter()
        .map(|line| line.split('\t').map(Cell::from).collect())
        .collect();
    RawTable::from_rows(rows)
}
