// Header row detection and snapshot type classification by fingerprint PID

use crate::core::constants::HEADER_SCAN_ROWS;
use crate::core::error::{Result, SnapshotError};
use crate::core::format::{Cell, RawTable};
use crate::core::lookup::LookupTables;
use crate::core::snap_type::SnapshotType;
use tracing::{debug, info};

/// First fingerprint found in the row, in lookup-table order.
fn row_fingerprint(row: &[Cell], tables: &LookupTables) -> Option<SnapshotType> {
    let values: Vec<String> = row.iter().map(|c| c.to_text().to_lowercase()).collect();
    tables
        .fingerprints
        .iter()
        .find(|f| {
            let pid = f.pid.trim().to_lowercase();
            values.iter().any(|v| *v == pid)
        })
        .map(|f| f.snapshot_type)
}

/// Index of the first row (within the first `HEADER_SCAN_ROWS`) holding a fingerprint PID.
pub fn find_header_row(table: &RawTable, tables: &LookupTables) -> Result<usize> {
    find_header_row_within(table, tables, HEADER_SCAN_ROWS)
}

pub fn find_header_row_within(table: &RawTable, tables: &LookupTables, window: usize) -> Result<usize> {
    for (i, row) in table.rows().take(window).enumerate() {
        if row_fingerprint(row, tables).is_some() {
            debug!("fingerprint found in row {}", i);
            return Ok(i);
        }
    }
    Err(SnapshotError::HeaderNotFound {
        scanned_rows: window,
    })
}

/// Snapshot type of the header row; `Unknown` if the row holds no fingerprint.
pub fn classify(table: &RawTable, row_index: usize, tables: &LookupTables) -> SnapshotType {
    let snapshot_type = table
        .row(row_index)
        .and_then(|row| row_fingerprint(row, tables))
        .unwrap_or_default();
    info!("snapshot classified as {} ({})", snapshot_type.tag(), snapshot_type);
    snapshot_type
}
