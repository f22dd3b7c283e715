// PID description / unit extraction around the header row

use crate::core::format::{PidDescriptor, PidInfo, RawTable};
use crate::core::lookup::LookupTables;
use crate::core::snap_type::SnapshotType;
use tracing::debug;

/// Reads, for every column from `start_col`, the PID name on the header row,
/// the description on the row above and the unit on the row below.
/// Columns with an empty PID name are skipped.
pub fn extract_pid_descriptions(
    table: &RawTable,
    header_row: usize,
    start_col: usize,
    tables: &LookupTables,
) -> PidInfo {
    let desc_row = header_row.checked_sub(1).filter(|r| *r < table.n_rows());
    let unit_row = Some(header_row + 1).filter(|r| *r < table.n_rows());

    let mut info = PidInfo::new();
    for c in start_col..table.n_cols() {
        let pid = table.text(header_row, c);
        if pid.is_empty() {
            continue;
        }

        let description = desc_row
            .map(|r| single_line(&table.text(r, c)))
            .unwrap_or_default();
        let unit = unit_row
            .map(|r| single_line(&table.text(r, c)))
            .unwrap_or_default();
        let unit = if unit.is_empty() {
            unit
        } else {
            tables.normalize_unit(&unit)
        };

        info.insert(pid, PidDescriptor { description, unit });
    }

    debug!("extracted metadata for {} PIDs", info.len());
    info
}

/// Multi-line cell text joined into one space-separated line.
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replaces the unit of `pid` if it is present. Returns whether it was.
pub fn override_unit(info: &mut PidInfo, pid: &str, unit: &str) -> bool {
    match info.get_mut(pid) {
        Some(descriptor) => {
            descriptor.unit = unit.to_string();
            true
        }
        None => false,
    }
}

/// Unit overrides the export cannot express: the bit-stream column for every
/// family and the per-family state legends.
pub fn apply_unit_overrides(info: &mut PidInfo, snapshot_type: SnapshotType, tables: &LookupTables) {
    let bit_stream = &tables.bit_stream;
    if override_unit(info, &bit_stream.column, &bit_stream.unit) {
        debug!("unit of {} set to '{}'", bit_stream.column, bit_stream.unit);
    }
    for legend in tables.state_legend(snapshot_type) {
        if override_unit(info, &legend.column, &legend.legend) {
            debug!("unit of {} replaced by state legend", legend.column);
        }
    }
}
