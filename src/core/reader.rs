// Snapshot aggregate: runs the ingestion pipeline once and exposes the results read-only

use crate::core::classify::{classify, find_header_row};
use crate::core::constants::{PID_START_COLUMN, PREAMBLE_SCAN_ROWS};
use crate::core::derived::DerivedMetrics;
use crate::core::error::{Result, SnapshotError};
use crate::core::format::{HeaderEntry, PidInfo, RawTable};
use crate::core::header::{find_date_time, parse_header};
use crate::core::loader;
use crate::core::lookup::LookupTables;
use crate::core::pid_meta::{apply_unit_overrides, extract_pid_descriptions};
use crate::core::scrub::{scrub, ColumnCoercion};
use crate::core::snap_type::SnapshotType;
use crate::core::table::{Column, ColumnData, NormalizedTable};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Snapshot {
    file_path: PathBuf,
    file_name: String,
    raw_table: RawTable,
    header_list: Vec<HeaderEntry>,
    date_time: String,
    header_row: usize,
    snapshot_type: SnapshotType,
    pid_info: PidInfo,
    snapshot: NormalizedTable,
    coercion: Vec<ColumnCoercion>,
    metrics: DerivedMetrics,
    warnings: Vec<String>,
}

impl Snapshot {
    /// Loads with the built-in lookup tables.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, &LookupTables::default())
    }

    pub fn load_with<P: AsRef<Path>>(path: P, tables: &LookupTables) -> Result<Self> {
        let path = path.as_ref();
        info!("loading snapshot {}", path.display());
        let raw_table = loader::load(path)?;
        Self::from_raw(path, raw_table, tables)
    }

    /// Runs every stage after loading. Fails only when no header row is found.
    pub fn from_raw<P: AsRef<Path>>(path: P, raw_table: RawTable, tables: &LookupTables) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if raw_table.is_empty() {
            return Err(SnapshotError::EmptyTable(file_path));
        }

        let header_list = parse_header(&raw_table, PREAMBLE_SCAN_ROWS, tables);
        let date_time = find_date_time(&header_list).unwrap_or_default().to_string();

        let header_row = find_header_row(&raw_table, tables)?;
        let snapshot_type = classify(&raw_table, header_row, tables);

        let mut pid_info = extract_pid_descriptions(&raw_table, header_row, PID_START_COLUMN, tables);
        let scrubbed = scrub(&raw_table, header_row, tables);
        let metrics = DerivedMetrics::compute(&scrubbed.table, snapshot_type, &pid_info, tables);

        apply_unit_overrides(&mut pid_info, snapshot_type, tables);

        debug!(
            "engine hours {:.1}, success rate {:.1}%",
            metrics.engine_hours, metrics.success_rate
        );

        Ok(Self {
            file_path,
            file_name,
            raw_table,
            header_list,
            date_time,
            header_row,
            snapshot_type,
            pid_info,
            snapshot: scrubbed.table,
            coercion: scrubbed.coercion,
            metrics,
            warnings: scrubbed.warnings,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn raw_table(&self) -> &RawTable {
        &self.raw_table
    }

    pub fn header_list(&self) -> &[HeaderEntry] {
        &self.header_list
    }

    /// Empty when the preamble carried no timestamp.
    pub fn date_time(&self) -> &str {
        &self.date_time
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    pub fn snapshot_type(&self) -> SnapshotType {
        self.snapshot_type
    }

    pub fn pid_info(&self) -> &PidInfo {
        &self.pid_info
    }

    pub fn snapshot(&self) -> &NormalizedTable {
        &self.snapshot
    }

    pub fn coercion_report(&self) -> &[ColumnCoercion] {
        &self.coercion
    }

    pub fn metrics(&self) -> DerivedMetrics {
        self.metrics
    }

    pub fn hours(&self) -> f64 {
        self.metrics.engine_hours
    }

    pub fn mdp_success_rate(&self) -> f64 {
        self.metrics.success_rate
    }

    /// Soft problems hit while loading; the snapshot is still usable.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Appends a computed column for a chart view. Ingestion results are untouched.
    pub fn append_column(&mut self, name: impl Into<String>, data: ColumnData) -> Result<()> {
        let name = name.into();
        debug!("appending computed column '{}'", name);
        self.snapshot.push_column(Column::new(name, data))
    }

    /// Splits a bit-packed text column ("00010010") into one 0/1 column per bit.
    /// Bit 0 is the rightmost character. Returns the new column names.
    pub fn explode_bits(&mut self, column: &str) -> Result<Vec<String>> {
        let source = self
            .snapshot
            .column(column)
            .ok_or_else(|| SnapshotError::ColumnNotFound(column.to_string()))?;

        let rows: Vec<String> = (0..self.snapshot.row_count())
            .map(|r| source.data.display(r))
            .collect();
        let width = rows.iter().map(|s| s.chars().count()).max().unwrap_or(0);

        let names: Vec<String> = (0..width).map(|bit| format!("{} bit {}", column, bit)).collect();
        if let Some(taken) = names.iter().find(|n| self.snapshot.contains(n)) {
            return Err(SnapshotError::DuplicateColumn(taken.clone()));
        }

        for (bit, name) in names.iter().enumerate() {
            let values = rows
                .iter()
                .map(|bits| match bits.chars().rev().nth(bit) {
                    Some('1') => Some(1.0),
                    Some('0') => Some(0.0),
                    _ => None,
                })
                .collect();
            self.snapshot
                .push_column(Column::new(name.clone(), ColumnData::Numeric(values)))?;
        }

        info!("exploded '{}' into {} bit columns", column, width);
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::{Cell, PidDescriptor};

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    fn v2_raw() -> RawTable {
        RawTable::from_rows(vec![
            row(&["Engine Model:", "D34", "", "", ""]),
            row(&["Nov 21 2025/13.20.57", "", "", "", ""]),
            row(&["", "", "Battery voltage", "Engine on time", "Torque limits"]),
            row(&["Frame", "Time", "BattU_u", "EngDa_tiEngOn", "CoETS_stCurrLimActive"]),
            row(&["", "s", "mV", "s", ""]),
            row(&["-1", "-0.1", "12100", "7100", "'0000"]),
            row(&["0", "0", "12200", "7200", "'0101"]),
            row(&["1", "0.1", "12300", "7200", "'0110"]),
        ])
    }

    #[test]
    fn test_from_raw_runs_every_stage() {
        let snap = Snapshot::from_raw("/tmp/v2.xls", v2_raw(), &LookupTables::default()).unwrap();
        assert_eq!(snap.file_name(), "v2.xls");
        assert_eq!(snap.header_row(), 3);
        assert_eq!(snap.snapshot_type(), SnapshotType::EcuV2);
        assert_eq!(snap.date_time(), "Nov 21 2025/13.20.57");
        assert_eq!(snap.header_list()[0], HeaderEntry::new("Engine Model", "D34"));
        assert_eq!(snap.snapshot().row_count(), 2);
        assert_eq!(snap.hours(), 2.0);
        assert_eq!(snap.mdp_success_rate(), 0.0);
        assert_eq!(
            snap.pid_info().get("BattU_u"),
            Some(&PidDescriptor::new("Battery voltage", "Millivolts"))
        );
        assert_eq!(snap.pid_info()["CoETS_stCurrLimActive"].unit, "Bit Stream");
        assert!(snap.warnings().is_empty());
    }

    #[test]
    fn test_pid_keys_are_table_columns() {
        let snap = Snapshot::from_raw("v2.xls", v2_raw(), &LookupTables::default()).unwrap();
        for key in snap.pid_info().keys() {
            assert!(!key.is_empty());
            assert!(snap.snapshot().contains(key), "missing column {}", key);
        }
    }

    #[test]
    fn test_no_fingerprint_aborts() {
        let raw = RawTable::from_rows(vec![row(&["Frame", "Time", "Mystery"]), row(&["0", "0", "1"])]);
        let err = Snapshot::from_raw("x.xls", raw, &LookupTables::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::HeaderNotFound { .. }));
    }

    #[test]
    fn test_injected_tables_change_classification() {
        let json = r#"{ "fingerprints": [ { "pid": "Mystery", "snapshot_type": "EUD_V2" } ] }"#;
        let tables = LookupTables::from_json_str(json).unwrap();
        let raw = RawTable::from_rows(vec![row(&["Frame", "Time", "Mystery"]), row(&["0", "0", "1"])]);
        let snap = Snapshot::from_raw("x.xls", raw, &tables).unwrap();
        assert_eq!(snap.snapshot_type(), SnapshotType::EudV2);
    }

    #[test]
    fn test_explode_bits_appends_columns() {
        let mut snap = Snapshot::from_raw("v2.xls", v2_raw(), &LookupTables::default()).unwrap();
        let names = snap.explode_bits("CoETS_stCurrLimActive").unwrap();
        assert_eq!(names.len(), 4);
        assert_eq!(names[0], "CoETS_stCurrLimActive bit 0");

        let table = snap.snapshot();
        assert_eq!(table.numeric("CoETS_stCurrLimActive bit 0").unwrap(), &[Some(1.0), Some(0.0)]);
        assert_eq!(table.numeric("CoETS_stCurrLimActive bit 1").unwrap(), &[Some(0.0), Some(1.0)]);
        assert_eq!(table.numeric("CoETS_stCurrLimActive bit 2").unwrap(), &[Some(1.0), Some(1.0)]);

        // a second explode would overwrite
        assert!(matches!(
            snap.explode_bits("CoETS_stCurrLimActive"),
            Err(SnapshotError::DuplicateColumn(_))
        ));
        assert!(matches!(snap.explode_bits("nope"), Err(SnapshotError::ColumnNotFound(_))));
    }

    #[test]
    fn test_append_column_keeps_ingestion_results() {
        let mut snap = Snapshot::from_raw("v2.xls", v2_raw(), &LookupTables::default()).unwrap();
        snap.append_column("Battery V", ColumnData::Numeric(vec![Some(12.2), Some(12.3)]))
            .unwrap();
        assert_eq!(snap.snapshot().column_count(), 6);
        assert_eq!(snap.snapshot().column_names()[..2], ["Frame", "Time"]);
        assert!(snap.append_column("Short", ColumnData::Numeric(vec![])).is_err());
    }
}
