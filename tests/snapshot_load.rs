use calamine::{Data, Range};
use snapshot_reader::core::loader::{grid_from_range, grid_from_tab_text};
use snapshot_reader::{
    HeaderEntry, LookupTables, PidDescriptor, RawTable, Snapshot, SnapshotError, SnapshotType,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_utf16(dir: &Path, name: &str, text: &str) -> PathBuf {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn lines(rows: &[&str]) -> String {
    let mut text = rows.join("\r\n");
    text.push_str("\r\n");
    text
}

fn ecu_v2_export() -> String {
    lines(&[
        "Engine Model:\tX9\t\t\t",
        "Date / Time\t2025-11-21 13:20:57\t\t\t",
        "\t\tBattery voltage\tEngine on time\tMDP ok",
        "Frame\tTime\tBattU_u\tEngDa_tiEngOn\tI_C_Mdp_nb_update_success_nvv",
        "\ts\tmV\ts\t",
        "3\t-0.2\t12000\t7100\t1",
        "0\t0\t12100\t7200\t5",
        "1\t0.1\t12200\t7200\t5",
        "2\t0.2\t12300\t7200\t5",
    ])
}

#[test]
fn test_load_legacy_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_utf16(dir.path(), "run.xls", &ecu_v2_export());

    let snap = Snapshot::load(&path).unwrap();
    assert_eq!(snap.file_name(), "run.xls");
    assert_eq!(snap.header_row(), 3);
    assert_eq!(snap.snapshot_type(), SnapshotType::EcuV2);
    assert_eq!(snap.date_time(), "2025-11-21 13:20:57");
    assert_eq!(
        snap.header_list(),
        &[
            HeaderEntry::new("Engine Model", "X9"),
            HeaderEntry::new("Date / Time", "2025-11-21 13:20:57"),
        ]
    );

    let table = snap.snapshot();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.frame().unwrap(), &[Some(0.0), Some(1.0), Some(2.0)]);
    assert_eq!(table.time().unwrap(), &[Some(0.0), Some(0.1), Some(0.2)]);
    assert_eq!(table.value_at_frame_zero("BattU_u"), Some(12100.0));

    assert_eq!(
        snap.pid_info().get("BattU_u"),
        Some(&PidDescriptor::new("Battery voltage", "Millivolts"))
    );
    assert_eq!(snap.hours(), 2.0);
    // failure column absent
    assert_eq!(snap.mdp_success_rate(), 0.0);
    assert!(snap.warnings().is_empty());
}

#[test]
fn test_load_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = write_utf16(dir.path(), "run.xls", &ecu_v2_export());

    let first = Snapshot::load(&path).unwrap();
    let second = Snapshot::load(&path).unwrap();
    assert_eq!(first.snapshot(), second.snapshot());
    assert_eq!(first.pid_info(), second.pid_info());
    assert_eq!(first.header_list(), second.header_list());
}

#[test]
fn test_frame_and_time_names_are_forced() {
    let dir = TempDir::new().unwrap();
    let text = lines(&[
        "Sample #\tSecs\tBattU_u",
        "0\t0\t12.0",
        "1\t0.5\t12.1",
    ]);
    let path = write_utf16(dir.path(), "renamed.xls", &text);

    let snap = Snapshot::load(&path).unwrap();
    let names = snap.snapshot().column_names();
    assert_eq!(names[0], "Frame");
    assert_eq!(names[1], "Time");
    assert_eq!(names[2], "BattU_u");
}

#[test]
fn test_rows_before_frame_zero_are_dropped() {
    let dir = TempDir::new().unwrap();
    let text = lines(&[
        "Frame\tTime\tBattU_u",
        "5\t-0.5\t1",
        "4\t-0.4\t2",
        "3\t-0.3\t3",
        "2\t-0.2\t4",
        "1\t-0.1\t5",
        "0\t0\t6",
        "1\t0.1\t7",
        "2\t0.2\t8",
    ]);
    let path = write_utf16(dir.path(), "pre.xls", &text);

    let snap = Snapshot::load(&path).unwrap();
    let table = snap.snapshot();
    assert_eq!(table.frame().unwrap(), &[Some(0.0), Some(1.0), Some(2.0)]);
    assert_eq!(table.numeric("BattU_u").unwrap(), &[Some(6.0), Some(7.0), Some(8.0)]);
}

#[test]
fn test_missing_frame_zero_keeps_rows_with_warning() {
    let dir = TempDir::new().unwrap();
    let text = lines(&["Frame\tTime\tBattU_u", "4\t0\t1", "5\t0.1\t2"]);
    let path = write_utf16(dir.path(), "nozero.xls", &text);

    let snap = Snapshot::load(&path).unwrap();
    assert_eq!(snap.snapshot().row_count(), 2);
    assert_eq!(snap.warnings().len(), 1);
    assert!(snap.warnings()[0].contains("Frame == 0"));
}

#[test]
fn test_pid_keys_match_columns() {
    let dir = TempDir::new().unwrap();
    let path = write_utf16(dir.path(), "run.xls", &ecu_v2_export());

    let snap = Snapshot::load(&path).unwrap();
    assert!(!snap.pid_info().is_empty());
    for key in snap.pid_info().keys() {
        assert!(!key.is_empty());
        assert!(snap.snapshot().contains(key), "no column for {}", key);
    }
}

#[test]
fn test_preamble_stops_at_frame_row() {
    let dir = TempDir::new().unwrap();
    let text = lines(&[
        "Engine Model:\tX9\t",
        "\t\t",
        "Frame\tTime\tBattU_u",
        "0\t0\t12.0",
    ]);
    let path = write_utf16(dir.path(), "preamble.xls", &text);

    let snap = Snapshot::load(&path).unwrap();
    assert_eq!(snap.header_list(), &[HeaderEntry::new("Engine Model", "X9")]);
    assert_eq!(snap.date_time(), "");
}

#[test]
fn test_legacy_grid_matches_spreadsheet_range() {
    let dir = TempDir::new().unwrap();
    let values = [
        ["a1", "b1", "c1", "d1"],
        ["a2", "b2", "c2", "d2"],
        ["a3", "b3", "c3", "d3"],
    ];
    let joined: Vec<String> = values.iter().map(|r| r.join("\t")).collect();
    let refs: Vec<&str> = joined.iter().map(String::as_str).collect();
    let text = lines(&refs);
    let path = write_utf16(dir.path(), "grid.xls", &text);

    let legacy = snapshot_reader::core::loader::load(&path).unwrap();
    assert_eq!(legacy.shape(), (3, 4));

    let mut range: Range<Data> = Range::new((0, 0), (2, 3));
    for (r, row) in values.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            range.set_value((r as u32, c as u32), Data::String(v.to_string()));
        }
    }
    let modern: RawTable = grid_from_range(&range);
    assert_eq!(legacy, modern);
    assert_eq!(legacy, grid_from_tab_text(&text));
}

#[test]
fn test_fingerprint_window_boundary() {
    let dir = TempDir::new().unwrap();
    let mut rows: Vec<String> = (0..9).map(|i| format!("note {}\t\t", i)).collect();
    rows.push("Frame\tTime\tBattU_u".to_string());
    rows.push("0\t0\t1".to_string());
    let at_nine = rows.join("\n");
    let path = write_utf16(dir.path(), "nine.xls", &at_nine);
    let snap = Snapshot::load(&path).unwrap();
    assert_eq!(snap.header_row(), 9);
    assert_eq!(snap.snapshot_type(), SnapshotType::EcuV2);

    rows.insert(0, "note x\t\t".to_string());
    let at_ten = rows.join("\n");
    let path = write_utf16(dir.path(), "ten.xls", &at_ten);
    let err = Snapshot::load(&path).unwrap_err();
    assert!(matches!(err, SnapshotError::HeaderNotFound { scanned_rows: 10 }));
    assert!(err.to_string().contains("first 10 rows"));
}

#[test]
fn test_injected_tables_drive_units() {
    let dir = TempDir::new().unwrap();
    let text = lines(&[
        "\t\tBattery Voltage",
        "Frame\tTime\tBattU_u",
        "\t\tvlt",
        "0\t0\t12.0",
    ]);
    let path = write_utf16(dir.path(), "units.xls", &text);

    let json = r#"{ "units": { "vlt": "Volts" } }"#;
    let tables = LookupTables::from_json_str(json).unwrap();
    let snap = Snapshot::load_with(&path, &tables).unwrap();
    assert_eq!(snap.pid_info()["BattU_u"].unit, "Volts");

    // built-in tables pass the token through
    let snap = Snapshot::load(&path).unwrap();
    assert_eq!(snap.pid_info()["BattU_u"].unit, "vlt");
}

#[test]
fn test_export_clean_writes_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_utf16(dir.path(), "run.xls", &ecu_v2_export());
    let out_dir = TempDir::new().unwrap();

    let snap = Snapshot::load(&path).unwrap();
    let written = snap.export_clean(Some(out_dir.path())).unwrap();
    assert_eq!(written, out_dir.path().join("run_CLEAN.csv"));

    let mut reader = csv::Reader::from_path(&written).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "Frame");
    assert_eq!(&headers[1], "Time");
    assert_eq!(reader.records().count(), 3);
}

#[test]
fn test_unsupported_and_unreadable_files() {
    let dir = TempDir::new().unwrap();

    let csv_path = dir.path().join("run.csv");
    std::fs::write(&csv_path, "Frame,Time\n0,0\n").unwrap();
    assert!(matches!(
        Snapshot::load(&csv_path),
        Err(SnapshotError::UnsupportedFormat(ext)) if ext == "csv"
    ));

    let bogus = dir.path().join("broken.xlsx");
    std::fs::write(&bogus, b"not a zip archive").unwrap();
    let err = Snapshot::load(&bogus).unwrap_err();
    assert!(matches!(err, SnapshotError::LoadFailed { .. }));

    let empty = write_utf16(dir.path(), "empty.xls", "");
    assert!(matches!(Snapshot::load(&empty), Err(SnapshotError::EmptyTable(_))));

    let missing = dir.path().join("missing.xls");
    assert!(matches!(Snapshot::load(&missing), Err(SnapshotError::LoadFailed { .. })));
}
