// Lookup tables driving label, fingerprint and unit normalization.
// Loaded once and passed by reference into every stage; never mutated at runtime.

use crate::core::constants::TIMESTAMP_LABEL;
use crate::core::error::Result;
use crate::core::snap_type::SnapshotType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// A PID whose presence in a row marks it as the header row and names the family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub pid: String,
    pub snapshot_type: SnapshotType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursColumn {
    pub snapshot_type: SnapshotType,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessRateColumns {
    pub success_column: String,
    pub failure_column: String,
}

/// Bit-packed diagnostic column: text-forced in the export, unit not in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitStreamColumn {
    pub column: String,
    pub unit: String,
}

/// Enumerated-state signal whose unit is replaced by a legend for one family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateLegend {
    pub snapshot_type: SnapshotType,
    pub column: String,
    pub legend: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupTables {
    pub header_labels: BTreeMap<String, String>,
    pub fingerprints: Vec<Fingerprint>,
    pub units: BTreeMap<String, String>,
    pub engine_hours_columns: Vec<HoursColumn>,
    pub success_rate: SuccessRateColumns,
    pub bit_stream: BitStreamColumn,
    pub state_legends: Vec<StateLegend>,
}

impl LookupTables {
    pub fn from_json_str(data: &str) -> Result<Self> {
        let tables: LookupTables = serde_json::from_str(data)?;
        debug!(
            "lookup tables parsed: {} labels, {} fingerprints, {} units",
            tables.header_labels.len(),
            tables.fingerprints.len(),
            tables.units.len()
        );
        Ok(tables)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&data)
    }

    /// Canonical display label, or the trimmed input when unrecognized.
    ///
    /// Exact case-insensitive match first, then a match ignoring everything
    /// but letters and digits ("Program SW-Version" == "program sw version").
    pub fn normalize_label(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        let raw = trimmed.to_lowercase();

        if let Some(label) = self
            .header_labels
            .iter()
            .find(|(k, _)| k.trim().to_lowercase() == raw)
            .map(|(_, v)| v)
        {
            return label.clone();
        }

        let squished = squish(&raw);
        self.header_labels
            .iter()
            .find(|(k, _)| squish(&k.to_lowercase()) == squished)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| trimmed.to_string())
    }

    /// Display string for a raw unit token; unknown tokens come back trimmed.
    pub fn normalize_unit(&self, unit: &str) -> String {
        let trimmed = unit.trim();
        let key = trimmed.to_lowercase();
        self.units
            .iter()
            .find(|(k, _)| k.trim().to_lowercase() == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| trimmed.to_string())
    }

    /// `cell` must already be trimmed and lowercased.
    pub fn fingerprint_type(&self, cell: &str) -> Option<SnapshotType> {
        self.fingerprints
            .iter()
            .find(|f| f.pid.to_lowercase() == cell)
            .map(|f| f.snapshot_type)
    }

    pub fn engine_hours_column(&self, snapshot_type: SnapshotType) -> Option<&str> {
        self.engine_hours_columns
            .iter()
            .find(|h| h.snapshot_type == snapshot_type)
            .map(|h| h.column.as_str())
    }

    pub fn state_legend(&self, snapshot_type: SnapshotType) -> impl Iterator<Item = &StateLegend> {
        self.state_legends
            .iter()
            .filter(move |l| l.snapshot_type == snapshot_type)
    }
}

fn squish(s: &str) -> String {
    s.chars().filter(|c| c.is_alphanumeric()).collect()
}

fn owned_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for LookupTables {
    fn default() -> Self {
        let header_labels = owned_map(&[
            ("engine model", "Engine Model"),
            ("ecu map version", "ECU Map Version"),
            ("program sw version", "Program SW Version"),
            ("data logging", "Data Logging"),
            ("engine serial number", "Engine Serial Number"),
            ("machine serial number", "Machine Serial Number"),
            ("date / time", TIMESTAMP_LABEL),
            ("start time", TIMESTAMP_LABEL),
        ]);

        let fingerprints = [
            ("P_L_Battery_raw", SnapshotType::EcuV1),
            ("SMC_ENGINE_STATE", SnapshotType::EcuV1),
            ("DCU_Supply_Voltage", SnapshotType::DcuV1),
            ("EUD_Key_On_Time", SnapshotType::EudV1),
            ("BattU_u", SnapshotType::EcuV2),
            ("Epm_nEng", SnapshotType::EcuV2),
            ("EUD2_Key_On_Time", SnapshotType::EudV2),
        ]
        .into_iter()
        .map(|(pid, snapshot_type)| Fingerprint {
            pid: pid.to_string(),
            snapshot_type,
        })
        .collect();

        let units = owned_map(&[
            ("v", "Volts"),
            ("mv", "Millivolts"),
            ("a", "Amps"),
            ("ma", "Milliamps"),
            ("degc", "Degrees Celsius"),
            ("deg c", "Degrees Celsius"),
            ("°c", "Degrees Celsius"),
            ("degf", "Degrees Fahrenheit"),
            ("rpm", "RPM"),
            ("1/min", "RPM"),
            ("kpa", "Kilopascals"),
            ("hpa", "Hectopascals"),
            ("bar", "Bar"),
            ("%", "Percent"),
            ("s", "Seconds"),
            ("sec", "Seconds"),
            ("ms", "Milliseconds"),
            ("h", "Hours"),
            ("hr", "Hours"),
            ("nm", "Newton Meters"),
            ("mg/stk", "Milligrams per Stroke"),
            ("mg/hub", "Milligrams per Stroke"),
            ("kg/h", "Kilograms per Hour"),
            ("km/h", "Kilometers per Hour"),
        ]);

        let engine_hours_columns = [
            (SnapshotType::EcuV1, "TIM_Engine_run_time_nvv"),
            (SnapshotType::EcuV2, "EngDa_tiEngOn"),
            (SnapshotType::EudV1, "EUD_Engine_Hours"),
            (SnapshotType::EudV2, "EUD2_Engine_Hours"),
        ]
        .into_iter()
        .map(|(snapshot_type, column)| HoursColumn {
            snapshot_type,
            column: column.to_string(),
        })
        .collect();

        Self {
            header_labels,
            fingerprints,
            units,
            engine_hours_columns,
            success_rate: SuccessRateColumns::default(),
            bit_stream: BitStreamColumn::default(),
            state_legends: vec![StateLegend {
                snapshot_type: SnapshotType::EcuV1,
                column: "SMC_ENGINE_STATE".to_string(),
                legend: "[0]Off   [1]Cranking   [2]Running   [3]Stalling".to_string(),
            }],
        }
    }
}

impl Default for SuccessRateColumns {
    fn default() -> Self {
        Self {
            success_column: "I_C_Mdp_nb_update_success_nvv".to_string(),
            failure_column: "I_C_Mdp_nb_update_failure_nvv".to_string(),
        }
    }
}

impl Default for BitStreamColumn {
    fn default() -> Self {
        Self {
            column: "CoETS_stCurrLimActive".to_string(),
            unit: "Bit Stream".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_exact_and_fuzzy() {
        let tables = LookupTables::default();
        assert_eq!(tables.normalize_label("ENGINE MODEL"), "Engine Model");
        assert_eq!(tables.normalize_label(" Program SW-Version "), "Program SW Version");
        assert_eq!(tables.normalize_label("ProgramSWVersion"), "Program SW Version");
        assert_eq!(tables.normalize_label("  Operator  "), "Operator");
        assert_eq!(tables.normalize_label(""), "");
    }

    #[test]
    fn test_unit_table_hits_and_misses() {
        let tables = LookupTables::default();
        assert_eq!(tables.normalize_unit("v"), "Volts");
        assert_eq!(tables.normalize_unit(" V "), "Volts");
        assert_eq!(tables.normalize_unit("DegC"), "Degrees Celsius");
        assert_eq!(tables.normalize_unit("  furlongs "), "furlongs");
        assert_eq!(tables.normalize_unit(""), "");
    }

    #[test]
    fn test_every_unit_key_maps_to_its_value() {
        let tables = LookupTables::default();
        for (raw, display) in &tables.units {
            assert_eq!(&tables.normalize_unit(raw), display);
        }
    }

    #[test]
    fn test_fingerprint_lookup_is_lowercase() {
        let tables = LookupTables::default();
        assert_eq!(tables.fingerprint_type("battu_u"), Some(SnapshotType::EcuV2));
        assert_eq!(tables.fingerprint_type("p_l_battery_raw"), Some(SnapshotType::EcuV1));
        assert_eq!(tables.fingerprint_type("frame"), None);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let json = r#"{
            "units": { "psi": "Pounds per Square Inch" },
            "fingerprints": [ { "pid": "Custom_Pid", "snapshot_type": "DCU_V1" } ]
        }"#;
        let tables = LookupTables::from_json_str(json).unwrap();
        assert_eq!(tables.normalize_unit("PSI"), "Pounds per Square Inch");
        assert_eq!(tables.normalize_unit("v"), "v");
        assert_eq!(tables.fingerprint_type("custom_pid"), Some(SnapshotType::DcuV1));
        assert_eq!(tables.normalize_label("engine model"), "Engine Model");
        assert_eq!(tables.bit_stream, BitStreamColumn::default());
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = LookupTables::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::core::error::SnapshotError::Config(_)));
    }

    #[test]
    fn test_hours_column_per_type() {
        let tables = LookupTables::default();
        assert_eq!(tables.engine_hours_column(SnapshotType::EcuV2), Some("EngDa_tiEngOn"));
        assert_eq!(tables.engine_hours_column(SnapshotType::Unknown), None);
    }
}
