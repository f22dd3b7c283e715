// Display-only metrics computed from the normalized table.
// Any missing column or unreadable value yields 0.0; these never fail a load.

use crate::core::constants::SECONDS_PER_HOUR;
use crate::core::format::PidInfo;
use crate::core::lookup::LookupTables;
use crate::core::snap_type::SnapshotType;
use crate::core::table::NormalizedTable;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DerivedMetrics {
    pub engine_hours: f64,
    pub success_rate: f64,
}

impl DerivedMetrics {
    pub fn compute(
        table: &NormalizedTable,
        snapshot_type: SnapshotType,
        pid_info: &PidInfo,
        tables: &LookupTables,
    ) -> Self {
        Self {
            engine_hours: engine_hours(table, snapshot_type, pid_info, tables),
            success_rate: success_rate(table, tables),
        }
    }
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Engine hours at Frame == 0, converted from seconds when the unit says so.
pub fn engine_hours(
    table: &NormalizedTable,
    snapshot_type: SnapshotType,
    pid_info: &PidInfo,
    tables: &LookupTables,
) -> f64 {
    let Some(column) = tables.engine_hours_column(snapshot_type) else {
        return 0.0;
    };
    let Some(raw) = table.value_at_frame_zero(column) else {
        debug!("no engine hours value for {} at Frame == 0", column);
        return 0.0;
    };
    if !raw.is_finite() {
        return 0.0;
    }

    let in_seconds = pid_info
        .get(column)
        .is_some_and(|d| d.unit.to_lowercase().contains("second"));

    if in_seconds {
        round_tenth(raw / SECONDS_PER_HOUR)
    } else {
        round_tenth(raw)
    }
}

/// success / (success + failure) * 100 at Frame == 0.
pub fn success_rate(table: &NormalizedTable, tables: &LookupTables) -> f64 {
    let cols = &tables.success_rate;
    let success = table.value_at_frame_zero(&cols.success_column);
    let failure = table.value_at_frame_zero(&cols.failure_column);

    match (success, failure) {
        (Some(s), Some(f)) => {
            let total = s + f;
            if total == 0.0 || !total.is_finite() {
                0.0
            } else {
                round_tenth(s / total * 100.0)
            }
        }
        _ => 0.0,
    }
}
