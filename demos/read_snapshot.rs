// Loads a snapshot export and prints what the ingestion pipeline found

use snapshot_reader::{Result, Snapshot};
use tracing::{debug, info, warn, Level};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/snapshot.xls".to_string());

    let mut snapshot = Snapshot::load(&path)?;

    info!("{} ({})", snapshot.file_name(), snapshot.snapshot_type());
    if !snapshot.date_time().is_empty() {
        info!("Recorded: {}", snapshot.date_time());
    }
    for entry in snapshot.header_list() {
        debug!("  {}: {}", entry.label, entry.value);
    }

    info!("Signals:");
    for (pid, meta) in snapshot.pid_info() {
        info!("  {} [{}] {}", pid, meta.unit, meta.description);
    }

    let table = snapshot.snapshot();
    info!("{} rows x {} columns", table.row_count(), table.column_count());
    if let Some(time) = table.time() {
        let span = time.iter().flatten().cloned().fold(0.0_f64, f64::max);
        info!("Recording length: {:.1} s", span);
    }

    info!("Engine hours: {:.1}", snapshot.hours());
    info!("MDP success rate: {:.0}%", snapshot.mdp_success_rate());

    for coercion in snapshot.coercion_report() {
        debug!("  {:?}", coercion);
    }
    for w in snapshot.warnings() {
        warn!("{}", w);
    }

    let bits = snapshot.explode_bits("CoETS_stCurrLimActive").unwrap_or_default();
    if !bits.is_empty() {
        info!("Exploded {} bit columns", bits.len());
    }

    let clean = snapshot.export_clean(None)?;
    info!("Clean copy: {}", clean.display());

    Ok(())
}
