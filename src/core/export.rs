// Clean copy of the normalized table as CSV

use crate::core::constants::CLEAN_SUFFIX;
use crate::core::error::Result;
use crate::core::reader::Snapshot;
use crate::core::table::NormalizedTable;
use csv::Writer;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// `<stem>_CLEAN.csv`, next to the source unless `dir` is given.
pub fn clean_path(source: &Path, dir: Option<&Path>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    let file_name = format!("{}{}.csv", stem, CLEAN_SUFFIX);
    match dir.or_else(|| source.parent()) {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

pub fn write_table<W: Write>(table: &NormalizedTable, out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(table.column_names())?;
    for r in 0..table.row_count() {
        writer.write_record(table.columns().iter().map(|c| c.data.display(r)))?;
    }
    writer.flush()?;
    Ok(())
}

impl Snapshot {
    /// Writes the normalized table to a `_CLEAN.csv` copy and returns its path.
    pub fn export_clean(&self, dir: Option<&Path>) -> Result<PathBuf> {
        let path = clean_path(self.file_path(), dir);
        let file = std::fs::File::create(&path)?;
        write_table(self.snapshot(), file)?;
        info!("clean copy written to {}", path.display());
        Ok(path)
    }
}
