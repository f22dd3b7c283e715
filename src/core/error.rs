// Error handling for snapshot ingestion

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("couldn't read {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: BoxedCause,
    },

    #[error("unsupported file extension: {0:?} (expected .xlsx or .xls)")]
    UnsupportedFormat(String),

    #[error("the workbook {0} loaded but no data table was found")]
    EmptyTable(PathBuf),

    #[error("couldn't locate a known signal fingerprint in the first {scanned_rows} rows")]
    HeaderNotFound { scanned_rows: usize },

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column already exists: {0}")]
    DuplicateColumn(String),

    #[error("column {name} has {got} values, table has {expected} rows")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("lookup table config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    pub(crate) fn load_failed<E>(path: impl Into<PathBuf>, cause: E) -> Self
    where
        E: Into<BoxedCause>,
    {
        SnapshotError::LoadFailed {
            path: path.into(),
            source: cause.into(),
        }
    }

    /// True for the kinds that abort `Snapshot::load`.
    pub fn is_fatal_load_error(&self) -> bool {
        matches!(
            self,
            SnapshotError::LoadFailed { .. }
                | SnapshotError::UnsupportedFormat(_)
                | SnapshotError::EmptyTable(_)
                | SnapshotError::HeaderNotFound { .. }
        )
    }
}
