// Snapshot decoder
// Main library entry point

pub mod core;

// Re-export main types
pub use core::error::{Result, SnapshotError};
pub use core::format::{Cell, HeaderEntry, PidDescriptor, PidInfo, RawTable};
pub use core::lookup::LookupTables;
pub use core::reader::Snapshot;
pub use core::scrub::{CoercionOutcome, ColumnCoercion};
pub use core::snap_type::{description_of, SnapshotType};
pub use core::table::{Column, ColumnData, NormalizedTable};
pub use core::data_handle::handle_ws_fetch;

#[cfg(test)]
mod tests {
    #[test]
    fn test_constants() {
        use crate::core::constants::*;
        assert_eq!(FRAME_COLUMN, "Frame");
        assert_eq!(TIME_COLUMN, "Time");
        assert_eq!(HEADER_SCAN_ROWS, 10);
        assert_eq!(PREAMBLE_SCAN_ROWS, 5);
    }
}
