// Layout constants for snapshot exports

// Rows searched for a fingerprint PID (header row)
pub const HEADER_SCAN_ROWS: usize = 10;

// Rows searched for chain-of-custody label/value pairs
pub const PREAMBLE_SCAN_ROWS: usize = 5;

// First signal column; columns 0 and 1 are frame counter and time
pub const PID_START_COLUMN: usize = 2;

pub const FRAME_COLUMN: &str = "Frame";
pub const TIME_COLUMN: &str = "Time";

pub const TIMESTAMP_LABEL: &str = "Date / Time";

// Dates shorter than this are not worth a parse attempt ("Nov 1 25" is not a timestamp)
pub const MIN_DATE_LABEL_LEN: usize = 9;

// Fallback format for "Nov 21 2025/13.20.57"
pub const FALLBACK_DATE_FORMAT: &str = "%b %d %Y/%H.%M.%S";

pub const SECONDS_PER_HOUR: f64 = 3600.0;

pub const XLSX_EXTENSION: &str = "xlsx";
// Not a real BIFF workbook: UTF-16 tab-delimited text
pub const LEGACY_EXTENSION: &str = "xls";

pub const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
pub const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

pub const CLEAN_SUFFIX: &str = "_CLEAN";
