// Preamble (chain-of-custody) label/value parsing

use crate::core::constants::{FALLBACK_DATE_FORMAT, FRAME_COLUMN, MIN_DATE_LABEL_LEN, TIMESTAMP_LABEL};
use crate::core::format::{HeaderEntry, RawTable};
use crate::core::lookup::LookupTables;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%d.%m.%Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%B %d %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%b %d %Y", "%B %d %Y", "%b %d, %Y"];

/// Reads label/value pairs from columns 0 and 1 of the first `max_rows` rows.
///
/// Stops at the "Frame" row. A bare timestamp in column 0 (with column 1
/// empty) becomes the "Date / Time" entry; otherwise a "Label: value" cell in
/// column 0 overrides column 1.
/// Rows without a usable value are skipped. Encounter order is kept.
pub fn parse_header(table: &RawTable, max_rows: usize, tables: &LookupTables) -> Vec<HeaderEntry> {
    let mut entries = Vec::new();
    let nrows = max_rows.min(table.n_rows());

    for r in 0..nrows {
        let mut label = table.text(r, 0);
        if label.eq_ignore_ascii_case(FRAME_COLUMN) {
            debug!("preamble ends at data header row {}", r);
            break;
        }
        if label.is_empty() {
            continue;
        }

        let mut value = table.text(r, 1);

        // whole-cell timestamps are checked before the colon split eats "13:20:57"
        if value.is_empty() && label.chars().count() >= MIN_DATE_LABEL_LEN && looks_like_timestamp(&label) {
            value = std::mem::replace(&mut label, TIMESTAMP_LABEL.to_string());
        } else if let Some((left, right)) = label.split_once(':') {
            let right = right.trim();
            if !right.is_empty() {
                value = right.to_string();
                label = left.trim().to_string();
            }
        }

        if value.is_empty() {
            continue;
        }

        entries.push(HeaderEntry::new(tables.normalize_label(&label), value));
    }

    debug!("parsed {} preamble entries", entries.len());
    entries
}

/// Value of the first "Date / Time" entry.
pub fn find_date_time(entries: &[HeaderEntry]) -> Option<&str> {
    entries
        .iter()
        .find(|e| e.label == TIMESTAMP_LABEL)
        .map(|e| e.value.as_str())
}

/// Direct parse, then with '/' -> ' ' and '.' -> ':', then the fixed fallback format.
pub fn looks_like_timestamp(text: &str) -> bool {
    let text = text.trim();
    if parses_as_datetime(text) {
        return true;
    }
    let normalized = text.replace('/', " ").replace('.', ":");
    if parses_as_datetime(&normalized) {
        return true;
    }
    NaiveDateTime::parse_from_str(text, FALLBACK_DATE_FORMAT).is_ok()
}

fn parses_as_datetime(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(text, f).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|f| NaiveDate::parse_from_str(text, f).is_ok())
}
