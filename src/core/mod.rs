pub mod classify;
pub mod constants;
pub mod data_handle;
pub mod derived;
pub mod error;
pub mod export;
pub mod format;
pub mod header;
pub mod loader;
pub mod lookup;
pub mod pid_meta;
pub mod reader;
pub mod scrub;
pub mod snap_type;
pub mod table;
