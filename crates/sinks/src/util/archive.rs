//! Archive naming for rotated files
//!
//! A rotated file moves into a `log_archive/` directory next to it, with the
//! rotation time inserted before the first extension of its name:
//!
//! ```text
//! /data/tor.log.xz  ->  /data/log_archive/tor_2025-01-15_10:30:45.log.xz
//! /data/out.log     ->  /data/log_archive/out_2025-01-15_10:30:45.log
//! /data/events      ->  /data/log_archive/events_2025-01-15_10:30:45
//! ```
//!
//! The directory is never created here; rotation fails if it is missing.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Directory (sibling of the active file) that receives rotated files
pub const ARCHIVE_DIR: &str = "log_archive";

/// Timestamp format embedded into archive names
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Format a rotation time for use in an archive name
pub fn archive_timestamp(at: DateTime<Local>) -> String {
    at.format(ARCHIVE_TIMESTAMP_FORMAT).to_string()
}

/// Compute the archive path for `path` rotated at `timestamp`
///
/// Returns `None` when `path` has no UTF-8 file name to rewrite.
pub fn archive_path(path: &Path, timestamp: &str) -> Option<PathBuf> {
    let base = path.file_name()?.to_str()?;

    // A leading dot belongs to the stem: ".hidden.log" -> ".hidden_<ts>.log"
    let split = base
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '.')
        .map_or(base.len(), |(i, _)| i);
    let (stem, rest) = base.split_at(split);

    let archived = format!("{stem}_{timestamp}{rest}");
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    Some(dir.join(ARCHIVE_DIR).join(archived))
}

#[cfg(test)]
#[path = "archive_test.rs"]
mod archive_test;
