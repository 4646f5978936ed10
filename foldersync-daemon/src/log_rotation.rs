//! Size-based rotation for the audit log file.
//!
//! `sync.log` → `sync.log.1` → … → `sync.log.<keep>`; the oldest copy falls off.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default rotation threshold (10 MiB).
pub const DEFAULT_MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Number of rotated copies kept next to the live log.
pub const MAX_ROTATED_FILES: usize = 5;

/// Rotate `log_path` once it has grown to `max_bytes` or more.
///
/// Returns `true` if the live file was moved aside. A missing log is not an
/// error; the next append recreates it.
pub fn rotate_if_needed(log_path: &Path, max_bytes: u64, keep: usize) -> io::Result<bool> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if size < max_bytes || keep == 0 {
        return Ok(false);
    }

    match fs::remove_file(rotated_path(log_path, keep)) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    for n in (1..keep).rev() {
        let from = rotated_path(log_path, n);
        if from.exists() {
            fs::rename(&from, rotated_path(log_path, n + 1))?;
        }
    }
    fs::rename(log_path, rotated_path(log_path, 1))?;
    Ok(true)
}

/// `<log>.<n>`, in the same directory as the live log.
pub fn rotated_path(log_path: &Path, n: usize) -> PathBuf {
    let mut name = log_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "foldersync.log".into());
    name.push(format!(".{n}"));
    log_path.with_file_name(name)
}
