//! Audit log sink: timestamped lines appended to a file and echoed to the
//! terminal in a per-level colour.
//!
//! Line format: `<yyyy-MM-dd HH:mm:ss> - <LEVEL>: <message>` (local time).

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use colored::{Color, Colorize};

use foldersync_core::LogLevel;
use foldersync_sync::MirrorLog;

use crate::error::{io_err, DaemonError};
use crate::log_rotation::{rotate_if_needed, DEFAULT_MAX_LOG_BYTES, MAX_ROTATED_FILES};

/// Knobs for [`FileLog`] that come from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkOptions {
    /// Echo each line to stdout.
    pub console: bool,
    /// Rotate once the file reaches this size; `None` never rotates.
    pub max_bytes: Option<u64>,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            console: true,
            max_bytes: Some(DEFAULT_MAX_LOG_BYTES),
        }
    }
}

/// Appends every entry to a single log file.
///
/// The file is reopened in append mode for each entry so that rotation (or an
/// operator moving the file away) never leaves a stale handle behind.
#[derive(Debug)]
pub struct FileLog {
    path: PathBuf,
    options: SinkOptions,
    /// Serialises rotation + append across threads.
    write_lock: Mutex<()>,
}

impl FileLog {
    /// Open (creating if needed) the log file at `path`.
    ///
    /// Fails if the file cannot be opened for appending; the daemon treats
    /// that as fatal at startup.
    pub fn open(path: impl Into<PathBuf>, options: SinkOptions) -> Result<Self, DaemonError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        append_handle(&path).map_err(|e| io_err(&path, e))?;
        Ok(Self {
            path,
            options,
            write_lock: Mutex::new(()),
        })
    }

    fn append(&self, line: &str) -> io::Result<()> {
        if let Some(max_bytes) = self.options.max_bytes {
            match rotate_if_needed(&self.path, max_bytes, MAX_ROTATED_FILES) {
                Ok(true) => tracing::info!(path = %self.path.display(), "log file rotated"),
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), error = %err, "log rotation failed")
                }
            }
        }
        let mut file = append_handle(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl MirrorLog for FileLog {
    fn log(&self, level: LogLevel, message: &str) -> io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let line = format_entry(Local::now(), level, message);

        if self.options.console {
            // The terminal copy is best effort; the file is the record.
            let _ = writeln!(io::stdout().lock(), "{}", line.color(level_color(level)));
        }
        self.append(&line)
    }
}

/// Render one log line.
pub fn format_entry(at: DateTime<Local>, level: LogLevel, message: &str) -> String {
    format!("{} - {level}: {message}", at.format("%Y-%m-%d %H:%M:%S"))
}

/// Terminal colour per level: gray, dark yellow, red.
pub fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Info => Color::White,
        LogLevel::Warning => Color::Yellow,
        LogLevel::Error => Color::Red,
    }
}

fn append_handle(path: &Path) -> io::Result<fs::File> {
    OpenOptions::new().create(true).append(true).open(path)
}
