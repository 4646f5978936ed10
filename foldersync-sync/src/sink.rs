//! Audit log sinks for the mirror engine.
//!
//! The engine never writes to a global logger. It is handed a [`MirrorLog`]
//! at construction and reports every mutation and every skip through it.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use foldersync_core::LogLevel;

/// A sink for leveled audit messages.
///
/// Implementations must be usable behind a shared reference; a failed write
/// is returned to the caller, which treats it as fatal for the pass.
pub trait MirrorLog {
    fn log(&self, level: LogLevel, message: &str) -> io::Result<()>;

    fn info(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Info, message)
    }

    fn warning(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Warning, message)
    }

    fn error(&self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Error, message)
    }
}

impl<T: MirrorLog + ?Sized> MirrorLog for &T {
    fn log(&self, level: LogLevel, message: &str) -> io::Result<()> {
        (**self).log(level, message)
    }
}

impl<T: MirrorLog + ?Sized> MirrorLog for Arc<T> {
    fn log(&self, level: LogLevel, message: &str) -> io::Result<()> {
        (**self).log(level, message)
    }
}

// ---------------------------------------------------------------------------
// RecordingLog
// ---------------------------------------------------------------------------

/// One captured audit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Keeps every message in memory. Used to assert on engine behaviour.
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<LogEntry>>,
    failing: bool,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every write fails, as if the log file became unwritable.
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    /// Messages at `level` only.
    pub fn at_level(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    /// True if any message at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MirrorLog for RecordingLog {
    fn log(&self, level: LogLevel, message: &str) -> io::Result<()> {
        if self.failing {
            return Err(io::Error::other("recording log is closed"));
        }
        self.lock().push(LogEntry {
            level,
            message: message.to_owned(),
        });
        Ok(())
    }
}
