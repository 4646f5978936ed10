//! Domain types shared by the engine, the daemon and the CLI.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// SyncInterval
// ---------------------------------------------------------------------------

/// Delay between two mirror passes, in whole seconds. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncInterval(u64);

impl SyncInterval {
    /// Build an interval from a second count; zero is rejected.
    pub fn from_secs(secs: u64) -> Result<Self, ConfigError> {
        if secs == 0 {
            return Err(ConfigError::InvalidInterval {
                input: secs.to_string(),
            });
        }
        Ok(Self(secs))
    }

    pub fn as_secs(self) -> u64 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl FromStr for SyncInterval {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidInterval {
            input: s.to_owned(),
        };
        // `u64` parsing already rejects signs other than `+`, so negatives fail here.
        let secs: u64 = s.trim().parse().map_err(|_| invalid())?;
        Self::from_secs(secs).map_err(|_| invalid())
    }
}

impl fmt::Display for SyncInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

// ---------------------------------------------------------------------------
// LogLevel
// ---------------------------------------------------------------------------

/// Severity of an audit log entry. The engine emits nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
