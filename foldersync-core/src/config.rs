//! Run configuration for a mirroring daemon.
//!
//! A [`MirrorConfig`] is built once at startup from command-line arguments and
//! validated before the scheduler is allowed to run.

use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};
use crate::types::SyncInterval;

/// Everything a daemon run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Read-only input tree.
    pub source: PathBuf,
    /// Tree made identical to `source` on every pass.
    pub replica: PathBuf,
    /// Audit log, appended to on every entry.
    pub log_file: PathBuf,
    pub interval: SyncInterval,
    /// Plan passes without touching the replica.
    pub dry_run: bool,
}

impl MirrorConfig {
    pub fn new(
        source: impl Into<PathBuf>,
        replica: impl Into<PathBuf>,
        log_file: impl Into<PathBuf>,
        interval: SyncInterval,
    ) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            log_file: log_file.into(),
            interval,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reject layouts that can never converge.
    ///
    /// Neither root has to exist yet: a missing source is a per-pass anomaly
    /// and a missing replica is created by the first pass. The log file must
    /// live outside both roots, or passes would copy or prune it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let source = resolve(&self.source)?;
        let replica = resolve(&self.replica)?;
        let log_file = resolve(&self.log_file)?;

        for root in [&source, &replica] {
            if log_file.starts_with(root) {
                return Err(ConfigError::LogInsideRoot {
                    log_file,
                    root: root.clone(),
                });
            }
        }

        if source == replica {
            return Err(ConfigError::SameRoot { path: source });
        }
        if replica.starts_with(&source) {
            return Err(ConfigError::NestedRoots {
                outer: source,
                inner: replica,
            });
        }
        if source.starts_with(&replica) {
            return Err(ConfigError::NestedRoots {
                outer: replica,
                inner: source,
            });
        }
        Ok(())
    }
}

/// Absolute, symlink-free form of `path`.
///
/// The longest existing ancestor is canonicalized and the missing tail is
/// re-appended verbatim.
fn resolve(path: &Path) -> Result<PathBuf, ConfigError> {
    let absolute = std::path::absolute(path).map_err(|e| io_err(path, e))?;

    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_owned());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }

    let mut resolved = existing
        .canonicalize()
        .map_err(|e| io_err(existing, e))?;
    for name in tail.into_iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}
