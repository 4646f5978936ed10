//! Error types for foldersync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while building or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The interval was not a positive whole number of seconds.
    #[error("invalid synchronization interval '{input}'; provide a positive integer")]
    InvalidInterval { input: String },

    /// Source and replica resolve to the same directory.
    #[error("source and replica are the same directory: {path}")]
    SameRoot { path: PathBuf },

    /// One root lives inside the other, so a pass would copy into itself.
    #[error("{inner} is nested inside {outer}; source and replica must be disjoint")]
    NestedRoots { outer: PathBuf, inner: PathBuf },

    /// The audit log sits inside a mirrored tree.
    #[error("log file {log_file} lies inside {root}; keep it outside source and replica")]
    LogInsideRoot { log_file: PathBuf, root: PathBuf },

    /// Resolving a path failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
