use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the scheduler, the log sink and runtime startup.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] foldersync_core::ConfigError),

    #[error("sync error: {0}")]
    Sync(#[from] foldersync_sync::SyncError),

    #[error("pass task join failure: {0}")]
    Join(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
