//! Error types for foldersync-sync.

use thiserror::Error;

/// Errors that escape a mirror pass.
///
/// Filesystem failures never show up here: they are logged, recorded as
/// skips in the [`PassReport`](crate::PassReport) and the pass moves on.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The audit log sink rejected a write.
    #[error("log sink error: {0}")]
    Log(#[source] std::io::Error),
}
