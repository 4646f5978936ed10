//! # foldersync-sync
//!
//! One-way mirror engine.
//!
//! Build a [`MirrorEngine`] with a source root, a replica root and a
//! [`MirrorLog`] sink, then call [`MirrorEngine::run_pass`] to make the
//! replica byte-identical to the source. Each pass is self-contained: nothing
//! is cached between passes and identity is recomputed from file contents.

pub mod access;
pub mod engine;
pub mod error;
pub mod identity;
pub mod report;
pub mod sink;

pub use access::{can_access, EntryKind};
pub use engine::MirrorEngine;
pub use error::SyncError;
pub use identity::{file_digest, files_identical};
pub use report::{MirrorAction, PassCounts, PassReport, PassStatus};
pub use sink::{LogEntry, MirrorLog, RecordingLog};
