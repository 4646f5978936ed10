//! Outcome of a single mirror pass.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// MirrorAction
// ---------------------------------------------------------------------------

/// One side effect applied to the replica (or planned, in dry-run), or a skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MirrorAction {
    CreatedDir { path: PathBuf },
    CreatedFile { path: PathBuf },
    UpdatedFile { path: PathBuf },
    DeletedFile { path: PathBuf },
    DeletedDir { path: PathBuf },
    /// Left untouched for this pass.
    Skipped { path: PathBuf, reason: String },
}

impl MirrorAction {
    pub fn path(&self) -> &Path {
        match self {
            MirrorAction::CreatedDir { path }
            | MirrorAction::CreatedFile { path }
            | MirrorAction::UpdatedFile { path }
            | MirrorAction::DeletedFile { path }
            | MirrorAction::DeletedDir { path }
            | MirrorAction::Skipped { path, .. } => path,
        }
    }

    /// Everything except [`MirrorAction::Skipped`].
    pub fn is_mutation(&self) -> bool {
        !matches!(self, MirrorAction::Skipped { .. })
    }

    /// Audit line for this action.
    pub fn message(&self, dry_run: bool) -> String {
        let (done, planned) = match self {
            MirrorAction::CreatedDir { .. } => ("Created directory", "create directory"),
            MirrorAction::CreatedFile { .. } => ("Created file", "create file"),
            MirrorAction::UpdatedFile { .. } => ("Updated file", "update file"),
            MirrorAction::DeletedFile { .. } => ("Deleted file", "delete file"),
            MirrorAction::DeletedDir { .. } => ("Deleted directory", "delete directory"),
            MirrorAction::Skipped { path, reason } => {
                return format!("Skipping: {} ({reason})", path.display());
            }
        };
        if dry_run {
            format!("[dry-run] would {planned}: {}", self.path().display())
        } else {
            format!("{done}: {}", self.path().display())
        }
    }
}

// ---------------------------------------------------------------------------
// PassStatus / PassReport
// ---------------------------------------------------------------------------

/// How far a pass got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    /// The whole tree was walked (individual entries may still be skipped).
    Completed,
    /// Source root was absent; the replica was left alone.
    SourceMissing,
    /// Replica root could not be created or is not a directory.
    ReplicaUnavailable,
}

/// Summary of one call to [`MirrorEngine::run_pass`](crate::MirrorEngine::run_pass).
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
    pub dry_run: bool,
    pub status: PassStatus,
    pub actions: Vec<MirrorAction>,
}

impl PassReport {
    /// Applied (or planned) changes, skips excluded.
    pub fn mutations(&self) -> impl Iterator<Item = &MirrorAction> {
        self.actions.iter().filter(|a| a.is_mutation())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &MirrorAction> {
        self.actions.iter().filter(|a| !a.is_mutation())
    }

    /// True when the pass left the replica exactly as it found it.
    pub fn is_noop(&self) -> bool {
        self.mutations().next().is_none()
    }

    pub fn counts(&self) -> PassCounts {
        let mut counts = PassCounts::default();
        for action in &self.actions {
            match action {
                MirrorAction::CreatedFile { .. } | MirrorAction::UpdatedFile { .. } => {
                    counts.copied += 1
                }
                MirrorAction::CreatedDir { .. } => counts.created_dirs += 1,
                MirrorAction::DeletedFile { .. } | MirrorAction::DeletedDir { .. } => {
                    counts.deleted += 1
                }
                MirrorAction::Skipped { .. } => counts.skipped += 1,
            }
        }
        counts
    }
}

/// Per-kind tallies used in the completion line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassCounts {
    pub copied: usize,
    pub created_dirs: usize,
    pub deleted: usize,
    pub skipped: usize,
}

impl fmt::Display for PassCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} copied, {} directories created, {} deleted, {} skipped",
            self.copied, self.created_dirs, self.deleted, self.skipped
        )
    }
}
