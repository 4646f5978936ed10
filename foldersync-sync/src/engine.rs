//! Mirror engine — one-way tree synchronization.
//!
//! ## Pass protocol
//!
//! 1. Refuse to touch anything if the source root is missing.
//! 2. Create the replica root if needed.
//! 3. Per directory pair `(S, R)`, depth first:
//!    - probe `S`; an unreadable directory skips the whole subtree;
//!    - copy every file of `S` that is missing from `R` or differs by content;
//!    - ensure every subdirectory of `S` exists in `R`, then descend;
//!    - prune entries of `R` that have no same-named entry of the same type
//!      in `S`. Source entries of unknown type shield every replica entry of
//!      their name.
//!
//! Every filesystem failure is logged and recorded as a skip at the narrowest
//! scope. Only a failing log sink ends a pass early.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;

use crate::access::{can_access, EntryKind};
use crate::error::SyncError;
use crate::identity::files_identical;
use crate::report::{MirrorAction, PassReport, PassStatus};
use crate::sink::MirrorLog;

/// Makes a replica tree match a source tree.
#[derive(Debug)]
pub struct MirrorEngine<L> {
    source: PathBuf,
    replica: PathBuf,
    log: L,
    dry_run: bool,
}

impl<L: MirrorLog> MirrorEngine<L> {
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>, log: L) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            log,
            dry_run: false,
        }
    }

    /// Plan passes instead of applying them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run one full pass.
    ///
    /// Returns `Err` only when the log sink fails; everything else is
    /// reported in the [`PassReport`].
    pub fn run_pass(&self) -> Result<PassReport, SyncError> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let mut pass = Pass {
            log: &self.log,
            dry_run: self.dry_run,
            actions: Vec::new(),
            ancestors: Vec::new(),
            conflicts: HashSet::new(),
        };
        pass.info("Starting synchronization...")?;
        let status = pass.run(&self.source, &self.replica)?;

        let report = PassReport {
            started_at,
            duration_ms: clock.elapsed().as_millis(),
            dry_run: self.dry_run,
            status,
            actions: pass.actions,
        };

        if status == PassStatus::Completed {
            let prefix = if self.dry_run { "[dry-run] " } else { "" };
            self.log
                .info(&format!(
                    "{prefix}Synchronization completed ({})",
                    report.counts()
                ))
                .map_err(SyncError::Log)?;
        }
        tracing::debug!(
            "pass finished in {} ms with status {:?}",
            report.duration_ms,
            report.status
        );
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Pass state
// ---------------------------------------------------------------------------

struct Pass<'a, L> {
    log: &'a L,
    dry_run: bool,
    actions: Vec<MirrorAction>,
    /// Canonical paths of the source directories currently being descended.
    ancestors: Vec<PathBuf>,
    /// Replica paths already handled as type conflicts; prune leaves them be.
    conflicts: HashSet<PathBuf>,
}

impl<L: MirrorLog> Pass<'_, L> {
    fn run(&mut self, source: &Path, replica: &Path) -> Result<PassStatus, SyncError> {
        if !source.is_dir() {
            self.error(&format!(
                "Source folder does not exist: {}. Skipping this pass.",
                source.display()
            ))?;
            return Ok(PassStatus::SourceMissing);
        }

        // The root itself may be a symlink to the real replica directory.
        match fs::metadata(replica) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                self.error(&format!(
                    "Replica path is not a directory: {}. Skipping this pass.",
                    replica.display()
                ))?;
                return Ok(PassStatus::ReplicaUnavailable);
            }
            Err(_) => {
                let created = MirrorAction::CreatedDir {
                    path: replica.to_path_buf(),
                };
                if self.dry_run {
                    self.record(created)?;
                } else if let Err(err) = fs::create_dir_all(replica) {
                    self.error(&format!(
                        "Cannot create replica folder {}: {err}. Skipping this pass.",
                        replica.display()
                    ))?;
                    return Ok(PassStatus::ReplicaUnavailable);
                } else {
                    self.record(created)?;
                }
            }
        }

        self.sync_dir(source, replica)?;
        Ok(PassStatus::Completed)
    }

    fn sync_dir(&mut self, source: &Path, replica: &Path) -> Result<(), SyncError> {
        let canonical = source.canonicalize().ok();
        if let Some(canonical) = &canonical {
            if self.ancestors.contains(canonical) {
                return self.skip(source, "directory cycle through a symbolic link");
            }
        }

        if !can_access(source, EntryKind::Directory, self.log)? {
            return self.skip(source, "directory not accessible");
        }
        let listing = match Listing::read(source, Follow::Links) {
            Ok(listing) => listing,
            Err(err) => return self.skip(source, &err.to_string()),
        };
        for (name, err) in &listing.unreadable {
            self.skip(&source.join(name), &err.to_string())?;
        }

        if let Some(canonical) = &canonical {
            self.ancestors.push(canonical.clone());
        }

        for name in &listing.files {
            self.sync_file(&source.join(name), &replica.join(name))?;
        }
        for name in &listing.dirs {
            let child = replica.join(name);
            if self.ensure_dir(&child)? {
                self.sync_dir(&source.join(name), &child)?;
            }
        }
        self.prune(&listing, replica)?;

        if canonical.is_some() {
            self.ancestors.pop();
        }
        Ok(())
    }

    fn sync_file(&mut self, source: &Path, replica: &Path) -> Result<(), SyncError> {
        let existing = kind_of(replica);
        if existing == Some(Kind::File) {
            match files_identical(source, replica) {
                Ok(true) => {
                    tracing::debug!("unchanged: {}", replica.display());
                    return Ok(());
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::debug!("comparison failed for {}: {err}", source.display());
                }
            }
        }

        if !can_access(source, EntryKind::File, self.log)? {
            return self.skip(source, "file not accessible");
        }

        let action = match existing {
            Some(Kind::File) => MirrorAction::UpdatedFile {
                path: replica.to_path_buf(),
            },
            Some(kind) => {
                if !self.remove_conflict(replica, kind)? {
                    return Ok(());
                }
                MirrorAction::CreatedFile {
                    path: replica.to_path_buf(),
                }
            }
            None => MirrorAction::CreatedFile {
                path: replica.to_path_buf(),
            },
        };
        self.apply(action, || fs::copy(source, replica).map(drop))?;
        Ok(())
    }

    /// Make sure `replica` is a real directory. Returns whether it is (or, in
    /// dry-run, would be) safe to descend into it.
    fn ensure_dir(&mut self, replica: &Path) -> Result<bool, SyncError> {
        match kind_of(replica) {
            Some(Kind::Dir) => return Ok(true),
            Some(kind) => {
                if !self.remove_conflict(replica, kind)? {
                    return Ok(false);
                }
            }
            None => {}
        }
        let action = MirrorAction::CreatedDir {
            path: replica.to_path_buf(),
        };
        self.apply(action, || fs::create_dir(replica))
    }

    /// Delete whatever sits at `replica` so an entry of the other type can
    /// take its place.
    fn remove_conflict(&mut self, replica: &Path, kind: Kind) -> Result<bool, SyncError> {
        let path = replica.to_path_buf();
        self.conflicts.insert(path.clone());
        match kind {
            Kind::Dir => self.apply(MirrorAction::DeletedDir { path }, || {
                fs::remove_dir_all(replica)
            }),
            Kind::File | Kind::Other => {
                self.apply(MirrorAction::DeletedFile { path }, || fs::remove_file(replica))
            }
        }
    }

    fn prune(&mut self, source: &Listing, replica: &Path) -> Result<(), SyncError> {
        let existing = match Listing::read(replica, Follow::NoLinks) {
            Ok(listing) => listing,
            // Dry-run descends into directories it only planned to create.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(_) if self.dry_run && kind_of(replica) != Some(Kind::Dir) => return Ok(()),
            Err(err) => return self.skip(replica, &format!("cannot list for pruning: {err}")),
        };

        for name in &existing.files {
            if !source.keeps_file(name) {
                self.prune_entry(replica.join(name), Kind::File)?;
            }
        }
        for (name, _) in &existing.unreadable {
            if !source.keeps_any(name) {
                self.prune_entry(replica.join(name), Kind::Other)?;
            }
        }
        for name in &existing.dirs {
            if !source.keeps_dir(name) {
                self.prune_entry(replica.join(name), Kind::Dir)?;
            }
        }
        Ok(())
    }

    fn prune_entry(&mut self, path: PathBuf, kind: Kind) -> Result<(), SyncError> {
        if self.conflicts.contains(&path) {
            return Ok(());
        }
        match kind {
            Kind::Dir => self.apply(MirrorAction::DeletedDir { path: path.clone() }, || {
                fs::remove_dir_all(&path)
            })?,
            Kind::File | Kind::Other => {
                self.apply(MirrorAction::DeletedFile { path: path.clone() }, || {
                    fs::remove_file(&path)
                })?
            }
        };
        Ok(())
    }

    // -- bookkeeping --------------------------------------------------------

    /// Run `op` (unless dry-run) and log the outcome. Returns whether the
    /// action took effect.
    fn apply(
        &mut self,
        action: MirrorAction,
        op: impl FnOnce() -> io::Result<()>,
    ) -> Result<bool, SyncError> {
        if self.dry_run {
            self.record(action)?;
            return Ok(true);
        }
        match op() {
            Ok(()) => {
                self.record(action)?;
                Ok(true)
            }
            Err(err) => {
                self.skip(action.path(), &err.to_string())?;
                Ok(false)
            }
        }
    }

    fn record(&mut self, action: MirrorAction) -> Result<(), SyncError> {
        self.info(&action.message(self.dry_run))?;
        self.actions.push(action);
        Ok(())
    }

    fn skip(&mut self, path: &Path, reason: &str) -> Result<(), SyncError> {
        let action = MirrorAction::Skipped {
            path: path.to_path_buf(),
            reason: reason.to_owned(),
        };
        self.log
            .warning(&action.message(self.dry_run))
            .map_err(SyncError::Log)?;
        self.actions.push(action);
        Ok(())
    }

    fn info(&self, message: &str) -> Result<(), SyncError> {
        self.log.info(message).map_err(SyncError::Log)
    }

    fn error(&self, message: &str) -> Result<(), SyncError> {
        self.log.error(message).map_err(SyncError::Log)
    }
}

// ---------------------------------------------------------------------------
// Directory listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    File,
    Dir,
    /// Symlink (when not followed), FIFO, socket, device.
    Other,
}

/// Type of whatever sits at `path`, without following a final symlink.
fn kind_of(path: &Path) -> Option<Kind> {
    let meta = fs::symlink_metadata(path).ok()?;
    let ty = meta.file_type();
    Some(if ty.is_dir() {
        Kind::Dir
    } else if ty.is_file() {
        Kind::File
    } else {
        Kind::Other
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Follow {
    /// Source side: symlinks count as what they point to.
    Links,
    /// Replica side: a symlink is an entry of its own.
    NoLinks,
}

/// What a name in a source listing protects from pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    File,
    Dir,
    /// Type unknown; a replica entry of any type is kept.
    Shielded,
}

/// Snapshot of one directory level, split by entry type.
#[derive(Debug, Default)]
struct Listing {
    files: Vec<OsString>,
    dirs: Vec<OsString>,
    /// Entries whose type could not be read.
    unreadable: Vec<(OsString, io::Error)>,
    slots: HashMap<OsString, Slot>,
}

impl Listing {
    fn read(dir: &Path, follow: Follow) -> io::Result<Self> {
        let mut listing = Listing::default();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let path = entry.path();

            let meta = match follow {
                Follow::Links => fs::metadata(&path),
                Follow::NoLinks => fs::symlink_metadata(&path),
            };
            match meta {
                Ok(meta) if meta.is_dir() => {
                    listing.slots.insert(name.clone(), Slot::Dir);
                    listing.dirs.push(name);
                }
                Ok(meta) if meta.is_file() => {
                    listing.slots.insert(name.clone(), Slot::File);
                    listing.files.push(name);
                }
                Ok(_) => match follow {
                    Follow::Links => {
                        tracing::debug!("ignoring special file: {}", path.display());
                    }
                    Follow::NoLinks => {
                        listing.slots.insert(name.clone(), Slot::File);
                        listing.files.push(name);
                    }
                },
                Err(err) => {
                    listing.slots.insert(name.clone(), Slot::Shielded);
                    listing.unreadable.push((name, err));
                }
            }
        }
        Ok(listing)
    }

    /// A replica file named `name` has a counterpart here.
    fn keeps_file(&self, name: &OsString) -> bool {
        matches!(self.slots.get(name), Some(Slot::File | Slot::Shielded))
    }

    fn keeps_dir(&self, name: &OsString) -> bool {
        matches!(self.slots.get(name), Some(Slot::Dir | Slot::Shielded))
    }

    fn keeps_any(&self, name: &OsString) -> bool {
        self.slots.contains_key(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingLog;
    use foldersync_core::LogLevel;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        source: PathBuf,
        replica: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source");
        let replica = tmp.path().join("replica");
        fs::create_dir_all(&source).unwrap();
        Fixture {
            _tmp: tmp,
            source,
            replica,
        }
    }

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn creates_missing_replica_root() {
        let fx = fixture();
        let log = RecordingLog::new();
        let report = MirrorEngine::new(&fx.source, &fx.replica, &log)
            .run_pass()
            .unwrap();

        assert_eq!(report.status, PassStatus::Completed);
        assert!(fx.replica.is_dir());
        assert!(log.contains(LogLevel::Info, "Created directory"));
        assert_eq!(
            report.actions,
            vec![MirrorAction::CreatedDir {
                path: fx.replica.clone()
            }]
        );
    }

    #[test]
    fn pass_is_bracketed_by_start_and_completion_lines() {
        let fx = fixture();
        fs::create_dir_all(&fx.replica).unwrap();
        let log = RecordingLog::new();
        MirrorEngine::new(&fx.source, &fx.replica, &log)
            .run_pass()
            .unwrap();

        let messages = log.messages();
        assert_eq!(messages.first().map(String::as_str), Some("Starting synchronization..."));
        assert!(messages
            .last()
            .unwrap()
            .starts_with("Synchronization completed"));
    }

    #[test]
    fn missing_source_is_a_logged_noop() {
        let fx = fixture();
        write(&fx.replica.join("keep.txt"), "precious");
        fs::remove_dir_all(&fx.source).unwrap();

        let log = RecordingLog::new();
        let report = MirrorEngine::new(&fx.source, &fx.replica, &log)
            .run_pass()
            .unwrap();

        assert_eq!(report.status, PassStatus::SourceMissing);
        assert!(report.actions.is_empty());
        assert_eq!(fs::read_to_string(fx.replica.join("keep.txt")).unwrap(), "precious");
        assert!(log.contains(LogLevel::Error, "Source folder does not exist"));
        assert!(!log.contains(LogLevel::Info, "Synchronization completed"));
    }

    #[test]
    fn replica_root_that_is_a_file_is_left_alone() {
        let fx = fixture();
        write(&fx.replica, "not a dir");
        write(&fx.source.join("a.txt"), "a");

        let log = RecordingLog::new();
        let report = MirrorEngine::new(&fx.source, &fx.replica, &log)
            .run_pass()
            .unwrap();

        assert_eq!(report.status, PassStatus::ReplicaUnavailable);
        assert_eq!(fs::read_to_string(&fx.replica).unwrap(), "not a dir");
        assert!(log.contains(LogLevel::Error, "not a directory"));
    }

    #[test]
    fn updated_file_is_reported_as_update() {
        let fx = fixture();
        write(&fx.source.join("a.txt"), "new");
        write(&fx.replica.join("a.txt"), "old");

        let log = RecordingLog::new();
        let report = MirrorEngine::new(&fx.source, &fx.replica, &log)
            .run_pass()
            .unwrap();

        assert_eq!(
            report.actions,
            vec![MirrorAction::UpdatedFile {
                path: fx.replica.join("a.txt")
            }]
        );
        assert_eq!(fs::read_to_string(fx.replica.join("a.txt")).unwrap(), "new");
        assert!(log.contains(LogLevel::Info, "Updated file:"));
    }

    #[test]
    fn overwrite_truncates_longer_replica_content() {
        let fx = fixture();
        write(&fx.source.join("a.txt"), "ab");
        write(&fx.replica.join("a.txt"), "abcdefgh");

        MirrorEngine::new(&fx.source, &fx.replica, RecordingLog::new())
            .run_pass()
            .unwrap();
        assert_eq!(fs::read(fx.replica.join("a.txt")).unwrap(), b"ab");
    }

    #[test]
    fn replica_directory_in_place_of_source_file_is_replaced() {
        let fx = fixture();
        write(&fx.source.join("thing"), "file now");
        write(&fx.replica.join("thing").join("inner.txt"), "was a dir");

        let report = MirrorEngine::new(&fx.source, &fx.replica, RecordingLog::new())
            .run_pass()
            .unwrap();

        assert_eq!(fs::read_to_string(fx.replica.join("thing")).unwrap(), "file now");
        assert_eq!(
            report.actions,
            vec![
                MirrorAction::DeletedDir {
                    path: fx.replica.join("thing")
                },
                MirrorAction::CreatedFile {
                    path: fx.replica.join("thing")
                },
            ]
        );
    }

    #[test]
    fn replica_file_in_place_of_source_directory_is_replaced() {
        let fx = fixture();
        write(&fx.source.join("thing").join("inner.txt"), "nested");
        write(&fx.replica.join("thing"), "was a file");

        MirrorEngine::new(&fx.source, &fx.replica, RecordingLog::new())
            .run_pass()
            .unwrap();

        assert!(fx.replica.join("thing").is_dir());
        assert_eq!(
            fs::read_to_string(fx.replica.join("thing").join("inner.txt")).unwrap(),
            "nested"
        );
    }

    #[test]
    fn dry_run_plans_without_touching_the_replica() {
        let fx = fixture();
        write(&fx.source.join("a.txt"), "hi");
        write(&fx.source.join("sub").join("b.txt"), "yo");
        write(&fx.replica.join("stale.txt"), "old");

        let log = RecordingLog::new();
        let report = MirrorEngine::new(&fx.source, &fx.replica, &log)
            .with_dry_run(true)
            .run_pass()
            .unwrap();

        assert!(report.dry_run);
        assert!(!fx.replica.join("a.txt").exists());
        assert!(!fx.replica.join("sub").exists());
        assert!(fx.replica.join("stale.txt").exists());

        let planned: Vec<_> = report.mutations().cloned().collect();
        assert!(planned.contains(&MirrorAction::CreatedFile {
            path: fx.replica.join("a.txt")
        }));
        assert!(planned.contains(&MirrorAction::CreatedDir {
            path: fx.replica.join("sub")
        }));
        assert!(planned.contains(&MirrorAction::CreatedFile {
            path: fx.replica.join("sub").join("b.txt")
        }));
        assert!(planned.contains(&MirrorAction::DeletedFile {
            path: fx.replica.join("stale.txt")
        }));
        assert!(log.contains(LogLevel::Info, "[dry-run] would create file"));
        assert!(log.contains(LogLevel::Info, "[dry-run] Synchronization completed"));
    }

    #[test]
    fn log_failure_aborts_the_pass() {
        let fx = fixture();
        write(&fx.source.join("a.txt"), "hi");
        let err = MirrorEngine::new(&fx.source, &fx.replica, RecordingLog::failing())
            .run_pass()
            .unwrap_err();
        assert!(matches!(err, SyncError::Log(_)));
    }

    #[test]
    #[cfg(unix)]
    fn symlink_cycle_is_skipped() {
        let fx = fixture();
        write(&fx.source.join("a.txt"), "hi");
        std::os::unix::fs::symlink(&fx.source, fx.source.join("loop")).unwrap();

        let log = RecordingLog::new();
        let report = MirrorEngine::new(&fx.source, &fx.replica, &log)
            .run_pass()
            .unwrap();

        assert_eq!(report.status, PassStatus::Completed);
        assert!(fx.replica.join("a.txt").is_file());
        assert!(fx.replica.join("loop").is_dir());
        assert!(!fx.replica.join("loop").join("a.txt").exists());
        assert!(log.contains(LogLevel::Warning, "cycle"));
    }

    #[test]
    #[cfg(unix)]
    fn dangling_source_symlink_is_skipped_and_not_pruned() {
        let fx = fixture();
        std::os::unix::fs::symlink(fx.source.join("nowhere"), fx.source.join("dangling")).unwrap();
        write(&fx.replica.join("dangling"), "from an earlier pass");

        let log = RecordingLog::new();
        MirrorEngine::new(&fx.source, &fx.replica, &log)
            .run_pass()
            .unwrap();

        assert!(fx.replica.join("dangling").exists());
        assert!(log.contains(LogLevel::Warning, "dangling"));
    }

    #[test]
    #[cfg(unix)]
    fn replica_symlink_is_replaced_not_written_through() {
        let fx = fixture();
        let outside = fx._tmp.path().join("outside.txt");
        write(&outside, "outside");
        write(&fx.source.join("a.txt"), "mirror me");
        fs::create_dir_all(&fx.replica).unwrap();
        std::os::unix::fs::symlink(&outside, fx.replica.join("a.txt")).unwrap();

        MirrorEngine::new(&fx.source, &fx.replica, RecordingLog::new())
            .run_pass()
            .unwrap();

        assert_eq!(fs::read_to_string(&outside).unwrap(), "outside");
        let replica_file = fx.replica.join("a.txt");
        assert!(!fs::symlink_metadata(&replica_file).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&replica_file).unwrap(), "mirror me");
    }

    #[test]
    #[cfg(unix)]
    fn symlinked_replica_root_is_followed() {
        let fx = fixture();
        let real = fx._tmp.path().join("disk").join("backup");
        fs::create_dir_all(&real).unwrap();
        std::os::unix::fs::symlink(&real, &fx.replica).unwrap();
        write(&fx.source.join("a.txt"), "hi");
        write(&real.join("stale.txt"), "old");

        let log = RecordingLog::new();
        let report = MirrorEngine::new(&fx.source, &fx.replica, &log)
            .run_pass()
            .unwrap();

        assert_eq!(report.status, PassStatus::Completed);
        assert!(fs::symlink_metadata(&fx.replica).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(real.join("a.txt")).unwrap(), "hi");
        assert!(!real.join("stale.txt").exists());
        assert!(!log.contains(LogLevel::Error, "not a directory"));
    }

    #[test]
    #[cfg(unix)]
    fn dangling_replica_root_symlink_is_unavailable() {
        let fx = fixture();
        std::os::unix::fs::symlink(fx._tmp.path().join("gone"), &fx.replica).unwrap();
        write(&fx.source.join("a.txt"), "hi");

        let log = RecordingLog::new();
        let report = MirrorEngine::new(&fx.source, &fx.replica, &log)
            .run_pass()
            .unwrap();

        assert_eq!(report.status, PassStatus::ReplicaUnavailable);
        assert!(log.contains(LogLevel::Error, "Cannot create replica folder"));
    }

    #[test]
    #[cfg(unix)]
    fn replica_entry_named_like_a_special_source_file_is_pruned() {
        let fx = fixture();
        write(&fx.source.join("a.txt"), "hi");
        let _socket = std::os::unix::net::UnixListener::bind(fx.source.join("ctl")).unwrap();
        write(&fx.replica.join("ctl").join("old.txt"), "stale dir");

        let report = MirrorEngine::new(&fx.source, &fx.replica, RecordingLog::new())
            .run_pass()
            .unwrap();

        assert!(!fx.replica.join("ctl").exists());
        assert!(report.actions.contains(&MirrorAction::DeletedDir {
            path: fx.replica.join("ctl")
        }));
    }

    #[test]
    fn prune_matches_names_by_type() {
        let fx = fixture();
        write(&fx.source.join("data").join("x.txt"), "dir in source");
        write(&fx.replica.join("data"), "file in replica");
        write(&fx.source.join("report"), "file in source");
        write(&fx.replica.join("report").join("old.txt"), "dir in replica");

        let report = MirrorEngine::new(&fx.source, &fx.replica, RecordingLog::new())
            .with_dry_run(true)
            .run_pass()
            .unwrap();

        // Each conflict is planned once, not again by prune.
        let deletions: Vec<_> = report
            .mutations()
            .filter(|a| {
                matches!(a, MirrorAction::DeletedFile { .. } | MirrorAction::DeletedDir { .. })
            })
            .cloned()
            .collect();
        assert_eq!(
            deletions,
            vec![
                MirrorAction::DeletedDir {
                    path: fx.replica.join("report")
                },
                MirrorAction::DeletedFile {
                    path: fx.replica.join("data")
                },
            ]
        );
    }

    #[test]
    fn listing_shields_only_unknown_types() {
        let fx = fixture();
        write(&fx.source.join("f"), "file");
        fs::create_dir_all(fx.source.join("d")).unwrap();

        let listing = Listing::read(&fx.source, Follow::Links).unwrap();
        let f = OsString::from("f");
        let d = OsString::from("d");
        assert!(listing.keeps_file(&f));
        assert!(!listing.keeps_dir(&f));
        assert!(listing.keeps_dir(&d));
        assert!(!listing.keeps_file(&d));
        assert!(!listing.keeps_any(&OsString::from("missing")));
    }
}
