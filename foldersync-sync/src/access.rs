//! Access probe — can this path be used for the operation about to run?

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use crate::error::SyncError;
use crate::sink::MirrorLog;

/// What kind of entry is being probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Probe `path` without changing it.
///
/// A directory is probed by enumerating every entry; a file by opening it for
/// read-write, the same mode the overwrite path needs. Any failure counts as
/// denied and is logged as a warning. Only a log sink failure is an `Err`.
pub fn can_access<L: MirrorLog + ?Sized>(
    path: &Path,
    kind: EntryKind,
    log: &L,
) -> Result<bool, SyncError> {
    match probe(path, kind) {
        Ok(()) => Ok(true),
        Err(err) => {
            log.warning(&format!("Access denied: {} ({err})", path.display()))
                .map_err(SyncError::Log)?;
            Ok(false)
        }
    }
}

fn probe(path: &Path, kind: EntryKind) -> io::Result<()> {
    match kind {
        EntryKind::Directory => fs::read_dir(path)?.try_for_each(|entry| entry.map(drop)),
        EntryKind::File => OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map(drop),
    }
}
