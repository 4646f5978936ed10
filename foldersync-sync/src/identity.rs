//! Content identity — SHA-256 equality oracle for two files.
//!
//! Identity is decided by content alone; timestamps and names play no part.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex SHA-256 digest of the full byte stream at `path`.
pub fn file_digest(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Whether `a` and `b` hold the same bytes.
///
/// Files of different length are reported as different without being read.
/// Otherwise both are hashed in full.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(file_digest(a)? == file_digest(b)?)
}
