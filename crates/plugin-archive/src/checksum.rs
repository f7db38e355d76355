//! SHA-256 content digests for plugin archives
//!
//! Two archives with the same digest carry byte-identical content. The
//! digest format is `sha256:<hex>`.

use std::fs::File;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Prefix for all digests produced by this module
const PREFIX: &str = "sha256:";

/// Compute the digest of in-memory content.
pub fn compute_bytes_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the digest of a file's contents without loading it whole.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_file_digest(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

/// Content digest and last-modified time of an archive file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub digest: String,
    pub modified: DateTime<Utc>,
}

/// Read the digest and modification time of `archive`.
pub fn fingerprint(archive: &Path) -> Result<Fingerprint> {
    let metadata = std::fs::metadata(archive).map_err(|e| Error::io(archive, e))?;
    let modified = metadata.modified().map_err(|e| Error::io(archive, e))?;
    let digest = compute_file_digest(archive).map_err(|e| Error::io(archive, e))?;

    Ok(Fingerprint {
        digest,
        modified: DateTime::<Utc>::from(modified),
    })
}
