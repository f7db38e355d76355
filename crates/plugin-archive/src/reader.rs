//! Entry and manifest access for plugin archives.
//!
//! Every function opens the archive, does its work and drops the handle
//! before returning, on success and on error alike. The archive is checked
//! to be a readable zip before any entry lookup, so a half-written file
//! surfaces as [`Error::UnreadableArchive`] rather than a missing entry.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;
use zip::result::ZipError;

use crate::manifest::{MANIFEST_PATH, Manifest};
use crate::{Error, Result};

fn open(archive: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(archive).map_err(|e| Error::unreadable(archive, ZipError::Io(e)))?;
    ZipArchive::new(file).map_err(|e| Error::unreadable(archive, e))
}

/// Check that `archive` can be opened as a zip file.
pub fn verify(archive: &Path) -> Result<()> {
    let zip = open(archive)?;
    tracing::trace!("Archive {} holds {} entries", archive.display(), zip.len());
    Ok(())
}

/// Run `f` over the content stream of `entry` inside `archive`.
///
/// The stream and the archive are closed when this returns, whatever `f`
/// does with them.
///
/// # Errors
///
/// - [`Error::UnreadableArchive`] if the archive is not a readable zip
/// - [`Error::EntryNotFound`] if the archive has no such entry
pub fn with_entry<T>(
    archive: &Path,
    entry: &str,
    f: impl FnOnce(&mut dyn Read) -> std::io::Result<T>,
) -> Result<T> {
    let mut zip = open(archive)?;
    let mut file = match zip.by_name(entry) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => {
            return Err(Error::EntryNotFound {
                archive: archive.to_path_buf(),
                entry: entry.to_string(),
            });
        }
        Err(e) => return Err(Error::unreadable(archive, e)),
    };

    f(&mut file).map_err(|source| Error::EntryRead {
        archive: archive.to_path_buf(),
        entry: entry.to_string(),
        source,
    })
}

/// Read the full content of `entry` inside `archive`.
pub fn open_entry(archive: &Path, entry: &str) -> Result<Vec<u8>> {
    with_entry(archive, entry, |stream| {
        let mut content = Vec::new();
        stream.read_to_end(&mut content)?;
        Ok(content)
    })
}

/// Read the archive manifest.
///
/// Returns `Ok(None)` when the archive has no manifest; that is a normal
/// state, not an error. An archive that cannot be opened at all is still
/// reported as [`Error::UnreadableArchive`].
pub fn read_manifest(archive: &Path) -> Result<Option<Manifest>> {
    match open_entry(archive, MANIFEST_PATH) {
        Ok(bytes) => Ok(Some(Manifest::parse(&String::from_utf8_lossy(&bytes)))),
        Err(e) if e.is_entry_not_found() => {
            tracing::debug!("No manifest in archive {}", archive.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
