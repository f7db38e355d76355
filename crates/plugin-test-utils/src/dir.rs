//! [`PluginDir`]: a temporary plugin deployment directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

use crate::ArchiveBuilder;

/// A temporary directory that plugin archives are dropped into.
///
/// The directory is removed when the value is dropped.
pub struct PluginDir {
    temp_dir: TempDir,
}

impl Default for PluginDir {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginDir {
    /// Create an empty plugin directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the directory path.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `archive` as `file_name` and return its full path.
    pub fn add(&self, file_name: &str, archive: &ArchiveBuilder) -> PathBuf {
        let path = self.root().join(file_name);
        archive.write_to(&path);
        path
    }

    /// Write arbitrary bytes as `file_name`, e.g. a truncated archive.
    pub fn add_raw(&self, file_name: &str, content: &[u8]) -> PathBuf {
        let path = self.root().join(file_name);
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("PluginDir: failed to write {}: {e}", path.display()));
        path
    }

    /// Set the modification time of `path` to `secs` seconds after the epoch.
    ///
    /// # Panics
    /// Panics if the file cannot be opened or its times cannot be set.
    pub fn set_mtime(&self, path: &Path, secs: u64) {
        let file = fs::OpenOptions::new()
            .write(true)
            .open(path)
            .unwrap_or_else(|e| panic!("PluginDir: failed to open {}: {e}", path.display()));
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap_or_else(|e| panic!("PluginDir: failed to set mtime on {}: {e}", path.display()));
    }
}
