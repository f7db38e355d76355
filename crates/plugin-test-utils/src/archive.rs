//! [`ArchiveBuilder`] for plugin archives.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Entry path of the primary descriptor inside a plugin archive.
pub const DESCRIPTOR_ENTRY: &str = "META-INF/plugin-descriptor.xml";

/// Entry path of the optional canned group expressions descriptor.
pub const CANNED_EXPRESSIONS_ENTRY: &str = "META-INF/canned-group-expressions.xml";

/// Entry path of the archive manifest.
pub const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

/// Builds a zip plugin archive entry by entry.
///
/// # Example
///
/// ```rust,no_run
/// use plugin_test_utils::ArchiveBuilder;
///
/// let dir = tempfile::tempdir().unwrap();
/// ArchiveBuilder::new()
///     .descriptor(r#"<plugin name="apache"/>"#)
///     .implementation_version("4.3.0")
///     .write_to(&dir.path().join("apache.jar"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    /// Start an archive with no entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary entry.
    pub fn entry(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries
            .push((path.to_string(), content.as_ref().to_vec()));
        self
    }

    /// Add the primary descriptor document.
    pub fn descriptor(self, xml: &str) -> Self {
        self.entry(DESCRIPTOR_ENTRY, xml)
    }

    /// Add the canned group expressions document.
    pub fn canned_expressions(self, xml: &str) -> Self {
        self.entry(CANNED_EXPRESSIONS_ENTRY, xml)
    }

    /// Add a manifest whose main section carries `Implementation-Version`.
    pub fn implementation_version(self, version: &str) -> Self {
        self.manifest(&format!(
            "Manifest-Version: 1.0\r\nImplementation-Version: {version}\r\n\r\n"
        ))
    }

    /// Add a raw manifest document.
    pub fn manifest(self, content: &str) -> Self {
        self.entry(MANIFEST_ENTRY, content)
    }

    /// Write the archive to `path`, replacing any existing file.
    ///
    /// # Panics
    /// Panics if the file cannot be created or the zip cannot be written.
    pub fn write_to(&self, path: &Path) {
        let file = File::create(path)
            .unwrap_or_else(|e| panic!("ArchiveBuilder: failed to create {}: {e}", path.display()));
        let mut zip = zip::ZipWriter::new(file);
        // Fixed entry timestamps: equal builders write byte-identical archives.
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        for (name, content) in &self.entries {
            zip.start_file(name.as_str(), options)
                .unwrap_or_else(|e| panic!("ArchiveBuilder: failed to start {name}: {e}"));
            zip.write_all(content)
                .unwrap_or_else(|e| panic!("ArchiveBuilder: failed to write {name}: {e}"));
        }

        zip.finish()
            .unwrap_or_else(|e| panic!("ArchiveBuilder: failed to finish {}: {e}", path.display()));
    }
}
