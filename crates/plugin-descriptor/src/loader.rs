//! Loading descriptors out of plugin archives.
//!
//! [`DescriptorLoader`] ties the archive reader, the schema locator and the
//! parser together and applies the validation fallback: a strict parse that
//! fails outright is retried once without validation, but only when the
//! environment probe matches a known-defective runtime.

use std::path::Path;
use std::sync::Arc;

use crate::diagnostic::{Diagnostic, DiagnosticSink, TracingSink};
use crate::env::{EnvironmentProbe, FallbackPolicy, HostProbe};
use crate::error::{Error, ParseError, Result};
use crate::model::{CannedExpressions, Descriptor};
use crate::parser::{Document, Validation, parse};
use crate::schema::{BuiltinSchemas, Schema, SchemaLocator};

/// Default archive entry of the primary descriptor.
pub const DESCRIPTOR_PATH: &str = "META-INF/plugin-descriptor.xml";

/// Default archive entry of the canned group expressions.
pub const CANNED_EXPRESSIONS_PATH: &str = "META-INF/canned-group-expressions.xml";

/// Loads descriptor documents from archives.
///
/// Built with defaults and adjusted with the `with_*` methods:
///
/// ```no_run
/// use plugin_descriptor::{DescriptorLoader, FallbackPolicy};
///
/// let loader = DescriptorLoader::new()
///     .with_fallback(FallbackPolicy::new(["IBM J9"]));
/// let descriptor = loader.load_descriptor("plugins/apache.jar".as_ref())?;
/// # Ok::<(), plugin_descriptor::Error>(())
/// ```
#[derive(Clone)]
pub struct DescriptorLoader {
    locator: Arc<dyn SchemaLocator>,
    sink: Arc<dyn DiagnosticSink>,
    probe: Arc<dyn EnvironmentProbe>,
    fallback: FallbackPolicy,
    descriptor_path: String,
    canned_expressions_path: String,
    schema: String,
    validate: bool,
}

impl Default for DescriptorLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DescriptorLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorLoader")
            .field("fallback", &self.fallback)
            .field("descriptor_path", &self.descriptor_path)
            .field("canned_expressions_path", &self.canned_expressions_path)
            .field("schema", &self.schema)
            .field("validate", &self.validate)
            .finish_non_exhaustive()
    }
}

impl DescriptorLoader {
    pub fn new() -> Self {
        Self {
            locator: Arc::new(BuiltinSchemas),
            sink: Arc::new(TracingSink),
            probe: Arc::new(HostProbe),
            fallback: FallbackPolicy::never(),
            descriptor_path: DESCRIPTOR_PATH.to_string(),
            canned_expressions_path: CANNED_EXPRESSIONS_PATH.to_string(),
            schema: Descriptor::SCHEMA.to_string(),
            validate: true,
        }
    }

    pub fn with_locator(mut self, locator: Arc<dyn SchemaLocator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn EnvironmentProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_descriptor_path(mut self, path: impl Into<String>) -> Self {
        self.descriptor_path = path.into();
        self
    }

    pub fn with_canned_expressions_path(mut self, path: impl Into<String>) -> Self {
        self.canned_expressions_path = path.into();
        self
    }

    /// Resource name of the schema the primary descriptor is checked against.
    pub fn with_schema(mut self, name: impl Into<String>) -> Self {
        self.schema = name.into();
        self
    }

    /// Disable strict validation entirely; documents are always parsed lax.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn descriptor_path(&self) -> &str {
        &self.descriptor_path
    }

    /// Load the primary descriptor of `archive`.
    ///
    /// # Errors
    ///
    /// - [`Error::Archive`] if the archive cannot be opened
    /// - [`Error::DescriptorNotFound`] if the descriptor entry is absent
    /// - [`Error::Parse`] if no descriptor could be built
    pub fn load_descriptor(&self, archive: &Path) -> Result<Descriptor> {
        let bytes = plugin_archive::open_entry(archive, &self.descriptor_path)?;
        let descriptor: Descriptor =
            self.parse_with_fallback(archive, &self.descriptor_path, &self.schema, &bytes)?;
        tracing::debug!(
            "Loaded descriptor '{}' from {}",
            descriptor.name,
            archive.display()
        );
        Ok(descriptor)
    }

    /// Load the canned group expressions of `archive`.
    ///
    /// An archive without the entry yields `Ok(None)`.
    pub fn load_canned_expressions(&self, archive: &Path) -> Result<Option<CannedExpressions>> {
        let entry = &self.canned_expressions_path;
        let bytes = match plugin_archive::open_entry(archive, entry) {
            Ok(bytes) => bytes,
            Err(e) if e.is_entry_not_found() => {
                tracing::debug!("No canned expressions in {}", archive.display());
                return Ok(None);
            }
            Err(e) => return Err(Error::Archive(e)),
        };
        self.parse_with_fallback(archive, entry, CannedExpressions::SCHEMA, &bytes)
            .map(Some)
    }

    fn parse_with_fallback<D: Document>(
        &self,
        archive: &Path,
        entry: &str,
        schema: &str,
        bytes: &[u8],
    ) -> Result<D> {
        if !self.validate {
            return self.parse_lax(archive, entry, bytes);
        }

        let schema = Schema::load(self.locator.as_ref(), schema)?;
        let outcome = parse::<D>(bytes, Validation::Strict(&schema));
        self.report(archive, entry, &outcome.diagnostics);

        let error = match outcome.result {
            Ok(document) => return Ok(document),
            Err(error) => error,
        };

        match self.fallback.matching(self.probe.as_ref()) {
            Some(signature) => {
                tracing::warn!(
                    archive = %archive.display(),
                    entry,
                    "Strict parse failed ({error}); runtime matches defective signature '{signature}', retrying without validation"
                );
                self.parse_lax(archive, entry, bytes)
            }
            None => Err(parse_error(archive, entry, error)),
        }
    }

    fn parse_lax<D: Document>(&self, archive: &Path, entry: &str, bytes: &[u8]) -> Result<D> {
        let outcome = parse::<D>(bytes, Validation::Lax);
        self.report(archive, entry, &outcome.diagnostics);
        outcome
            .result
            .map_err(|error| parse_error(archive, entry, error))
    }

    fn report(&self, archive: &Path, entry: &str, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.sink.report(archive, entry, diagnostic);
        }
    }
}

fn parse_error(archive: &Path, entry: &str, source: ParseError) -> Error {
    Error::Parse {
        archive: archive.to_path_buf(),
        entry: entry.to_string(),
        source,
    }
}
