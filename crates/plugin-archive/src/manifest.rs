//! Archive manifest (`META-INF/MANIFEST.MF`) parsing.
//!
//! A manifest is a sequence of `Name: value` header lines grouped into
//! sections separated by blank lines. The first section holds the main
//! attributes; every later section starts with a `Name:` header naming the
//! archive entry it describes. A line starting with a single space
//! continues the value of the previous header. Header names are
//! case-insensitive.
//!
//! # Example
//!
//! ```
//! use plugin_archive::Manifest;
//!
//! let manifest = Manifest::parse("Manifest-Version: 1.0\nImplementation-Version: 4.3.0\n");
//! assert_eq!(manifest.implementation_version(), Some("4.3.0"));
//! ```

use std::collections::BTreeMap;

/// Entry path of the manifest inside an archive.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Main attribute carrying the archive's implementation version.
pub const IMPLEMENTATION_VERSION: &str = "Implementation-Version";

/// Header/value pairs of one manifest section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Keyed by lowercased header name; holds the original name and value.
    entries: BTreeMap<String, (String, String)>,
}

impl Attributes {
    /// Look up a header, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    /// Insert a header; a repeated header replaces the earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries
            .insert(name.to_ascii_lowercase(), (name, value.into()));
    }

    /// Iterate over `(name, value)` pairs with the names as written.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed archive manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    main: Attributes,
    sections: BTreeMap<String, Attributes>,
}

impl Manifest {
    /// Parse manifest text.
    ///
    /// Parsing is lenient: malformed header lines are skipped with a debug
    /// log rather than failing, since a manifest is only ever consulted as a
    /// fallback source of metadata.
    pub fn parse(content: &str) -> Self {
        let mut manifest = Self::default();
        let mut current = Attributes::default();
        let mut current_name: Option<String> = None;
        let mut in_main = true;
        let mut last_header: Option<String> = None;

        for line in content.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);

            if line.is_empty() {
                manifest.close_section(&mut current, &mut current_name, in_main);
                in_main = false;
                last_header = None;
                continue;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                if let Some(header) = &last_header {
                    let previous = current.get(header).unwrap_or_default().to_string();
                    current.insert(header.clone(), previous + continuation);
                } else {
                    tracing::debug!("Ignoring manifest continuation line without a header");
                }
                continue;
            }

            let Some((name, value)) = line.split_once(':') else {
                tracing::debug!("Ignoring malformed manifest line: {:?}", line);
                continue;
            };
            let name = name.trim();
            let value = value.strip_prefix(' ').unwrap_or(value);

            if !in_main && current.is_empty() && name.eq_ignore_ascii_case("Name") {
                current_name = Some(value.to_string());
            }
            current.insert(name, value);
            last_header = Some(name.to_string());
        }

        manifest.close_section(&mut current, &mut current_name, in_main);
        manifest
    }

    fn close_section(
        &mut self,
        current: &mut Attributes,
        current_name: &mut Option<String>,
        in_main: bool,
    ) {
        let section = std::mem::take(current);
        if in_main {
            self.main = section;
        } else if let Some(name) = current_name.take() {
            self.sections.insert(name, section);
        }
    }

    /// The main attributes.
    pub fn main_attributes(&self) -> &Attributes {
        &self.main
    }

    /// The attributes of the per-entry section for `entry`.
    pub fn section(&self, entry: &str) -> Option<&Attributes> {
        self.sections.get(entry)
    }

    /// The `Implementation-Version` main attribute, when present and non-blank.
    pub fn implementation_version(&self) -> Option<&str> {
        self.main
            .get(IMPLEMENTATION_VERSION)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
