//! Read-only access to plugin archives.
//!
//! A plugin archive is a zip file (usually a `.jar`) carrying the plugin's
//! code, a descriptor document at a well-known entry path and, optionally,
//! a `META-INF/MANIFEST.MF`. Archives are opened per call and closed before
//! the call returns; nothing in this crate keeps a handle across calls.

pub mod checksum;
pub mod error;
pub mod manifest;
pub mod reader;

pub use checksum::{Fingerprint, compute_bytes_digest, compute_file_digest, fingerprint};
pub use error::{Error, Result};
pub use manifest::{Attributes, IMPLEMENTATION_VERSION, MANIFEST_PATH, Manifest};
pub use reader::{open_entry, read_manifest, verify, with_entry};
