//! Plugin descriptor model, schema validation and loading
//!
//! A plugin archive carries a structured self-description at a fixed entry.
//! This crate turns that document into a typed [`Descriptor`]:
//!
//! - [`schema`] - structural schemas and validation diagnostics
//! - [`parser`] - strict and lax parsing into the typed model
//! - [`loader`] - reading descriptors out of archives, with the fallback
//!   retry for runtimes whose validator is known to be broken
//!
//! Canned group expressions, the optional secondary descriptor, go through
//! the same pipeline.

pub mod diagnostic;
pub mod env;
pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod schema;

pub use diagnostic::{CollectingSink, Diagnostic, DiagnosticSink, Reported, Severity, TracingSink};
pub use env::{EnvironmentProbe, FallbackPolicy, FixedProbe, HostProbe};
pub use error::{Error, ParseError, Result};
pub use loader::{CANNED_EXPRESSIONS_PATH, DESCRIPTOR_PATH, DescriptorLoader};
pub use model::{
    BundleDescriptor, CannedExpression, CannedExpressions, Dependency, Descriptor,
    ResourceCategory, ResourceDescriptor, ResourceTypeRef,
};
pub use parser::{Document, ParseOutcome, Validation, parse};
pub use schema::{
    BuiltinSchemas, CANNED_EXPRESSIONS_SCHEMA, ElementRule, PLUGIN_DESCRIPTOR_SCHEMA, Schema,
    SchemaLocator,
};
