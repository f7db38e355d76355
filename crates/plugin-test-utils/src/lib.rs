//! Shared test utilities for the plugin-deployer workspace.
//!
//! This crate builds real plugin archives on disk so that every crate's
//! tests exercise the same zip layout the deployer reads in production.
//! It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`archive`]: [`ArchiveBuilder`] for writing a single plugin archive
//! - [`dir`]: [`PluginDir`], a temporary plugin directory holding archives
//! - [`xml`]: canned descriptor documents used across test suites

pub mod archive;
pub mod dir;
pub mod xml;

pub use archive::ArchiveBuilder;
pub use dir::PluginDir;
