//! Structural schemas for descriptor documents.
//!
//! A schema is itself a small TOML document naming the root element and,
//! for each element, the attributes it may carry, the attributes it must
//! carry, the child elements it may contain and whether it may hold text:
//!
//! ```toml
//! root = "plugin"
//!
//! [elements.plugin]
//! attributes = ["name", "version"]
//! required = ["name"]
//! children = ["depends"]
//!
//! [elements.depends]
//! attributes = ["plugin"]
//! required = ["plugin"]
//! ```
//!
//! Schema documents are found by resource name through a [`SchemaLocator`].

use std::collections::{BTreeMap, BTreeSet};

use roxmltree::Node;
use serde::Deserialize;

use crate::diagnostic::{Diagnostic, Severity};
use crate::error::{Error, Result};

/// Resource name of the primary descriptor schema.
pub const PLUGIN_DESCRIPTOR_SCHEMA: &str = "plugin-descriptor";

/// Resource name of the canned group expressions schema.
pub const CANNED_EXPRESSIONS_SCHEMA: &str = "canned-group-expressions";

/// Returns schema documents by well-known resource name.
pub trait SchemaLocator: Send + Sync {
    fn locate(&self, name: &str) -> Option<String>;
}

/// Serves the schemas compiled into this crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinSchemas;

impl SchemaLocator for BuiltinSchemas {
    fn locate(&self, name: &str) -> Option<String> {
        match name {
            PLUGIN_DESCRIPTOR_SCHEMA => {
                Some(include_str!("../schemas/plugin-descriptor.toml").to_string())
            }
            CANNED_EXPRESSIONS_SCHEMA => {
                Some(include_str!("../schemas/canned-group-expressions.toml").to_string())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
    root: String,
    #[serde(default)]
    elements: BTreeMap<String, ElementRule>,
}

/// What one element may contain.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ElementRule {
    #[serde(default)]
    pub attributes: BTreeSet<String>,
    #[serde(default)]
    pub required: BTreeSet<String>,
    #[serde(default)]
    pub children: BTreeSet<String>,
    #[serde(default)]
    pub text: bool,
}

/// A compiled schema, ready to validate documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    root: String,
    elements: BTreeMap<String, ElementRule>,
}

impl Schema {
    /// Locate and compile the schema resource `name`.
    pub fn load(locator: &dyn SchemaLocator, name: &str) -> Result<Self> {
        let document = locator.locate(name).ok_or_else(|| Error::SchemaNotFound {
            name: name.to_string(),
        })?;
        Self::compile(name, &document)
    }

    /// Compile a schema document.
    ///
    /// The root must be declared, every referenced child must be declared,
    /// and every required attribute must also be an allowed attribute.
    pub fn compile(name: &str, document: &str) -> Result<Self> {
        let invalid = |message: String| Error::SchemaInvalid {
            name: name.to_string(),
            message,
        };

        let doc: SchemaDocument = toml::from_str(document).map_err(|e| invalid(e.to_string()))?;

        if !doc.elements.contains_key(&doc.root) {
            return Err(invalid(format!("root element '{}' is not declared", doc.root)));
        }

        for (element, rule) in &doc.elements {
            if let Some(child) = rule.children.iter().find(|c| !doc.elements.contains_key(*c)) {
                return Err(invalid(format!(
                    "element '{element}' references undeclared child '{child}'"
                )));
            }
            if let Some(attr) = rule.required.difference(&rule.attributes).next() {
                return Err(invalid(format!(
                    "element '{element}' requires undeclared attribute '{attr}'"
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            root: doc.root,
            elements: doc.elements,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn rule(&self, element: &str) -> Option<&ElementRule> {
        self.elements.get(element)
    }

    /// Validate a parsed document, collecting every event.
    ///
    /// A wrong root element is fatal and stops validation. All other events
    /// are recorded and validation carries on.
    pub fn validate(&self, document: &roxmltree::Document<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let root = document.root_element();
        let name = root.tag_name().name();

        match self.elements.get(name).filter(|_| name == self.root) {
            Some(rule) => self.validate_element(root, rule, &mut diagnostics),
            None => {
                let (line, column) = position(root);
                diagnostics.push(Diagnostic::new(
                    Severity::Fatal,
                    line,
                    column,
                    format!("unexpected root element <{name}>, expected <{}>", self.root),
                ));
            }
        }

        diagnostics
    }

    fn validate_element(&self, node: Node<'_, '_>, rule: &ElementRule, out: &mut Vec<Diagnostic>) {
        let element = node.tag_name().name();
        let (line, column) = position(node);

        for attr in node.attributes() {
            // Namespaced attributes (xsi:schemaLocation and friends) are not ours to check.
            if attr.namespace().is_some() {
                continue;
            }
            if !rule.attributes.contains(attr.name()) {
                out.push(Diagnostic::new(
                    Severity::Warning,
                    line,
                    column,
                    format!("unknown attribute '{}' on <{element}>", attr.name()),
                ));
            }
        }

        for required in &rule.required {
            if node.attribute(required.as_str()).is_none() {
                out.push(Diagnostic::new(
                    Severity::Error,
                    line,
                    column,
                    format!("<{element}> is missing required attribute '{required}'"),
                ));
            }
        }

        for child in node.children() {
            if child.is_element() {
                let child_name = child.tag_name().name();
                match self.elements.get(child_name) {
                    Some(child_rule) if rule.children.contains(child_name) => {
                        self.validate_element(child, child_rule, out);
                    }
                    _ => {
                        let (line, column) = position(child);
                        out.push(Diagnostic::new(
                            Severity::Error,
                            line,
                            column,
                            format!("element <{child_name}> is not allowed in <{element}>"),
                        ));
                    }
                }
            } else if child.is_text()
                && !rule.text
                && child.text().is_some_and(|t| !t.trim().is_empty())
            {
                let (line, column) = position(child);
                out.push(Diagnostic::new(
                    Severity::Error,
                    line,
                    column,
                    format!("<{element}> does not allow text content"),
                ));
            }
        }
    }
}

/// 1-based line and column of a node's start.
pub(crate) fn position(node: Node<'_, '_>) -> (u32, u32) {
    let pos = node.document().text_pos_at(node.range().start);
    (pos.row, pos.col)
}
