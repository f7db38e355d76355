//! Typed descriptor model.
//!
//! The model mirrors the descriptor grammar: a [`Descriptor`] declares
//! direct [`Dependency`] edges and a tree of [`ResourceDescriptor`]s
//! (platforms, servers and services). Resources reference resource types
//! in other plugins through [`ResourceTypeRef`]s.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// The deserialized self-description of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    /// Logical plugin name; unique and never empty.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Direct `<depends>` declarations, in document order.
    pub depends: Vec<Dependency>,
    /// Top-level resources (platforms, servers, services), in document order.
    pub resources: Vec<ResourceDescriptor>,
}

impl Descriptor {
    /// Display name, falling back to the logical name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Every resource in the tree, depth-first in document order.
    pub fn walk(&self) -> Vec<&ResourceDescriptor> {
        let mut out = Vec::new();
        for resource in &self.resources {
            resource.collect(&mut out);
        }
        out
    }
}

/// A dependency on another plugin.
///
/// Identity is the target plugin name alone: two dependencies on the same
/// plugin are equal whatever their flags.
#[derive(Debug, Clone, Serialize)]
pub struct Dependency {
    pub plugin: String,
    /// Whether the dependent plugin loads classes from the target.
    pub use_classes: bool,
    pub required: bool,
}

impl Dependency {
    pub fn required(plugin: impl Into<String>, use_classes: bool) -> Self {
        Self {
            plugin: plugin.into(),
            use_classes,
            required: true,
        }
    }

    pub fn optional(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            use_classes: false,
            required: false,
        }
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.plugin == other.plugin
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.plugin.hash(state);
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.required { "required" } else { "optional" };
        write!(f, "{} ({kind})", self.plugin)
    }
}

/// Resource category of a node in the resource tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Platform,
    Server,
    Service,
}

impl ResourceCategory {
    pub(crate) fn from_element(name: &str) -> Option<Self> {
        match name {
            "platform" => Some(Self::Platform),
            "server" => Some(Self::Server),
            "service" => Some(Self::Service),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform => f.write_str("platform"),
            Self::Server => f.write_str("server"),
            Self::Service => f.write_str("service"),
        }
    }
}

/// A reference to a resource type, possibly owned by another plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceTypeRef {
    pub name: String,
    /// Owning plugin; `None` means the declaring plugin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
}

/// Bundle handling declared by a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleDescriptor {
    pub bundle_type: String,
    /// Resource types bundles of this type can be deployed to.
    pub targets: Vec<ResourceTypeRef>,
}

/// One platform, server or service node in the resource tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    pub category: ResourceCategory,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    /// Parent resource types this resource runs inside.
    pub runs_inside: Vec<ResourceTypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<BundleDescriptor>,
    pub children: Vec<ResourceDescriptor>,
}

impl ResourceDescriptor {
    pub fn new(category: ResourceCategory, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
            description: None,
            source_plugin: None,
            source_type: None,
            runs_inside: Vec::new(),
            bundle: None,
            children: Vec::new(),
        }
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a ResourceDescriptor>) {
        out.push(self);
        for child in &self.children {
            child.collect(out);
        }
    }
}

/// The optional secondary descriptor: predefined group definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CannedExpressions {
    pub expressions: Vec<CannedExpression>,
}

/// A predefined group definition shipped by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CannedExpression {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expression lines, in document order.
    pub expression: Vec<String>,
    pub recursive: bool,
    pub create_by_default: bool,
    pub recalc_in_minutes: u32,
}

impl CannedExpression {
    /// Key tying a group definition back to the plugin that shipped it.
    pub fn reference_key(&self, plugin: &str) -> String {
        format!("{plugin}:{}", self.id)
    }
}
