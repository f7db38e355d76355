//! Deriving dependency edges from a descriptor.
//!
//! Direct `<depends>` declarations are collected first and are always
//! required. The resource tree is walked afterwards and contributes
//! optional edges: owners of parent resource types a resource runs inside,
//! source plugins, and owners of bundle target types. Edges are keyed by
//! target name and the first one wins, so the collection order is what
//! keeps a required edge from being downgraded by a later optional one.

use std::collections::HashSet;

use plugin_descriptor::{Dependency, Descriptor, ResourceDescriptor};

use crate::graph::PluginGraph;

/// Dependencies keyed by target name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    seen: HashSet<String>,
    dependencies: Vec<Dependency>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `dependency` unless its target is already present.
    ///
    /// Returns whether it was inserted.
    pub fn insert(&mut self, dependency: Dependency) -> bool {
        if !self.seen.insert(dependency.plugin.clone()) {
            return false;
        }
        self.dependencies.push(dependency);
        true
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    pub fn into_vec(self) -> Vec<Dependency> {
        self.dependencies
    }
}

/// All dependencies of `descriptor`, deduplicated by target.
pub fn collect_dependencies(descriptor: &Descriptor) -> DependencySet {
    let mut set = DependencySet::new();

    for dep in &descriptor.depends {
        set.insert(Dependency::required(dep.plugin.clone(), dep.use_classes));
    }

    for resource in descriptor.walk() {
        for owner in optional_targets(resource) {
            if owner != descriptor.name {
                set.insert(Dependency::optional(owner));
            }
        }
    }

    set
}

fn optional_targets(resource: &ResourceDescriptor) -> impl Iterator<Item = &str> {
    let parents = resource
        .runs_inside
        .iter()
        .filter_map(|parent| parent.plugin.as_deref());
    let targets = resource
        .bundle
        .iter()
        .flat_map(|bundle| bundle.targets.iter())
        .filter_map(|target| target.plugin.as_deref());
    parents
        .chain(resource.source_plugin.as_deref())
        .chain(targets)
}

/// Register `descriptor` and its dependency edges in `graph`.
///
/// Cycles are not checked here; that is left to the graph once every
/// plugin has been ingested. Callers sharing one graph must serialize
/// calls.
pub fn ingest_dependencies<G: PluginGraph + ?Sized>(graph: &mut G, descriptor: &Descriptor) {
    let dependencies = collect_dependencies(descriptor);
    tracing::debug!(
        "Plugin '{}' has {} dependencies",
        descriptor.name,
        dependencies.len()
    );

    graph.add_node(&descriptor.name);
    for dep in dependencies.iter() {
        graph.add_edge(&descriptor.name, &dep.plugin, dep.required, dep.use_classes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_descriptor::{BundleDescriptor, ResourceCategory, ResourceTypeRef};

    fn type_ref(name: &str, plugin: &str) -> ResourceTypeRef {
        ResourceTypeRef {
            name: name.to_string(),
            plugin: Some(plugin.to_string()),
        }
    }

    fn descriptor(depends: Vec<Dependency>, resources: Vec<ResourceDescriptor>) -> Descriptor {
        Descriptor {
            name: "self".to_string(),
            display_name: None,
            version: None,
            description: None,
            help: None,
            package: None,
            depends,
            resources,
        }
    }

    fn summary(set: &DependencySet) -> Vec<(&str, bool)> {
        set.iter().map(|d| (d.plugin.as_str(), d.required)).collect()
    }

    #[test]
    fn first_insert_wins() {
        let mut set = DependencySet::new();
        assert!(set.insert(Dependency::required("x", true)));
        assert!(!set.insert(Dependency::optional("x")));
        assert_eq!(summary(&set), vec![("x", true)]);
    }

    #[test]
    fn every_relation_contributes_optional_edges() {
        let mut server = ResourceDescriptor::new(ResourceCategory::Server, "s");
        server.runs_inside.push(type_ref("Parent", "parent-owner"));
        server.source_plugin = Some("source".to_string());
        server.bundle = Some(BundleDescriptor {
            bundle_type: "b".to_string(),
            targets: vec![type_ref("Target", "target-owner")],
        });
        let mut service = ResourceDescriptor::new(ResourceCategory::Service, "nested");
        service.runs_inside.push(type_ref("Deep", "deep-owner"));
        server.children.push(service);

        let set = collect_dependencies(&descriptor(vec![], vec![server]));
        assert_eq!(
            summary(&set),
            vec![
                ("parent-owner", false),
                ("source", false),
                ("target-owner", false),
                ("deep-owner", false),
            ]
        );
    }

    #[test]
    fn references_to_self_are_skipped() {
        let mut server = ResourceDescriptor::new(ResourceCategory::Server, "s");
        server.runs_inside.push(type_ref("Own Type", "self"));
        server.runs_inside.push(ResourceTypeRef {
            name: "Unowned".to_string(),
            plugin: None,
        });
        let set = collect_dependencies(&descriptor(vec![], vec![server]));
        assert!(set.is_empty());
    }

    #[test]
    fn direct_depends_stay_required() {
        let mut server = ResourceDescriptor::new(ResourceCategory::Server, "s");
        server.runs_inside.push(type_ref("X Server", "x"));
        let set = collect_dependencies(&descriptor(
            vec![Dependency::required("x", false)],
            vec![server],
        ));
        assert_eq!(summary(&set), vec![("x", true)]);
    }
}
