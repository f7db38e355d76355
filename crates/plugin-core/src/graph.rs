//! Plugin dependency graph and deployment ordering.
//!
//! Edges point from dependent to dependency: if A depends on B the edge is
//! `A -> B`, and [`PluginGraph::topological_order`] returns B before A.
//!
//! # Example
//!
//! ```
//! use plugin_core::{DependencyGraph, PluginGraph};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_node("jboss-as");
//! graph.add_node("jmx");
//! graph.add_edge("jboss-as", "jmx", true, true);
//!
//! let order = graph.topological_order().unwrap();
//! assert_eq!(order, vec!["jmx", "jboss-as"]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use plugin_descriptor::Dependency;
use serde::Serialize;

/// A dependency cycle between plugins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("dependency cycle between plugins: {}", format_cycles(.cycles))]
pub struct CycleError {
    /// Each cycle's members, sorted; cycles sorted by first member.
    pub cycles: Vec<Vec<String>>,
}

fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|c| c.join(" <-> "))
        .collect::<Vec<_>>()
        .join("; ")
}

/// The operations the graph builder and the deployment plan rely on.
pub trait PluginGraph {
    /// Register a plugin. Registering an existing plugin keeps its edges.
    fn add_node(&mut self, name: &str);

    /// Record that `from` depends on `to`.
    ///
    /// An edge to a target `from` already depends on is ignored, so the
    /// first declaration for a target wins.
    fn add_edge(&mut self, from: &str, to: &str, required: bool, use_classes: bool);

    /// Every set of plugins that depend on each other in a cycle.
    fn detect_cycles(&self) -> Vec<Vec<String>>;

    /// Plugin names, dependencies first.
    fn topological_order(&self) -> Result<Vec<String>, CycleError>;
}

/// Adjacency-list [`PluginGraph`] keyed by plugin name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    /// Outgoing edges per node, in insertion order.
    nodes: BTreeMap<String, Vec<Dependency>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Direct dependencies of `name`, in insertion order.
    pub fn dependencies_of(&self, name: &str) -> &[Dependency] {
        self.nodes.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn required_dependencies_of(&self, name: &str) -> impl Iterator<Item = &Dependency> {
        self.dependencies_of(name).iter().filter(|d| d.required)
    }

    /// `(plugin, dependency)` pairs whose required target is not a node.
    ///
    /// Optional targets may be absent.
    pub fn missing_required(&self) -> Vec<(String, String)> {
        self.nodes
            .iter()
            .flat_map(|(name, deps)| {
                deps.iter()
                    .filter(|d| d.required && !self.nodes.contains_key(&d.plugin))
                    .map(move |d| (name.clone(), d.plugin.clone()))
            })
            .collect()
    }

    /// Dependencies of `name` that are themselves nodes.
    fn known_targets<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.dependencies_of(name)
            .iter()
            .map(|d| d.plugin.as_str())
            .filter(|target| self.nodes.contains_key(*target))
    }
}

impl PluginGraph for DependencyGraph {
    fn add_node(&mut self, name: &str) {
        self.nodes.entry(name.to_string()).or_default();
    }

    fn add_edge(&mut self, from: &str, to: &str, required: bool, use_classes: bool) {
        let deps = self.nodes.entry(from.to_string()).or_default();
        if deps.iter().any(|d| d.plugin == to) {
            tracing::trace!("Ignoring duplicate edge {from} -> {to}");
            return;
        }
        deps.push(Dependency {
            plugin: to.to_string(),
            use_classes,
            required,
        });
    }

    fn detect_cycles(&self) -> Vec<Vec<String>> {
        Tarjan::new(self).run()
    }

    /// Kahn's algorithm; among ready nodes the alphabetically first goes
    /// next. Edges to unknown nodes are ignored.
    fn topological_order(&self) -> Result<Vec<String>, CycleError> {
        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for name in self.nodes.keys() {
            let name = name.as_str();
            pending.insert(name, self.known_targets(name).count());
            for target in self.known_targets(name) {
                dependents.entry(target).or_default().push(name);
            }
        }

        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(current) = ready.pop_first() {
            order.push(current.to_string());
            for dependent in dependents.get(current).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let mut cycles = self.detect_cycles();
            if cycles.is_empty() {
                // Unreachable for a consistent graph; report what never became ready.
                let placed: BTreeSet<&str> = order.iter().map(String::as_str).collect();
                cycles.push(
                    self.nodes()
                        .filter(|n| !placed.contains(n))
                        .map(str::to_string)
                        .collect(),
                );
            }
            return Err(CycleError { cycles });
        }

        Ok(order)
    }
}

/// Strongly connected components, keeping those that form cycles.
struct Tarjan<'a> {
    graph: &'a DependencyGraph,
    index: BTreeMap<&'a str, usize>,
    low: BTreeMap<&'a str, usize>,
    stack: Vec<&'a str>,
    on_stack: BTreeSet<&'a str>,
    next: usize,
    cycles: Vec<Vec<String>>,
}

impl<'a> Tarjan<'a> {
    fn new(graph: &'a DependencyGraph) -> Self {
        Self {
            graph,
            index: BTreeMap::new(),
            low: BTreeMap::new(),
            stack: Vec::new(),
            on_stack: BTreeSet::new(),
            next: 0,
            cycles: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Vec<String>> {
        let graph = self.graph;
        for name in graph.nodes() {
            if !self.index.contains_key(name) {
                self.visit(name);
            }
        }
        self.cycles.sort();
        self.cycles
    }

    fn visit(&mut self, node: &'a str) {
        self.index.insert(node, self.next);
        self.low.insert(node, self.next);
        self.next += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        let graph = self.graph;
        let targets: Vec<&'a str> = graph.known_targets(node).collect();
        for &target in &targets {
            if !self.index.contains_key(target) {
                self.visit(target);
                let low = self.low[node].min(self.low[target]);
                self.low.insert(node, low);
            } else if self.on_stack.contains(target) {
                let low = self.low[node].min(self.index[target]);
                self.low.insert(node, low);
            }
        }

        if self.low[node] == self.index[node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(member);
                component.push(member.to_string());
                if member == node {
                    break;
                }
            }
            let self_loop = targets.contains(&node);
            if component.len() > 1 || self_loop {
                component.sort();
                self.cycles.push(component);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            graph.add_node(from);
            graph.add_node(to);
            graph.add_edge(from, to, true, false);
        }
        graph
    }

    #[test]
    fn empty_graph_orders_nothing() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert!(graph.topological_order().unwrap().is_empty());
        assert!(graph.detect_cycles().is_empty());
    }

    #[test]
    fn dependencies_come_first() {
        let graph = graph(&[("ext-top", "ext-a"), ("ext-top", "ext-b"), ("ext-a", "core"), ("ext-b", "core")]);
        let order = graph.topological_order().unwrap();
        assert_eq!(order, vec!["core", "ext-a", "ext-b", "ext-top"]);
    }

    #[test]
    fn independent_nodes_are_alphabetical() {
        let mut graph = DependencyGraph::new();
        for name in ["zebra", "alpha", "mid"] {
            graph.add_node(name);
        }
        assert_eq!(graph.topological_order().unwrap(), vec!["alpha", "mid", "zebra"]);
    }

    #[test]
    fn first_edge_for_a_target_wins() {
        let mut graph = DependencyGraph::new();
        graph.add_node("p");
        graph.add_edge("p", "x", true, true);
        graph.add_edge("p", "x", false, false);
        assert_eq!(graph.edge_count(), 1);
        let dep = &graph.dependencies_of("p")[0];
        assert!(dep.required);
        assert!(dep.use_classes);
    }

    #[test]
    fn re_adding_node_keeps_edges() {
        let mut graph = graph(&[("a", "b")]);
        graph.add_node("a");
        assert_eq!(graph.dependencies_of("a").len(), 1);
    }

    #[test]
    fn unknown_targets_are_ignored_by_ordering() {
        let mut graph = DependencyGraph::new();
        graph.add_node("a");
        graph.add_edge("a", "ghost", false, false);
        assert_eq!(graph.topological_order().unwrap(), vec!["a"]);
    }

    #[test]
    fn missing_required_lists_absent_targets_only() {
        let mut graph = DependencyGraph::new();
        graph.add_node("a");
        graph.add_node("b");
        graph.add_edge("a", "b", true, false);
        graph.add_edge("a", "gone", true, false);
        graph.add_edge("a", "maybe", false, false);
        assert_eq!(
            graph.missing_required(),
            vec![("a".to_string(), "gone".to_string())]
        );
        assert_eq!(graph.required_dependencies_of("a").count(), 2);
    }

    #[test]
    fn cycles_are_detected_and_reported() {
        let graph = graph(&[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a"), ("e", "e")]);
        assert_eq!(
            graph.detect_cycles(),
            vec![vec!["a", "b", "c"], vec!["e"]]
        );

        let err = graph.topological_order().unwrap_err();
        assert_eq!(err.cycles.len(), 2);
        assert!(err.to_string().contains("a <-> b <-> c"), "{err}");
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let graph = graph(&[("a", "b"), ("a", "c"), ("b", "c")]);
        assert!(graph.detect_cycles().is_empty());
    }
}
