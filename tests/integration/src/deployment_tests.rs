//! End-to-end tests for re-scans, obsolescence and deployment planning

use std::sync::Mutex;

use plugin_core::{
    Basis, DependencyGraph, DeploymentPlan, Error, PluginGraph, PluginScanner,
    ingest_dependencies,
};
use plugin_descriptor::DescriptorLoader;
use plugin_test_utils::xml::{descriptor_with_depends, minimal_descriptor};
use plugin_test_utils::{ArchiveBuilder, PluginDir};
use pretty_assertions::assert_eq;

fn plugin_with_optional(name: &str, version: &str, runs_inside: &str) -> String {
    format!(
        r#"<plugin name="{name}" version="{version}">
  <server name="{name} Server">
    <runs-inside><parent-resource-type name="Host" plugin="{runs_inside}"/></runs-inside>
  </server>
</plugin>"#
    )
}

#[test]
fn rescan_after_upgrade_replaces_plugin() {
    let dir = PluginDir::new();
    let old = dir.add(
        "jmx-1.0.jar",
        &ArchiveBuilder::new().descriptor(&minimal_descriptor("jmx", Some("1.0"))),
    );
    dir.set_mtime(&old, 1_000);

    let scanner = PluginScanner::default();
    let first = scanner.scan(dir.root()).unwrap();
    assert_eq!(first.plugins[0].plugin.path, old);

    let new = dir.add(
        "jmx-1.1.jar",
        &ArchiveBuilder::new().descriptor(&minimal_descriptor("jmx", Some("1.1"))),
    );
    dir.set_mtime(&new, 500);

    let second = scanner.scan(dir.root()).unwrap();
    assert_eq!(second.plugins.len(), 1);
    assert_eq!(second.plugins[0].plugin.path, new);
    assert_eq!(second.obsolete[0].path, old);
    assert_eq!(second.obsolete[0].basis, Some(Basis::Version));
}

#[test]
fn rebuilt_archive_with_same_version_wins_by_timestamp() {
    let dir = PluginDir::new();
    let a = dir.add(
        "agent-a.jar",
        &ArchiveBuilder::new()
            .descriptor(&minimal_descriptor("agent", Some("3.0")))
            .entry("build.txt", "1"),
    );
    let b = dir.add(
        "agent-b.jar",
        &ArchiveBuilder::new()
            .descriptor(&minimal_descriptor("agent", Some("3.0")))
            .entry("build.txt", "2"),
    );
    dir.set_mtime(&a, 2_000);
    dir.set_mtime(&b, 1_000);

    let report = PluginScanner::default().scan(dir.root()).unwrap();
    assert_eq!(report.plugins[0].plugin.path, a);
    assert_eq!(report.obsolete[0].path, b);
    assert_eq!(report.obsolete[0].basis, Some(Basis::Timestamp));
}

#[test]
fn plan_covers_required_and_optional_edges() {
    let dir = PluginDir::new();
    dir.add(
        "platform.jar",
        &ArchiveBuilder::new().descriptor(&minimal_descriptor("platform", Some("1.0"))),
    );
    dir.add(
        "jmx.jar",
        &ArchiveBuilder::new().descriptor(&plugin_with_optional("jmx", "1.0", "platform")),
    );
    dir.add(
        "jboss-as.jar",
        &ArchiveBuilder::new().descriptor(&descriptor_with_depends("jboss-as", "4.3.0", &["jmx"])),
    );
    // Optional dependency on a plugin that is not deployed.
    dir.add(
        "apache.jar",
        &ArchiveBuilder::new().descriptor(&plugin_with_optional("apache", "2.2", "absent")),
    );

    let report = PluginScanner::default().scan(dir.root()).unwrap();
    let plan = DeploymentPlan::build(&report).unwrap();

    assert_eq!(plan.order, vec!["apache", "platform", "jmx", "jboss-as"]);
    assert!(plan.graph.missing_required().is_empty());
    assert_eq!(plan.graph.dependencies_of("apache")[0].plugin, "absent");
}

#[test]
fn cyclic_plugins_fail_with_cycle_error() {
    let dir = PluginDir::new();
    dir.add(
        "a.jar",
        &ArchiveBuilder::new().descriptor(&descriptor_with_depends("a", "1.0", &["b"])),
    );
    dir.add(
        "b.jar",
        &ArchiveBuilder::new().descriptor(&plugin_with_optional("b", "1.0", "a")),
    );

    let report = PluginScanner::default().scan(dir.root()).unwrap();
    let err = DeploymentPlan::build(&report).unwrap_err();
    match err {
        Error::Cycle(cycle) => assert_eq!(cycle.cycles, vec![vec!["a", "b"]]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn concurrent_loads_share_one_loader() {
    let dir = PluginDir::new();
    let paths: Vec<_> = (0..8)
        .map(|i| {
            let name = format!("p{i}");
            dir.add(
                &format!("{name}.jar"),
                &ArchiveBuilder::new().descriptor(&descriptor_with_depends(&name, "1.0", &["core"])),
            )
        })
        .collect();

    let loader = DescriptorLoader::new();
    let graph = Mutex::new(DependencyGraph::new());
    std::thread::scope(|scope| {
        for path in &paths {
            let loader = &loader;
            let graph = &graph;
            scope.spawn(move || {
                let descriptor = loader.load_descriptor(path).unwrap();
                // Ingestion into the shared graph is serialized by the caller.
                ingest_dependencies(&mut *graph.lock().unwrap(), &descriptor);
            });
        }
    });

    let mut graph = graph.into_inner().unwrap();
    graph.add_node("core");
    assert_eq!(graph.node_count(), 9);
    assert_eq!(graph.edge_count(), 8);
    let order = graph.topological_order().unwrap();
    assert_eq!(order[0], "core");
}
