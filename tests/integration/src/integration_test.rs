//! End-to-end tests from archive bytes to typed descriptors and records

use std::sync::Arc;

use plugin_core::{DeployerConfig, PluginScanner, collect_dependencies};
use plugin_descriptor::{CollectingSink, DescriptorLoader, Error, Severity};
use plugin_test_utils::xml::{CANNED_EXPRESSIONS, PLATFORM_WITH_SERVERS};
use plugin_test_utils::{ArchiveBuilder, PluginDir};
use pretty_assertions::assert_eq;

/// A descriptor from a newer grammar: the schema rejects it as fatal and
/// the lax walker cannot model it either.
const FUTURE_ROOT: &str = r#"<plugin-v2 name="future"/>"#;

/// Config whose validator is broken: the descriptor is checked against the
/// canned expressions schema, so every descriptor fails with a fatal
/// diagnostic.
fn broken_validator_config(runtime: &str) -> DeployerConfig {
    let mut config = DeployerConfig::from_toml(
        "[environment]\ndefective_signatures = [\"broken-vm\"]\n",
        "plugin-deployer.toml".as_ref(),
    )
    .unwrap();
    config.descriptor.schema = plugin_descriptor::CANNED_EXPRESSIONS_SCHEMA.to_string();
    config.environment.runtime = Some(runtime.to_string());
    config
}

const JBOSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plugin name="jboss-as" displayName="JBoss AS" package="org.example.jboss"
        description="JBoss Application Server">
  <help>Manages JBoss AS 4.x instances.</help>
  <depends plugin="jmx" useClasses="true"/>
  <server name="JBoss AS Server" sourcePlugin="jmx" sourceType="JMX Server">
    <runs-inside>
      <parent-resource-type name="Linux" plugin="platform"/>
    </runs-inside>
    <bundle type="Ant Bundle">
      <targets>
        <resource-type name="Tomcat Server" plugin="tomcat"/>
      </targets>
    </bundle>
    <service name="Datasource">
      <service name="Connection Pool" sourcePlugin="jdbc"/>
    </service>
  </server>
</plugin>
"#;

#[test]
fn full_descriptor_round_through_scanner() {
    let dir = PluginDir::new();
    let path = dir.add(
        "jboss-as.jar",
        &ArchiveBuilder::new()
            .descriptor(JBOSS)
            .canned_expressions(CANNED_EXPRESSIONS)
            .implementation_version("4.3.0.GA"),
    );

    let loaded = PluginScanner::default().load(&path).unwrap();
    assert_eq!(loaded.plugin.name, "jboss-as");
    assert_eq!(loaded.plugin.display_name, "JBoss AS");
    assert_eq!(loaded.plugin.version.as_ref().unwrap().as_str(), "4.3.0.GA");
    assert_eq!(loaded.plugin.help.as_deref(), Some("Manages JBoss AS 4.x instances."));
    assert_eq!(
        loaded.plugin.description.as_deref(),
        Some("JBoss Application Server")
    );

    let deps: Vec<(String, bool)> = collect_dependencies(&loaded.descriptor)
        .iter()
        .map(|d| (d.plugin.clone(), d.required))
        .collect();
    assert_eq!(
        deps,
        vec![
            ("jmx".to_string(), true),
            ("platform".to_string(), false),
            ("tomcat".to_string(), false),
            ("jdbc".to_string(), false),
        ]
    );

    let canned = loaded.canned_expressions.unwrap();
    assert_eq!(canned.expressions[0].reference_key("jboss-as"), "jboss-as:all-servers");
}

#[test]
fn configured_fallback_rescues_defective_runtime() {
    let dir = PluginDir::new();
    let path = dir.add(
        "this-plugin.jar",
        &ArchiveBuilder::new()
            .descriptor(PLATFORM_WITH_SERVERS)
            .implementation_version("1.0"),
    );

    let loaded = PluginScanner::new(broken_validator_config("Broken-VM 1.6"))
        .load(&path)
        .unwrap();
    assert_eq!(loaded.plugin.name, "this-plugin");
    assert_eq!(loaded.descriptor.depends.len(), 1);
}

#[test]
fn healthy_runtime_surfaces_the_strict_failure() {
    let dir = PluginDir::new();
    let path = dir.add(
        "this-plugin.jar",
        &ArchiveBuilder::new().descriptor(PLATFORM_WITH_SERVERS),
    );

    let err = broken_validator_config("HotSpot 21")
        .loader()
        .load_descriptor(&path)
        .unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(err.to_string().contains("this-plugin.jar"), "{err}");
}

#[test]
fn fallback_retry_still_requires_the_right_root() {
    let dir = PluginDir::new();
    let path = dir.add("future.jar", &ArchiveBuilder::new().descriptor(FUTURE_ROOT));

    let err = broken_validator_config("broken-vm")
        .loader()
        .load_descriptor(&path)
        .unwrap_err();
    assert!(err.to_string().contains("unexpected root element"), "{err}");
}

#[test]
fn every_diagnostic_reaches_the_sink() {
    let xml = r#"<plugin name="p" version="1.0" colour="red">
  <platform name="Linux">
    <widget/>
    <server/>
  </platform>
</plugin>"#;
    let dir = PluginDir::new();
    let path = dir.add("p.jar", &ArchiveBuilder::new().descriptor(xml));
    let sink = Arc::new(CollectingSink::new());

    // <server/> without a name cannot be modelled, so the load fails, but
    // only after every diagnostic has been reported.
    let err = DescriptorLoader::new()
        .with_sink(sink.clone())
        .load_descriptor(&path)
        .unwrap_err();
    assert!(err.to_string().contains("'name'"), "{err}");

    let reported: Vec<(Severity, u32)> = sink
        .take()
        .into_iter()
        .map(|r| (r.diagnostic.severity, r.diagnostic.line))
        .collect();
    assert_eq!(
        reported,
        vec![
            (Severity::Warning, 1),
            (Severity::Error, 3),
            (Severity::Error, 4),
        ]
    );
}

#[test]
fn validation_disabled_by_config() {
    let dir = PluginDir::new();
    let path = dir.add(
        "p.jar",
        &ArchiveBuilder::new().descriptor(PLATFORM_WITH_SERVERS),
    );
    let mut config = DeployerConfig::default();
    config.descriptor.validate = false;
    config.descriptor.schema = "not-consulted".to_string();

    let descriptor = config.loader().load_descriptor(&path).unwrap();
    assert_eq!(descriptor.name, "this-plugin");
}

#[test]
fn manifest_is_read_through_the_archive_reader() {
    let dir = PluginDir::new();
    let path = dir.add(
        "p.jar",
        &ArchiveBuilder::new().manifest(
            "Manifest-Version: 1.0\r\nImplementation-Title: p\r\nImplementation-Version: \r\n 2.1.0\r\n\r\n",
        ),
    );
    let manifest = plugin_archive::read_manifest(&path).unwrap().unwrap();
    assert_eq!(manifest.implementation_version(), Some("2.1.0"));
}
