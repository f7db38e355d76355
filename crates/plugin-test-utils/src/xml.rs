//! Descriptor documents shared by the test suites.

/// A descriptor with a name and an optional `version` attribute.
pub fn minimal_descriptor(name: &str, version: Option<&str>) -> String {
    match version {
        Some(v) => format!(r#"<plugin name="{name}" version="{v}"/>"#),
        None => format!(r#"<plugin name="{name}"/>"#),
    }
}

/// A descriptor declaring direct `<depends>` on each of `depends`.
pub fn descriptor_with_depends(name: &str, version: &str, depends: &[&str]) -> String {
    let mut xml = format!("<plugin name=\"{name}\" version=\"{version}\">\n");
    for dep in depends {
        xml.push_str(&format!("  <depends plugin=\"{dep}\"/>\n"));
    }
    xml.push_str("</plugin>\n");
    xml
}

/// A platform with two servers: one runs inside a `core` resource type,
/// the plugin also declares a direct dependency on `net`.
pub const PLATFORM_WITH_SERVERS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plugin name="this-plugin" version="1.0" displayName="This Plugin">
  <depends plugin="net" useClasses="true"/>
  <platform name="Linux">
    <server name="Agent">
      <runs-inside>
        <parent-resource-type name="Core Server" plugin="core"/>
      </runs-inside>
    </server>
    <server name="Standalone"/>
  </platform>
</plugin>
"#;

/// A canned group expressions document with two entries.
pub const CANNED_EXPRESSIONS: &str = r#"<canned-group-expressions>
  <expr id="all-servers" name="All Servers" description="Every server" recursive="true" recalcInMinutes="5">
    <expression>resource.type.category = SERVER</expression>
  </expr>
  <expr id="by-version" name="Servers by version" createByDefault="false">
    <expression>resource.type.category = SERVER</expression>
    <expression>groupby resource.trait[version]</expression>
  </expr>
</canned-group-expressions>
"#;
