//! Descriptor document parsing.
//!
//! [`parse`] turns document bytes into a typed document. In
//! [`Validation::Strict`] mode the document is checked against a [`Schema`]
//! first and every event is returned as a [`Diagnostic`]; only fatal events
//! stop the parse. [`Validation::Lax`] skips the structural check and is
//! used as the fallback path.
//!
//! Either way the typed model is built by walking the element tree against
//! the fixed grammar; unknown elements are skipped, and an attribute the
//! model cannot do without (such as the plugin `name`) is a hard error.

use roxmltree::Node;

use crate::diagnostic::Diagnostic;
use crate::error::ParseError;
use crate::model::{
    BundleDescriptor, CannedExpression, CannedExpressions, Dependency, Descriptor,
    ResourceCategory, ResourceDescriptor, ResourceTypeRef,
};
use crate::schema::{self, CANNED_EXPRESSIONS_SCHEMA, PLUGIN_DESCRIPTOR_SCHEMA, Schema};

/// Whether to enforce a structural schema while parsing.
#[derive(Debug, Clone, Copy)]
pub enum Validation<'a> {
    Strict(&'a Schema),
    Lax,
}

impl Validation<'_> {
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict(_))
    }
}

/// A document type that can be built from its root element.
pub trait Document: Sized {
    /// Local name of the root element.
    const ROOT: &'static str;
    /// Resource name of the schema the document is validated against.
    const SCHEMA: &'static str;

    fn from_root(root: Node<'_, '_>) -> Result<Self, ParseError>;
}

/// The result of one parse attempt together with its diagnostics.
///
/// Diagnostics are kept on failure as well, so the caller can log them
/// before surfacing the error.
#[derive(Debug)]
pub struct ParseOutcome<D> {
    pub result: Result<D, ParseError>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<D> ParseOutcome<D> {
    pub fn into_result(self) -> Result<(D, Vec<Diagnostic>), ParseError> {
        let diagnostics = self.diagnostics;
        self.result.map(|d| (d, diagnostics))
    }
}

/// Parse `bytes` as a `D` document.
pub fn parse<D: Document>(bytes: &[u8], validation: Validation<'_>) -> ParseOutcome<D> {
    let mut diagnostics = Vec::new();
    let result = parse_into(bytes, validation, &mut diagnostics);
    ParseOutcome {
        result,
        diagnostics,
    }
}

fn parse_into<D: Document>(
    bytes: &[u8],
    validation: Validation<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<D, ParseError> {
    let text = std::str::from_utf8(bytes)?;
    let document = roxmltree::Document::parse(text)?;

    if let Validation::Strict(schema) = validation {
        diagnostics.extend(schema.validate(&document));
        let fatal: Vec<Diagnostic> = diagnostics.iter().filter(|d| d.is_fatal()).cloned().collect();
        if !fatal.is_empty() {
            return Err(ParseError::Invalid { fatal });
        }
    }

    let root = document.root_element();
    if root.tag_name().name() != D::ROOT {
        return Err(ParseError::UnexpectedRoot {
            found: root.tag_name().name().to_string(),
            expected: D::ROOT.to_string(),
        });
    }

    D::from_root(root)
}

impl Document for Descriptor {
    const ROOT: &'static str = "plugin";
    const SCHEMA: &'static str = PLUGIN_DESCRIPTOR_SCHEMA;

    fn from_root(root: Node<'_, '_>) -> Result<Self, ParseError> {
        let name = non_empty(root, "name")?;
        let mut descriptor = Descriptor {
            name,
            display_name: optional(root, "displayName"),
            version: optional(root, "version"),
            description: optional(root, "description"),
            help: None,
            package: optional(root, "package"),
            depends: Vec::new(),
            resources: Vec::new(),
        };

        for child in root.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "help" => descriptor.help = element_text(child),
                "depends" => descriptor.depends.push(Dependency::required(
                    required(child, "plugin")?,
                    boolean(child, "useClasses", false)?,
                )),
                other => {
                    if let Some(category) = ResourceCategory::from_element(other) {
                        descriptor.resources.push(resource(child, category)?);
                    }
                }
            }
        }

        Ok(descriptor)
    }
}

fn resource(node: Node<'_, '_>, category: ResourceCategory) -> Result<ResourceDescriptor, ParseError> {
    let mut resource = ResourceDescriptor::new(category, required(node, "name")?);
    resource.description = optional(node, "description");
    resource.source_plugin = optional(node, "sourcePlugin");
    resource.source_type = optional(node, "sourceType");

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "runs-inside" => {
                for parent in elements(child, "parent-resource-type") {
                    resource.runs_inside.push(type_ref(parent)?);
                }
            }
            "bundle" => {
                let mut targets = Vec::new();
                for holder in elements(child, "targets") {
                    for target in elements(holder, "resource-type") {
                        targets.push(type_ref(target)?);
                    }
                }
                resource.bundle = Some(BundleDescriptor {
                    bundle_type: required(child, "type")?,
                    targets,
                });
            }
            other => {
                if let Some(category) = ResourceCategory::from_element(other) {
                    resource.children.push(self::resource(child, category)?);
                }
            }
        }
    }

    Ok(resource)
}

fn type_ref(node: Node<'_, '_>) -> Result<ResourceTypeRef, ParseError> {
    Ok(ResourceTypeRef {
        name: required(node, "name")?,
        plugin: optional(node, "plugin"),
    })
}

impl Document for CannedExpressions {
    const ROOT: &'static str = "canned-group-expressions";
    const SCHEMA: &'static str = CANNED_EXPRESSIONS_SCHEMA;

    fn from_root(root: Node<'_, '_>) -> Result<Self, ParseError> {
        let mut expressions = Vec::new();
        for expr in elements(root, "expr") {
            expressions.push(CannedExpression {
                id: non_empty(expr, "id")?,
                name: required(expr, "name")?,
                description: optional(expr, "description"),
                expression: elements(expr, "expression")
                    .filter_map(element_text)
                    .collect(),
                recursive: boolean(expr, "recursive", false)?,
                create_by_default: boolean(expr, "createByDefault", true)?,
                recalc_in_minutes: integer(expr, "recalcInMinutes", 0)?,
            });
        }
        Ok(Self { expressions })
    }
}

fn elements<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}

fn element_text(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|t| t.text())
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn optional(node: Node<'_, '_>, attribute: &str) -> Option<String> {
    node.attribute(attribute)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(node: Node<'_, '_>, attribute: &str) -> Result<String, ParseError> {
    node.attribute(attribute)
        .map(|v| v.trim().to_string())
        .ok_or_else(|| {
            let (line, column) = schema::position(node);
            ParseError::MissingAttribute {
                element: node.tag_name().name().to_string(),
                attribute: attribute.to_string(),
                line,
                column,
            }
        })
}

fn non_empty(node: Node<'_, '_>, attribute: &str) -> Result<String, ParseError> {
    let value = required(node, attribute)?;
    if value.is_empty() {
        return Err(invalid(node, attribute, &value, "must not be empty"));
    }
    Ok(value)
}

fn boolean(node: Node<'_, '_>, attribute: &str, default: bool) -> Result<bool, ParseError> {
    match node.attribute(attribute).map(str::trim) {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(invalid(node, attribute, other, "expected true or false")),
    }
}

fn integer(node: Node<'_, '_>, attribute: &str, default: u32) -> Result<u32, ParseError> {
    match node.attribute(attribute).map(str::trim) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| invalid(node, attribute, value, "expected a non-negative integer")),
    }
}

fn invalid(node: Node<'_, '_>, attribute: &str, value: &str, reason: &str) -> ParseError {
    let (line, column) = schema::position(node);
    ParseError::InvalidAttribute {
        element: node.tag_name().name().to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
        line,
        column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::schema::BuiltinSchemas;
    use pretty_assertions::assert_eq;

    fn strict_schema() -> Schema {
        Schema::load(&BuiltinSchemas, PLUGIN_DESCRIPTOR_SCHEMA).unwrap()
    }

    fn parse_strict(xml: &str) -> ParseOutcome<Descriptor> {
        let schema = strict_schema();
        parse::<Descriptor>(xml.as_bytes(), Validation::Strict(&schema))
    }

    const FULL: &str = r#"<?xml version="1.0"?>
<plugin xmlns="urn:xmlns:plugin-descriptor" name="jboss-as" displayName="JBoss AS"
        version="4.3.0" package="org.example.jboss" description="JBoss application server">
  <help>
    Manages JBoss AS instances.
  </help>
  <depends plugin="JMX" useClasses="true"/>
  <depends plugin="Tomcat"/>
  <platform name="Linux">
    <server name="JBoss AS Server" sourcePlugin="JMX" sourceType="JMX Server">
      <runs-inside>
        <parent-resource-type name="Agent" plugin="rhq-agent"/>
      </runs-inside>
      <bundle type="Ant Bundle">
        <targets>
          <resource-type name="Tomcat Server" plugin="Tomcat"/>
        </targets>
      </bundle>
      <service name="Datasource">
        <service name="Connection Pool"/>
      </service>
    </server>
  </platform>
  <service name="Standalone Service"/>
</plugin>
"#;

    #[test]
    fn parses_full_descriptor() {
        let (descriptor, diagnostics) = parse_strict(FULL).into_result().unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        assert_eq!(descriptor.name, "jboss-as");
        assert_eq!(descriptor.display_name(), "JBoss AS");
        assert_eq!(descriptor.version.as_deref(), Some("4.3.0"));
        assert_eq!(descriptor.package.as_deref(), Some("org.example.jboss"));
        assert_eq!(descriptor.help.as_deref(), Some("Manages JBoss AS instances."));

        assert_eq!(descriptor.depends.len(), 2);
        assert!(descriptor.depends[0].use_classes);
        assert!(descriptor.depends[0].required);
        assert!(!descriptor.depends[1].use_classes);

        assert_eq!(descriptor.resources.len(), 2);
        let server = &descriptor.resources[0].children[0];
        assert_eq!(server.category, ResourceCategory::Server);
        assert_eq!(server.source_plugin.as_deref(), Some("JMX"));
        assert_eq!(server.runs_inside[0].plugin.as_deref(), Some("rhq-agent"));
        let bundle = server.bundle.as_ref().unwrap();
        assert_eq!(bundle.bundle_type, "Ant Bundle");
        assert_eq!(bundle.targets[0].plugin.as_deref(), Some("Tomcat"));
        assert_eq!(server.children[0].children[0].name, "Connection Pool");
        assert_eq!(descriptor.walk().len(), 5);
    }

    #[test]
    fn warnings_do_not_fail_strict_parse() {
        let outcome = parse_strict(r#"<plugin name="p" colour="red"><widget/></plugin>"#);
        assert_eq!(outcome.diagnostics.len(), 2);
        assert_eq!(outcome.diagnostics[0].severity, Severity::Warning);
        assert_eq!(outcome.diagnostics[1].severity, Severity::Error);
        assert_eq!(outcome.result.unwrap().name, "p");
    }

    #[test]
    fn fatal_diagnostic_fails_strict_parse() {
        let outcome = parse_strict("<plugins/>");
        assert!(matches!(outcome.result, Err(ParseError::Invalid { .. })));
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn lax_parse_ignores_structure() {
        let outcome = parse::<Descriptor>(
            br#"<plugin name="p" colour="red"><widget><depends plugin="x"/></widget></plugin>"#,
            Validation::Lax,
        );
        assert!(outcome.diagnostics.is_empty());
        let descriptor = outcome.result.unwrap();
        assert!(descriptor.depends.is_empty());
    }

    #[test]
    fn lax_parse_still_checks_root() {
        let outcome = parse::<Descriptor>(b"<plugins/>", Validation::Lax);
        assert!(matches!(outcome.result, Err(ParseError::UnexpectedRoot { .. })));
    }

    #[test]
    fn missing_name_is_error_in_both_modes() {
        let strict = parse_strict("<plugin version=\"1\"/>");
        assert!(matches!(strict.result, Err(ParseError::MissingAttribute { .. })));
        assert_eq!(strict.diagnostics.len(), 1);

        let lax = parse::<Descriptor>(b"<plugin version=\"1\"/>", Validation::Lax);
        assert!(matches!(lax.result, Err(ParseError::MissingAttribute { .. })));
    }

    #[test]
    fn empty_name_is_invalid() {
        let outcome = parse::<Descriptor>(b"<plugin name=\"  \"/>", Validation::Lax);
        assert!(matches!(outcome.result, Err(ParseError::InvalidAttribute { .. })));
    }

    #[test]
    fn bad_boolean_is_invalid() {
        let outcome = parse::<Descriptor>(
            br#"<plugin name="p"><depends plugin="q" useClasses="yes"/></plugin>"#,
            Validation::Lax,
        );
        let err = outcome.result.unwrap_err();
        assert!(err.to_string().contains("useClasses"), "{err}");
    }

    #[test]
    fn malformed_xml_is_error() {
        let outcome = parse::<Descriptor>(b"<plugin name=\"p\">", Validation::Lax);
        assert!(matches!(outcome.result, Err(ParseError::Malformed(_))));
    }

    #[test]
    fn invalid_utf8_is_error() {
        let outcome = parse::<Descriptor>(&[0x3c, 0xff, 0xfe], Validation::Lax);
        assert!(matches!(outcome.result, Err(ParseError::Encoding(_))));
    }

    #[test]
    fn parses_canned_expressions() {
        let schema = Schema::load(&BuiltinSchemas, CANNED_EXPRESSIONS_SCHEMA).unwrap();
        let xml = r#"<canned-group-expressions>
  <expr id="all" name="All" recursive="true" recalcInMinutes="10">
    <expression>resource.type.category = SERVER</expression>
    <expression>groupby resource.trait[version]</expression>
  </expr>
  <expr id="none" name="None" createByDefault="false"/>
</canned-group-expressions>"#;
        let (canned, diagnostics) = parse::<CannedExpressions>(xml.as_bytes(), Validation::Strict(&schema))
            .into_result()
            .unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(canned.expressions.len(), 2);
        let all = &canned.expressions[0];
        assert_eq!(all.expression.len(), 2);
        assert!(all.recursive);
        assert!(all.create_by_default);
        assert_eq!(all.recalc_in_minutes, 10);
        assert!(!canned.expressions[1].create_by_default);
    }
}
