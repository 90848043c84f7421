//! Type description files
//!
//! Native types are described in TOML documents with one `[[component]]`
//! table per type:
//!
//! ```toml
//! [[component]]
//! name = "QQuickItem"
//! prototype = "QObject"
//! exports = ["Q.Quick/Item 2.0", "Q.Quick/Item 2.1"]
//! export_revisions = ["2.0", "2.1"]
//! default_property = "data"
//!
//! [[component.property]]
//! name = "width"
//! type = "double"
//!
//! [[component.enum]]
//! name = "TransformOrigin"
//! values = ["TopLeft", "Top", "Center"]
//! ```
//!
//! A top-level `dependencies` array of `"Module version"` strings is still
//! understood but deprecated in favour of `depends` in the module's
//! directory manifest.

use serde::Deserialize;
use tessera_types::{
    AccessSemantics, Enumeration, Export, Method, MethodKind, Parameter, Property, Revision,
    TypeDescriptor, TypeGraph,
};
use thiserror::Error;

use crate::manifest::ExportedType;

/// Errors that make a type description unusable as a whole
#[derive(Debug, Error)]
pub enum TypeInfoError {
    /// The document is not valid TOML or does not match the schema
    #[error("Failed to parse type description: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Document {
    dependencies: Vec<String>,
    #[serde(rename = "component")]
    components: Vec<ComponentDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ComponentDecl {
    name: Option<String>,
    file: Option<String>,
    prototype: String,
    exports: Vec<String>,
    export_revisions: Vec<String>,
    attached_type: String,
    value_type: String,
    extension: String,
    extension_is_namespace: bool,
    interfaces: Vec<String>,
    is_singleton: bool,
    is_creatable: bool,
    is_composite: bool,
    access_semantics: Option<String>,
    default_property: Option<String>,
    parent_property: Option<String>,
    #[serde(rename = "property")]
    properties: Vec<PropertyDecl>,
    #[serde(rename = "method")]
    methods: Vec<MethodDecl>,
    #[serde(rename = "signal")]
    signals: Vec<MethodDecl>,
    #[serde(rename = "enum")]
    enums: Vec<EnumDecl>,
}

impl Default for ComponentDecl {
    fn default() -> Self {
        Self {
            name: None,
            file: None,
            prototype: String::new(),
            exports: Vec::new(),
            export_revisions: Vec::new(),
            attached_type: String::new(),
            value_type: String::new(),
            extension: String::new(),
            extension_is_namespace: false,
            interfaces: Vec::new(),
            is_singleton: false,
            is_creatable: true,
            is_composite: false,
            access_semantics: None,
            default_property: None,
            parent_property: None,
            properties: Vec::new(),
            methods: Vec::new(),
            signals: Vec::new(),
            enums: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PropertyDecl {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    is_list: bool,
    is_readonly: bool,
    is_required: bool,
    revision: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MethodDecl {
    name: String,
    #[serde(rename = "type")]
    return_type: String,
    revision: Option<u32>,
    is_constructor: bool,
    #[serde(rename = "parameter")]
    parameters: Vec<ParameterDecl>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParameterDecl {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnumDecl {
    name: String,
    alias: Option<String>,
    #[serde(rename = "type")]
    type_name: String,
    is_flag: bool,
    values: Vec<String>,
}

/// Descriptors read from one type description
#[derive(Debug, Default)]
pub struct TypeInfo {
    /// Internal name and exports of every described type, in file order
    pub objects: Vec<(String, ExportedType)>,
    /// Deprecated `dependencies` entries
    pub dependencies: Vec<String>,
    /// Components that could not be read
    pub errors: Vec<String>,
    /// Recoverable oddities
    pub warnings: Vec<String>,
}

/// Parse a type description and add its descriptors to `graph`
pub fn read_type_info(graph: &mut TypeGraph, source: &str) -> Result<TypeInfo, TypeInfoError> {
    let document: Document = toml::from_str(source)?;
    let mut info = TypeInfo {
        dependencies: document.dependencies,
        ..Default::default()
    };

    for (index, decl) in document.components.into_iter().enumerate() {
        let Some(name) = decl.name.clone().filter(|name| !name.is_empty()) else {
            info.errors
                .push(format!("component #{} has no name", index + 1));
            continue;
        };
        let exports = read_exports(&name, &decl, &mut info.warnings);
        let descriptor = read_component(name.clone(), decl, &exports, &mut info.warnings);
        let ty = graph.add(descriptor);
        info.objects.push((name, ExportedType { ty, exports }));
    }

    Ok(info)
}

fn read_exports(name: &str, decl: &ComponentDecl, warnings: &mut Vec<String>) -> Vec<Export> {
    if !decl.export_revisions.is_empty() && decl.export_revisions.len() != decl.exports.len() {
        warnings.push(format!(
            "{}: {} export revisions for {} exports",
            name,
            decl.export_revisions.len(),
            decl.exports.len()
        ));
    }

    let mut exports = Vec::new();
    for (index, text) in decl.exports.iter().enumerate() {
        let Some((package, exported, version)) = parse_export(text) else {
            warnings.push(format!("{}: malformed export '{}'", name, text));
            continue;
        };
        let revision = match decl.export_revisions.get(index) {
            Some(revision) => Revision::parse(revision).unwrap_or_else(|_| {
                warnings.push(format!("{}: malformed export revision '{}'", name, revision));
                version
            }),
            None => version,
        };
        exports.push(Export::new(package, exported, version, revision));
    }
    exports
}

/// Split `Package/Name 1.0` into its parts
fn parse_export(text: &str) -> Option<(&str, &str, Revision)> {
    let (qualified, version) = text.trim().rsplit_once(' ')?;
    let (package, name) = qualified.trim().rsplit_once('/')?;
    if package.is_empty() || name.is_empty() {
        return None;
    }
    let version = Revision::parse(version).ok()?;
    Some((package, name, version))
}

fn read_semantics(name: &str, text: Option<&str>, warnings: &mut Vec<String>) -> AccessSemantics {
    match text {
        None | Some("reference") => AccessSemantics::Reference,
        Some("value") => AccessSemantics::Value,
        Some("sequence") => AccessSemantics::Sequence,
        Some("none") => AccessSemantics::None,
        Some(other) => {
            warnings.push(format!(
                "{}: unknown access semantics '{}', assuming reference",
                name, other
            ));
            AccessSemantics::Reference
        }
    }
}

fn read_method(decl: MethodDecl, kind: MethodKind) -> Method {
    Method {
        name: decl.name,
        kind,
        return_type_name: decl.return_type,
        return_type: None,
        parameters: decl
            .parameters
            .into_iter()
            .map(|param| Parameter::new(param.name, param.type_name))
            .collect(),
        is_constructor: decl.is_constructor,
        revision: decl.revision,
    }
}

fn read_component(
    name: String,
    decl: ComponentDecl,
    exports: &[Export],
    warnings: &mut Vec<String>,
) -> TypeDescriptor {
    let mut desc = TypeDescriptor::named(name.clone());
    desc.module_name = exports
        .first()
        .map(|export| export.package.clone())
        .unwrap_or_default();
    desc.file_path = decl.file.map(Into::into);
    desc.base_type_name = decl.prototype;
    desc.semantics = read_semantics(&name, decl.access_semantics.as_deref(), warnings);
    desc.is_composite = decl.is_composite;
    desc.is_singleton = decl.is_singleton;
    desc.is_creatable = decl.is_creatable;
    desc.attached_type_name = decl.attached_type;
    desc.value_type_name = decl.value_type;
    desc.extension_type_name = decl.extension;
    desc.extension_is_namespace = decl.extension_is_namespace;
    desc.interface_names = decl.interfaces;
    desc.default_property = decl.default_property;
    desc.parent_property = decl.parent_property;

    for property in decl.properties {
        desc.add_property(Property {
            name: property.name,
            type_name: property.type_name,
            ty: None,
            is_list: property.is_list,
            is_writable: !property.is_readonly,
            is_required: property.is_required,
            revision: property.revision,
        });
    }
    for method in decl.methods {
        desc.add_method(read_method(method, MethodKind::Method));
    }
    for signal in decl.signals {
        desc.add_method(read_method(signal, MethodKind::Signal));
    }
    for decl in decl.enums {
        desc.add_enumeration(Enumeration {
            name: decl.name,
            alias: decl.alias,
            keys: decl.values,
            values: Vec::new(),
            is_flag: decl.is_flag,
            type_name: decl.type_name,
            ty: None,
        });
    }
    desc
}
