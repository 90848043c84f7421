//! Shared fixtures for importer integration tests

#![allow(dead_code)]

use std::path::Path;
use std::rc::Rc;

use tessera_import::{
    ComponentFrontEnd, FileSystem, FrontEndError, Importer, ImporterConfig, MemoryFileSystem,
};
use tessera_types::{
    NamespaceTable, Property, Revision, ScopeKind, TypeDescriptor, TypeId, UsedTypes,
};

pub const BUILTINS: &str = r#"
[[component]]
name = "int"
access_semantics = "value"
exports = ["QML/int 1.0"]

[[component]]
name = "double"
access_semantics = "value"
exports = ["QML/real 1.0", "QML/double 1.0"]

[[component]]
name = "QString"
access_semantics = "value"
exports = ["QML/string 1.0"]

[[component]]
name = "QObject"
exports = ["QML/QtObject 1.0"]

[[component.property]]
name = "objectName"
type = "QString"
"#;

pub const JSROOT: &str = r#"
[[component]]
name = "Array"
is_creatable = false

[[component]]
name = "GlobalObject"
is_creatable = false
"#;

pub const QUICK_QMLDIR: &str = "\
module Q.Quick
typeinfo quick.qmltypes
Rect 2.0 Rect.qml
";

pub const QUICK_TYPES: &str = r#"
[[component]]
name = "QQuickItem"
prototype = "QObject"
exports = ["Q.Quick/Item 2.0", "Q.Quick/Item 2.1"]
export_revisions = ["2.0", "2.1"]
default_property = "children"

[[component.property]]
name = "children"
type = "QQuickItem"
is_list = true

[[component.property]]
name = "width"
type = "double"

[[component.enum]]
name = "TransformOrigin"
alias = "Origin"
values = ["TopLeft", "Center"]
"#;

/// File tree with the builtins on the import path
pub fn base_tree() -> MemoryFileSystem {
    MemoryFileSystem::new()
        .with_file("/imports/builtins.qmltypes", BUILTINS)
        .with_file("/imports/jsroot.qmltypes", JSROOT)
}

/// Builtins plus the `Q.Quick` module
pub fn quick_tree() -> MemoryFileSystem {
    base_tree()
        .with_file("/imports/Q/Quick/qmldir", QUICK_QMLDIR)
        .with_file("/imports/Q/Quick/quick.qmltypes", QUICK_TYPES)
        .with_file("/imports/Q/Quick/Rect.qml", "import Q.Quick 2.0\nbase Item\n")
}

/// Importer over `fs` searching `/imports`, with [`LineFrontEnd`]
pub fn importer(fs: &Rc<MemoryFileSystem>) -> Importer {
    let fs: Rc<dyn FileSystem> = fs.clone();
    Importer::new(ImporterConfig::with_import_paths(["/imports"]))
        .with_file_system(fs)
        .with_front_end(Rc::new(LineFrontEnd))
}

/// Component front end for a tiny line based format:
///
/// ```text
/// import Module [version]
/// base TypeName
/// property name TypeName
/// inline Name
/// singleton
/// ```
///
/// Components also see the builtins and every component of their own
/// directory.
pub struct LineFrontEnd;

fn fail(err: impl std::fmt::Display) -> FrontEndError {
    FrontEndError::new(err.to_string())
}

fn merge_into(scope: &mut NamespaceTable, other: &NamespaceTable) {
    scope.merge(other).expect("visible tables merge");
}

impl ComponentFrontEnd for LineFrontEnd {
    fn populate(
        &self,
        importer: &mut Importer,
        file: &Path,
        target: TypeId,
    ) -> Result<(), FrontEndError> {
        let source = importer.file_system().read_to_string(file).map_err(fail)?;
        let mut scope = importer.import_builtins().map_err(fail)?;
        if let Some(directory) = file.parent() {
            let local = importer.import_directory(directory, "").map_err(fail)?;
            merge_into(&mut scope, &local);
        }

        let mut inline = Vec::new();
        for (index, line) in source.lines().enumerate() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [] => {}
                ["import", module] => {
                    let types = importer
                        .import_module(module, "", Revision::invalid())
                        .map_err(fail)?;
                    merge_into(&mut scope, &types);
                }
                ["import", module, version] => {
                    let version = Revision::parse(version).map_err(fail)?;
                    let types = importer.import_module(module, "", version).map_err(fail)?;
                    merge_into(&mut scope, &types);
                }
                ["base", name] => importer.graph_mut()[target].base_type_name = name.to_string(),
                ["property", name, type_name] => importer.graph_mut()[target]
                    .add_property(Property::new(*name, *type_name)),
                ["inline", name] => inline.push(name.to_string()),
                ["singleton"] => importer.graph_mut()[target].is_singleton = true,
                _ => {
                    return Err(FrontEndError::new(format!("unexpected line '{}'", line))
                        .at_line(index + 1))
                }
            }
        }

        for name in inline {
            let mut desc = TypeDescriptor::new(ScopeKind::InlineComponent);
            desc.internal_name = name;
            desc.base_type_name = "QtObject".to_string();
            desc.is_composite = true;
            importer.graph_mut().add_child(target, desc);
        }

        let mut used = UsedTypes::default();
        importer.resolve_component(target, &scope, &mut used);
        Ok(())
    }
}
