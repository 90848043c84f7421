//! Integration tests for module import resolution
//!
//! Every test runs the importer against an in-memory file tree so file
//! reads can be counted.

mod common;

use std::path::PathBuf;
use std::rc::Rc;

use common::{base_tree, importer, quick_tree, JSROOT, BUILTINS};
use tessera_import::{DiagnosticKind, ImportError, MemoryFileSystem, Severity};
use tessera_types::resolve;
use tessera_types::{AccessSemantics, Lookup, Revision, UsedTypes};

fn kinds(importer: &tessera_import::Importer) -> Vec<DiagnosticKind> {
    importer.diagnostics().iter().map(|d| d.kind).collect()
}

#[test]
fn test_repeated_import_reads_files_once() {
    let fs = Rc::new(quick_tree());
    let mut importer = importer(&fs);

    let first = importer
        .import_module("Q.Quick", "", Revision::new(2, 1))
        .unwrap();
    let second = importer
        .import_module("Q.Quick", "", Revision::new(2, 1))
        .unwrap();

    assert_eq!(first.names(), vec!["Item", "Rect"]);
    assert_eq!(first.names(), second.names());
    assert_eq!(first.get("Item"), second.get("Item"));
    assert_eq!(fs.read_count("/imports/Q/Quick/qmldir"), 1);
    assert_eq!(fs.read_count("/imports/Q/Quick/quick.qmltypes"), 1);
    assert_eq!(fs.read_count("/imports/builtins.qmltypes"), 1);
    assert!(importer.cache_stats().import_hits >= 1);
    assert!(importer.diagnostics().is_empty());
}

#[test]
fn test_version_gates_exports() {
    let fs = Rc::new(quick_tree());
    let mut importer = importer(&fs);

    let old = importer
        .import_module("Q.Quick", "", Revision::new(2, 0))
        .unwrap();
    let new = importer
        .import_module("Q.Quick", "", Revision::new(2, 1))
        .unwrap();

    let Lookup::Found(old_item, old_revision) = old.lookup("Item") else {
        panic!("Item missing from 2.0 import");
    };
    let Lookup::Found(new_item, new_revision) = new.lookup("Item") else {
        panic!("Item missing from 2.1 import");
    };
    assert_eq!(old_item, new_item);
    assert_eq!(old_revision, Revision::new(2, 0));
    assert_eq!(new_revision, Revision::new(2, 1));

    // A new key, but the parsed manifest is reused.
    assert_eq!(fs.read_count("/imports/Q/Quick/qmldir"), 1);
}

#[test]
fn test_unserved_major_version_is_not_found() {
    let fs = Rc::new(quick_tree());
    let mut importer = importer(&fs);

    let types = importer
        .import_module("Q.Quick", "", Revision::major_only(3))
        .unwrap();

    assert!(types.is_empty());
    let diagnostic = importer
        .diagnostics()
        .iter()
        .find(|d| d.kind == DiagnosticKind::ModuleNotFound)
        .expect("module not found diagnostic");
    assert_eq!(
        diagnostic.message,
        "Failed to import Q.Quick. Are your import paths set up properly?"
    );
}

#[test]
fn test_failed_import_is_reported_every_time() {
    let fs = Rc::new(base_tree());
    let mut importer = importer(&fs);

    importer
        .import_module("Missing", "", Revision::invalid())
        .unwrap();
    importer
        .import_module("Missing", "", Revision::invalid())
        .unwrap();

    let missing = kinds(&importer)
        .into_iter()
        .filter(|kind| *kind == DiagnosticKind::ModuleNotFound)
        .count();
    assert_eq!(missing, 2);
    assert_eq!(importer.cache_stats().imports, 0);
}

#[test]
fn test_prefix_qualifies_names() {
    let fs = Rc::new(quick_tree());
    let mut importer = importer(&fs);

    let types = importer
        .import_module("Q.Quick", "QQ", Revision::new(2, 1))
        .unwrap();

    assert!(types.get("QQ.Item").is_some());
    assert!(types.get("Item").is_none());
    assert!(types.is_prefix("QQ"));
}

#[test]
fn test_same_name_from_two_modules_is_poisoned() {
    let fs = Rc::new(
        base_tree()
            .with_file("/imports/A/qmldir", "module A\ntypeinfo a.qmltypes\n")
            .with_file(
                "/imports/A/a.qmltypes",
                "[[component]]\nname = \"AWidget\"\nprototype = \"QObject\"\nexports = [\"A/Widget 1.0\"]\n",
            )
            .with_file("/imports/B/qmldir", "module B\ntypeinfo b.qmltypes\n")
            .with_file(
                "/imports/B/b.qmltypes",
                "[[component]]\nname = \"BWidget\"\nprototype = \"QObject\"\nexports = [\"B/Widget 1.0\"]\n",
            )
            .with_file("/imports/C/qmldir", "module C\nimport A 1.0\nimport B 1.0\n"),
    );
    let mut importer = importer(&fs);

    let types = importer.import_module("C", "", Revision::invalid()).unwrap();

    assert_eq!(types.lookup("Widget"), Lookup::Poisoned);
    assert!(types.has_type("Widget"));
    assert!(kinds(&importer).contains(&DiagnosticKind::AmbiguousExport));

    let mut used = UsedTypes::default();
    assert!(importer.find_type("Widget", &types, &mut used).is_none());
    assert!(used.contains("Widget"));
}

#[test]
fn test_list_wrapper_is_created_once() {
    let fs = Rc::new(quick_tree());
    let mut importer = importer(&fs);

    let types = importer
        .import_module_types("Q.Quick", "", Revision::new(2, 1))
        .unwrap();
    let item = types.native.get("QQuickItem").unwrap();
    let array = types.native.get("Array").unwrap();

    let graph = importer.graph();
    let list = graph[item].list_type.expect("list wrapper");
    assert_eq!(graph[list].internal_name, "ListProperty<QQuickItem>");
    assert_eq!(graph[list].semantics, AccessSemantics::Sequence);
    assert_eq!(graph[list].value_type, Some(item));
    assert_eq!(graph[list].extension_type, Some(array));
    assert_eq!(graph.property(item, "children").and_then(|p| p.ty), Some(list));

    let again = resolve::resolve_list(importer.graph_mut(), item, Some(array));
    assert_eq!(again, Some(list));
}

#[test]
fn test_native_types_are_resolved_on_import() {
    let fs = Rc::new(quick_tree());
    let mut importer = importer(&fs);

    let types = importer
        .import_module_types("Q.Quick", "", Revision::new(2, 1))
        .unwrap();
    let item = types.native.get("QQuickItem").unwrap();
    let object = types.native.get("QObject").unwrap();
    let double = types.native.get("double").unwrap();

    let graph = importer.graph();
    assert_eq!(graph[item].base_type, Some(object));
    assert_eq!(graph.property(item, "width").and_then(|p| p.ty), Some(double));
    assert!(graph.is_fully_resolved(item));
    assert!(graph.inherits(item, object));
}

#[test]
fn test_enum_alias_gets_its_own_wrapper() {
    let fs = Rc::new(quick_tree());
    let mut importer = importer(&fs);

    let types = importer
        .import_module_types("Q.Quick", "", Revision::new(2, 1))
        .unwrap();
    let item = types.native.get("QQuickItem").unwrap();
    let int = types.native.get("int").unwrap();

    let graph = importer.graph();
    let enums = &graph[item].enumerations;
    let origin = enums["TransformOrigin"].ty.expect("enum wrapper");
    let alias = enums["Origin"].ty.expect("alias wrapper");

    assert_ne!(origin, alias);
    assert_eq!(graph[origin].internal_name, "QQuickItem::TransformOrigin");
    assert_eq!(graph[alias].internal_name, "QQuickItem::Origin");
    assert_eq!(enums["Origin"].alias.as_deref(), Some("TransformOrigin"));
    assert_eq!(graph[origin].base_type, Some(int));
    assert_eq!(graph[alias].base_type, Some(int));

    let mut used = UsedTypes::default();
    let found = importer.find_type("QQuickItem::Origin", &types.native, &mut used);
    assert_eq!(found.map(|(ty, _)| ty), Some(alias));
}

#[test]
fn test_builtins_module() {
    let fs = Rc::new(base_tree());
    let mut importer = importer(&fs);

    let visible = importer
        .import_module("QML", "", Revision::invalid())
        .unwrap();
    assert!(visible.get("QtObject").is_some());
    assert!(visible.get("int").is_some());

    let native = importer.builtin_internal_names().unwrap();
    assert!(native.get("Array").is_some());
    assert!(native.get("QObject").is_some());
    assert_eq!(importer.global_object().unwrap(), native.get("GlobalObject"));
    assert_eq!(importer.import_builtins().unwrap().get("real"), native.get("double"));
}

#[test]
fn test_missing_builtins_are_fatal() {
    let fs = Rc::new(MemoryFileSystem::new().with_file("/imports/M/qmldir", "module M\n"));
    let mut importer = importer(&fs);

    let err = importer
        .import_module("M", "", Revision::invalid())
        .unwrap_err();
    assert!(matches!(
        err,
        ImportError::MissingBootstrapType { name: "int", .. }
    ));
    let diagnostic = importer
        .diagnostics()
        .iter()
        .find(|d| d.kind == DiagnosticKind::MissingBuiltins)
        .expect("missing builtins diagnostic");
    assert_eq!(diagnostic.severity, Severity::Critical);
}

#[test]
fn test_builtins_fall_back_to_resources() {
    let fs = Rc::new(
        MemoryFileSystem::new()
            .with_file(":/builtins/builtins.qmltypes", BUILTINS)
            .with_file(":/builtins/jsroot.qmltypes", JSROOT),
    );
    let mut importer = importer(&fs);

    let visible = importer.import_builtins().unwrap();
    assert!(visible.get("QtObject").is_some());
    assert!(!kinds(&importer).contains(&DiagnosticKind::MissingBuiltins));
}

#[test]
fn test_system_and_static_modules() {
    let fs = Rc::new(
        base_tree()
            .with_file("/imports/S/qmldir", "module S\nsystem\nstatic\ntypeinfo s.qmltypes\n")
            .with_file(
                "/imports/S/s.qmltypes",
                "[[component]]\nname = \"SCore\"\nexports = [\"S/Core 1.0\"]\n",
            ),
    );
    let mut importer = importer(&fs);

    let types = importer
        .import_module_types("S", "S", Revision::invalid())
        .unwrap();

    assert!(types.is_system);
    assert!(types.visible.get("S.Core").is_some());
    assert!(types.visible.get("S.QtObject").is_some());
    assert_eq!(importer.static_modules(), ["S".to_string()]);
}

#[test]
fn test_dependencies_contribute_native_names_only() {
    let fs = Rc::new(
        quick_tree()
            .with_file("/imports/D/qmldir", "module D\ndepends Q.Quick 2.1\ntypeinfo d.qmltypes\n")
            .with_file(
                "/imports/D/d.qmltypes",
                "[[component]]\nname = \"DPanel\"\nprototype = \"QQuickItem\"\nexports = [\"D/Panel 1.0\"]\n",
            ),
    );
    let mut importer = importer(&fs);

    let types = importer
        .import_module_types("D", "", Revision::invalid())
        .unwrap();
    let panel = types.visible.get("Panel").unwrap();
    let item = types.native.get("QQuickItem").unwrap();

    assert!(types.visible.get("Item").is_none());
    assert_eq!(importer.graph()[panel].base_type, Some(item));
}

#[test]
fn test_deprecated_type_info_dependencies() {
    let fs = Rc::new(
        quick_tree()
            .with_file("/imports/Old/qmldir", "module Old\ntypeinfo old.qmltypes\n")
            .with_file(
                "/imports/Old/old.qmltypes",
                "dependencies = [\"Q.Quick 2.1\"]\n\n[[component]]\nname = \"OldThing\"\nprototype = \"QQuickItem\"\nexports = [\"Old/Thing 1.0\"]\n",
            ),
    );
    let mut importer = importer(&fs);

    let types = importer
        .import_module_types("Old", "", Revision::invalid())
        .unwrap();

    assert!(kinds(&importer).contains(&DiagnosticKind::DeprecatedDependencyFormat));
    assert!(types.native.get("QQuickItem").is_some());
    let thing = types.visible.get("Thing").unwrap();
    assert!(importer.graph()[thing].base_type.is_some());
}

#[test]
fn test_broken_module_reports_and_continues() {
    let fs = Rc::new(quick_tree().with_file(
        "/imports/Broken/qmldir",
        "module Broken\ntypeinfo missing.qmltypes\nGhost 1.0 Ghost.qml\noptional import Q.Quick\nbogus\n",
    ));
    let mut importer = importer(&fs);

    let types = importer
        .import_module("Broken", "", Revision::invalid())
        .unwrap();

    assert!(types.is_empty());
    let found = kinds(&importer);
    assert!(found.contains(&DiagnosticKind::MissingManifestFile));
    assert!(found.contains(&DiagnosticKind::MissingDeclaredComponentFile));
    assert!(found.contains(&DiagnosticKind::OptionalImportUnsupported));
    assert!(found.contains(&DiagnosticKind::ManifestParseFailure));
    assert!(!found.contains(&DiagnosticKind::ModuleNotFound));

    let parse = importer
        .diagnostics()
        .iter()
        .find(|d| d.kind == DiagnosticKind::ManifestParseFailure)
        .unwrap();
    assert!(parse.is_critical());
    assert_eq!(parse.location.as_ref().map(|l| l.line), Some(5));
}

#[test]
fn test_invalid_type_description() {
    let fs = Rc::new(
        base_tree()
            .with_file("/imports/Bad/qmldir", "module Bad\ntypeinfo bad.qmltypes\n")
            .with_file("/imports/Bad/bad.qmltypes", "[[component]\nname = "),
    );
    let mut importer = importer(&fs);

    importer
        .import_module("Bad", "", Revision::invalid())
        .unwrap();

    let diagnostic = importer
        .diagnostics()
        .iter()
        .find(|d| d.kind == DiagnosticKind::ManifestParseFailure)
        .expect("parse failure");
    assert!(diagnostic.is_critical());
}

#[test]
fn test_plugin_without_declared_type_info() {
    let fs = Rc::new(
        base_tree()
            .with_file("/imports/P/qmldir", "module P\nplugin pplugin\n")
            .with_file(
                "/imports/P/plugins.qmltypes",
                "[[component]]\nname = \"PGizmo\"\nexports = [\"P/Gizmo 1.0\"]\n",
            ),
    );
    let mut importer = importer(&fs);

    let types = importer.import_module("P", "", Revision::invalid()).unwrap();

    assert!(types.get("Gizmo").is_some());
    assert!(kinds(&importer).contains(&DiagnosticKind::UndeclaredTypeInfo));
}

#[test]
fn test_import_manifests_registers_modules() {
    let fs = Rc::new(
        base_tree()
            .with_file(
                "/extra/extra.qmltypes",
                "[[component]]\nname = \"ExtraGadget\"\nexports = [\"Extra/Gadget 1.0\"]\n",
            )
            .with_file("/standalone/M/qmldir", "module M\ntypeinfo m.qmltypes\n")
            .with_file(
                "/standalone/M/m.qmltypes",
                "[[component]]\nname = \"MThing\"\nexports = [\"M/Thing 1.0\"]\n",
            ),
    );
    let mut importer = importer(&fs);

    importer.import_manifests(&[
        PathBuf::from("/extra/extra.qmltypes"),
        PathBuf::from("/standalone/M/qmldir"),
    ]);
    assert!(kinds(&importer).contains(&DiagnosticKind::NotADirectoryManifest));

    let extra = importer
        .import_module("Extra", "", Revision::invalid())
        .unwrap();
    assert!(extra.get("Gadget").is_some());

    let versioned = importer
        .import_module("Extra", "", Revision::new(1, 0))
        .unwrap();
    assert_eq!(versioned.get("Gadget"), extra.get("Gadget"));

    let module = importer.import_module("M", "", Revision::invalid()).unwrap();
    assert!(module.get("Thing").is_some());
    assert!(!kinds(&importer).contains(&DiagnosticKind::ModuleNotFound));
}

#[test]
fn test_changing_import_paths_invalidates_lookups() {
    let fs = Rc::new(
        base_tree()
            .with_file("/late/Late/qmldir", "module Late\ntypeinfo late.qmltypes\n")
            .with_file(
                "/late/Late/late.qmltypes",
                "[[component]]\nname = \"LateType\"\nexports = [\"Late/Type 1.0\"]\n",
            ),
    );
    let mut importer = importer(&fs);

    let before = importer
        .import_module("Late", "", Revision::invalid())
        .unwrap();
    assert!(before.is_empty());

    importer.set_import_paths(vec![PathBuf::from("/imports"), PathBuf::from("/late")]);
    importer.take_diagnostics();

    let after = importer
        .import_module("Late", "", Revision::invalid())
        .unwrap();
    assert!(after.get("Type").is_some());
    assert!(importer.diagnostics().is_empty());
}

#[test]
fn test_clear_caches_rereads_manifests() {
    let fs = Rc::new(quick_tree());
    let mut importer = importer(&fs);

    importer
        .import_module("Q.Quick", "", Revision::new(2, 1))
        .unwrap();
    importer.clear_caches();
    assert_eq!(importer.cache_stats().manifests, 0);

    importer
        .import_module("Q.Quick", "", Revision::new(2, 1))
        .unwrap();
    assert_eq!(fs.read_count("/imports/Q/Quick/qmldir"), 2);
}

#[test]
fn test_directory_import_takes_uppercase_components() {
    let fs = Rc::new(
        base_tree()
            .with_file("/app/Bar.qml", "base QtObject\n")
            .with_file("/app/lowercase.qml", "base QtObject\n")
            .with_file("/app/notes.txt", ""),
    );
    let mut importer = importer(&fs);

    let types = importer
        .import_directory(PathBuf::from("/app").as_path(), "")
        .unwrap();

    assert_eq!(types.names(), vec!["Bar"]);
    let bar = types.get("Bar").unwrap();
    assert!(importer.graph().is_unloaded(bar));
    assert_eq!(importer.import_file(PathBuf::from("/app/Bar.qml").as_path()), bar);
    assert_eq!(fs.read_count("/app/Bar.qml"), 0);
}
