//! Directory manifest (`qmldir`) parsing
//!
//! A directory manifest lists the component files, scripts, type
//! descriptions and imports of one module directory. The format is line
//! based; each line is a directive followed by whitespace separated
//! arguments:
//!
//! ```text
//! module Q.Controls
//! typeinfo controls.qmltypes
//! import Q.Core auto
//! depends Q.Base 2.0
//! singleton Theme 1.0 Theme.qml
//! Button 1.0 Button.qml
//! internal ButtonBackground impl/ButtonBackground.qml
//! Utils 1.0 utils.js
//! ```
//!
//! Malformed lines are collected as [`ManifestError`]s instead of aborting
//! the parse, so one bad line never hides the rest of the module.

use tessera_types::Revision;
use thiserror::Error;

/// A malformed manifest line
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ManifestError {
    /// 1-based line number
    pub line: usize,
    /// What is wrong with the line
    pub message: String,
}

/// A component file entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEntry {
    /// Exported type name
    pub type_name: String,
    /// File relative to the manifest's directory
    pub file_name: String,
    /// Version the name is exported at
    pub version: Revision,
    /// Declared with `singleton`
    pub singleton: bool,
    /// Declared with `internal`; such entries are not exported
    pub internal: bool,
}

/// A script file entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    /// Qualifier the script is exported under
    pub name: String,
    /// File relative to the manifest's directory
    pub file_name: String,
    /// Version the name is exported at
    pub version: Revision,
}

/// An `import` or `depends` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleImport {
    /// Dotted module name
    pub module: String,
    /// Requested version
    pub version: Revision,
    /// Version is `auto`: inherit the version the importing module was requested at
    pub auto_version: bool,
    /// Declared with `optional import`
    pub optional: bool,
    /// Declared with `default import`
    pub default: bool,
}

impl ModuleImport {
    /// Create a plain import
    pub fn new(module: impl Into<String>, version: Revision) -> Self {
        Self {
            module: module.into(),
            version,
            auto_version: false,
            optional: false,
            default: false,
        }
    }

    /// Parse `Module`, `Module 2.0` or `Module auto`
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let module = parts.next()?;
        let import = match parts.next() {
            None => Self::new(module, Revision::invalid()),
            Some("auto") => Self {
                auto_version: true,
                ..Self::new(module, Revision::invalid())
            },
            Some(version) => Self::new(module, Revision::parse(version).ok()?),
        };
        match parts.next() {
            Some(_) => None,
            None => Some(import),
        }
    }
}

/// A native plugin entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEntry {
    /// Plugin library name
    pub name: String,
    /// Directory the plugin lives in
    pub path: Option<String>,
    /// Declared with `optional plugin`
    pub optional: bool,
}

/// Parsed contents of a directory manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryManifest {
    /// Module name from the `module` directive
    pub module: String,
    /// Component files in declaration order
    pub components: Vec<ComponentEntry>,
    /// Script files in declaration order
    pub scripts: Vec<ScriptEntry>,
    /// `import` directives
    pub imports: Vec<ModuleImport>,
    /// `depends` directives
    pub dependencies: Vec<ModuleImport>,
    /// `typeinfo` files
    pub type_infos: Vec<String>,
    /// Native plugins
    pub plugins: Vec<PluginEntry>,
    /// Preferred location of the module's files
    pub preferred_path: Option<String>,
    /// Plugin class name
    pub class_name: Option<String>,
    /// The module is statically linked
    pub is_static: bool,
    /// The module re-exposes the builtins
    pub is_system: bool,
    /// The module supports design tools
    pub designer_supported: bool,
    /// Problems found while parsing
    pub errors: Vec<ManifestError>,
}

const SCRIPT_EXTENSIONS: [&str; 2] = [".js", ".mjs"];

impl DirectoryManifest {
    /// Parse manifest text, collecting malformed lines in `errors`
    pub fn parse(source: &str) -> Self {
        let mut manifest = Self::default();
        for (index, line) in source.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            if let Err(message) = manifest.parse_directive(&parts) {
                manifest.errors.push(ManifestError {
                    line: line_number,
                    message,
                });
            }
        }
        manifest
    }

    fn parse_directive(&mut self, parts: &[&str]) -> Result<(), String> {
        match parts {
            ["module", name] => {
                if !self.module.is_empty() {
                    return Err(format!("only one module directive allowed, found {}", name));
                }
                self.module = name.to_string();
            }
            ["typeinfo", file] => self.type_infos.push(file.to_string()),
            ["import", rest @ ..] => {
                let import = parse_import(rest)?;
                self.imports.push(import);
            }
            ["optional", "import", rest @ ..] => {
                let import = parse_import(rest)?;
                self.imports.push(ModuleImport {
                    optional: true,
                    ..import
                });
            }
            ["default", "import", rest @ ..] => {
                let import = parse_import(rest)?;
                self.imports.push(ModuleImport {
                    default: true,
                    ..import
                });
            }
            ["depends", rest @ ..] => {
                let import = parse_import(rest)?;
                self.dependencies.push(import);
            }
            ["plugin", name] => self.plugins.push(plugin(name, None, false)),
            ["plugin", name, path] => self.plugins.push(plugin(name, Some(path), false)),
            ["optional", "plugin", name] => self.plugins.push(plugin(name, None, true)),
            ["optional", "plugin", name, path] => {
                self.plugins.push(plugin(name, Some(path), true))
            }
            ["classname", name] => self.class_name = Some(name.to_string()),
            ["prefer", path] => self.preferred_path = Some(path.to_string()),
            ["static"] => self.is_static = true,
            ["system"] => self.is_system = true,
            ["designersupported"] => self.designer_supported = true,
            ["singleton", name, version, file] => {
                self.components.push(ComponentEntry {
                    type_name: name.to_string(),
                    file_name: file.to_string(),
                    version: parse_version(version)?,
                    singleton: true,
                    internal: false,
                });
            }
            ["internal", name, file] => {
                self.components.push(ComponentEntry {
                    type_name: name.to_string(),
                    file_name: file.to_string(),
                    version: Revision::invalid(),
                    singleton: false,
                    internal: true,
                });
            }
            [name, version, file] if starts_uppercase(name) || is_script(file) => {
                let version = parse_version(version)?;
                if is_script(file) {
                    self.scripts.push(ScriptEntry {
                        name: name.to_string(),
                        file_name: file.to_string(),
                        version,
                    });
                } else {
                    self.components.push(ComponentEntry {
                        type_name: name.to_string(),
                        file_name: file.to_string(),
                        version,
                        singleton: false,
                        internal: false,
                    });
                }
            }
            [directive, ..] => {
                return Err(format!(
                    "unexpected directive '{}' with {} argument(s)",
                    directive,
                    parts.len() - 1
                ));
            }
            [] => {}
        }
        Ok(())
    }
}

fn parse_import(rest: &[&str]) -> Result<ModuleImport, String> {
    if rest.is_empty() || rest.len() > 2 {
        return Err("import expects a module name and an optional version".to_string());
    }
    ModuleImport::parse(&rest.join(" "))
        .ok_or_else(|| format!("invalid import '{}'", rest.join(" ")))
}

fn parse_version(text: &str) -> Result<Revision, String> {
    Revision::parse(text).map_err(|err| err.to_string())
}

fn plugin(name: &str, path: Option<&&str>, optional: bool) -> PluginEntry {
    PluginEntry {
        name: name.to_string(),
        path: path.map(|path| path.to_string()),
        optional,
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn is_script(file: &str) -> bool {
    SCRIPT_EXTENSIONS.iter().any(|ext| file.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROLS: &str = "\
# Controls module
module Q.Controls
typeinfo controls.qmltypes
import Q.Core auto
optional import Q.Extras 1.2
default import Q.Styles
depends Q.Base 2.0
plugin qcontrolsplugin
optional plugin qcontrolsextras ../lib
classname QControlsPlugin
static
system
designersupported
singleton Theme 1.0 Theme.qml
Button 1.0 Button.qml
Button 1.1 Button11.qml
internal ButtonBackground impl/ButtonBackground.qml
Utils 1.0 utils.js
";

    #[test]
    fn test_parse_full_manifest() {
        let manifest = DirectoryManifest::parse(CONTROLS);
        assert!(manifest.errors.is_empty(), "{:?}", manifest.errors);
        assert_eq!(manifest.module, "Q.Controls");
        assert_eq!(manifest.type_infos, vec!["controls.qmltypes"]);
        assert!(manifest.is_static && manifest.is_system && manifest.designer_supported);
        assert_eq!(manifest.class_name.as_deref(), Some("QControlsPlugin"));

        assert_eq!(manifest.imports.len(), 3);
        assert!(manifest.imports[0].auto_version);
        assert!(manifest.imports[1].optional);
        assert_eq!(manifest.imports[1].version, Revision::new(1, 2));
        assert!(manifest.imports[2].default);
        assert_eq!(
            manifest.dependencies,
            vec![ModuleImport::new("Q.Base", Revision::new(2, 0))]
        );

        assert_eq!(manifest.plugins.len(), 2);
        assert!(manifest.plugins[1].optional);
        assert_eq!(manifest.plugins[1].path.as_deref(), Some("../lib"));

        assert_eq!(manifest.components.len(), 4);
        assert!(manifest.components[0].singleton);
        assert_eq!(manifest.components[2].version, Revision::new(1, 1));
        assert!(manifest.components[3].internal);

        assert_eq!(manifest.scripts.len(), 1);
        assert_eq!(manifest.scripts[0].name, "Utils");
        assert_eq!(manifest.scripts[0].file_name, "utils.js");
    }

    #[test]
    fn test_malformed_lines_are_reported() {
        let manifest = DirectoryManifest::parse("module A\nButton one.x Button.qml\nfrobnicate\nimport\n");
        assert_eq!(manifest.module, "A");
        let lines: Vec<usize> = manifest.errors.iter().map(|err| err.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(manifest.errors[1].to_string().starts_with("line 3:"));
    }

    #[test]
    fn test_second_module_directive_is_an_error() {
        let manifest = DirectoryManifest::parse("module A\nmodule B\n");
        assert_eq!(manifest.module, "A");
        assert_eq!(manifest.errors.len(), 1);
    }

    #[test]
    fn test_parse_import_forms() {
        assert_eq!(
            ModuleImport::parse("Q.Core"),
            Some(ModuleImport::new("Q.Core", Revision::invalid()))
        );
        assert!(ModuleImport::parse("Q.Core auto").unwrap().auto_version);
        assert_eq!(
            ModuleImport::parse("Q.Core 6").unwrap().version,
            Revision::major_only(6)
        );
        assert_eq!(ModuleImport::parse(""), None);
        assert_eq!(ModuleImport::parse("Q.Core 1.0 extra"), None);
    }
}
