//! Module manifests
//!
//! A [`ModuleManifest`] is everything a module contributes before its names
//! are merged into a namespace: the descriptors it exports, its scripts and
//! the modules it pulls in.

use rustc_hash::FxHashMap;
use tessera_types::{Export, TypeId};

use crate::qmldir::ModuleImport;

/// A descriptor together with the names it is exported under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedType {
    /// Exported descriptor
    pub ty: TypeId,
    /// Public names, possibly none
    pub exports: Vec<Export>,
}

impl ExportedType {
    /// A descriptor without exports yet
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            exports: Vec::new(),
        }
    }
}

/// Keyed, insertion-ordered list of exported descriptors
#[derive(Debug, Clone, Default)]
struct ExportList {
    entries: Vec<ExportedType>,
    index: FxHashMap<String, usize>,
}

impl ExportList {
    fn insert(&mut self, key: String, exported: ExportedType) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot] = exported,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(exported);
            }
        }
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut ExportedType> {
        let slot = *self.index.get(key)?;
        self.entries.get_mut(slot)
    }

    fn get(&self, key: &str) -> Option<&ExportedType> {
        self.index.get(key).and_then(|&slot| self.entries.get(slot))
    }
}

/// Raw contents of one module
#[derive(Debug, Clone, Default)]
pub struct ModuleManifest {
    /// Module name
    pub module_name: String,
    /// `import` directives
    pub imports: Vec<ModuleImport>,
    /// `depends` directives and type-description dependencies
    pub dependencies: Vec<ModuleImport>,
    /// The module is statically linked
    pub is_static: bool,
    /// The module re-exposes the builtins
    pub is_system: bool,
    objects: ExportList,
    scripts: ExportList,
}

impl ModuleManifest {
    /// Create an empty manifest
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            ..Default::default()
        }
    }

    /// Exported descriptors in manifest order
    pub fn objects(&self) -> &[ExportedType] {
        &self.objects.entries
    }

    /// Exported scripts in manifest order
    pub fn scripts(&self) -> &[ExportedType] {
        &self.scripts.entries
    }

    /// Add a descriptor under `key`, replacing an earlier one with the same key
    pub fn insert_object(&mut self, key: impl Into<String>, exported: ExportedType) {
        self.objects.insert(key.into(), exported);
    }

    /// Descriptor registered under `key`
    pub fn object(&self, key: &str) -> Option<&ExportedType> {
        self.objects.get(key)
    }

    /// Mutable descriptor registered under `key`
    pub fn object_mut(&mut self, key: &str) -> Option<&mut ExportedType> {
        self.objects.get_mut(key)
    }

    /// Add a script under `key`, replacing an earlier one with the same key
    pub fn insert_script(&mut self, key: impl Into<String>, exported: ExportedType) {
        self.scripts.insert(key.into(), exported);
    }

    /// Mutable script registered under `key`
    pub fn script_mut(&mut self, key: &str) -> Option<&mut ExportedType> {
        self.scripts.get_mut(key)
    }

    /// All exports of objects and scripts
    pub fn exports(&self) -> impl Iterator<Item = &Export> {
        self.objects
            .entries
            .iter()
            .chain(&self.scripts.entries)
            .flat_map(|exported| &exported.exports)
    }

    /// Whether an import requesting `major` can see anything of this module.
    ///
    /// Modules without versioned exports serve every major version.
    pub fn serves_major(&self, major: u16) -> bool {
        let mut versioned = self.exports().filter_map(|export| export.version.major()).peekable();
        if versioned.peek().is_none() {
            return true;
        }
        versioned.any(|declared| declared == major)
    }
}
