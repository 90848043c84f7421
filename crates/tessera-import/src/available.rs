//! Result of importing one module

use tessera_types::NamespaceTable;

/// Native and visible names produced by an import
#[derive(Debug, Clone)]
pub struct AvailableTypes {
    /// Implementation names
    pub native: NamespaceTable,
    /// Names usable in documents
    pub visible: NamespaceTable,
    /// Statically linked modules encountered on the way
    pub static_modules: Vec<String>,
    /// Whether a system module contributed to this import
    pub is_system: bool,
}

impl Default for AvailableTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailableTypes {
    /// Empty tables
    pub fn new() -> Self {
        Self {
            native: NamespaceTable::native(),
            visible: NamespaceTable::visible(),
            static_modules: Vec::new(),
            is_system: false,
        }
    }

    /// Start from a set of native names, typically the builtins
    pub fn with_native(native: NamespaceTable) -> Self {
        let mut visible = NamespaceTable::visible();
        visible.set_array_type(native.array_type());
        Self {
            native,
            visible,
            static_modules: Vec::new(),
            is_system: false,
        }
    }

    /// Record a statically linked module once
    pub fn add_static_module(&mut self, module: &str) {
        if !self.static_modules.iter().any(|known| known == module) {
            self.static_modules.push(module.to_string());
        }
    }

    /// Merge another import into this one.
    ///
    /// Native names are always taken over, visible names only when
    /// `with_visible` is set. Returns the visible names that became
    /// ambiguous.
    pub fn merge(&mut self, other: &AvailableTypes, with_visible: bool) -> Vec<String> {
        if let Err(err) = self.native.merge(&other.native) {
            log::error!("{}", err);
        }

        let mut poisoned = Vec::new();
        if with_visible {
            match self.visible.merge(&other.visible) {
                Ok(names) => poisoned = names,
                Err(err) => log::error!("{}", err),
            }
        }

        for module in &other.static_modules {
            self.add_static_module(module);
        }
        self.is_system |= other.is_system;
        poisoned
    }
}
