//! Import caches
//!
//! Three tiers, from coarse to fine:
//! - resolved imports by [`ImportKey`];
//! - parsed module manifests by manifest path, plus which manifest serves
//!   a `(module, version)` request;
//! - deferred descriptors by component file path.
//!
//! Changing the import paths invalidates the first tier and the
//! `(module, version)` index, but parsed manifests and component
//! descriptors stay valid.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tessera_types::{ImportKey, Revision, TypeId};

use crate::available::AvailableTypes;
use crate::manifest::ModuleManifest;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Resolved imports
    pub imports: usize,
    /// Import lookups served from cache
    pub import_hits: usize,
    /// Import lookups that had to resolve
    pub import_misses: usize,
    /// Parsed manifests
    pub manifests: usize,
    /// Manifest lookups served from cache
    pub manifest_hits: usize,
    /// Component file descriptors
    pub files: usize,
}

impl CacheStats {
    /// Fraction of import lookups served from cache
    pub fn hit_ratio(&self) -> f64 {
        let total = self.import_hits + self.import_misses;
        if total == 0 {
            0.0
        } else {
            self.import_hits as f64 / total as f64
        }
    }
}

/// All caches of one importer
#[derive(Debug, Default)]
pub struct ImportCache {
    imports: FxHashMap<ImportKey, AvailableTypes>,
    manifests: FxHashMap<PathBuf, Rc<ModuleManifest>>,
    seen_imports: FxHashMap<(String, Revision), Option<PathBuf>>,
    files: FxHashMap<PathBuf, TypeId>,
    import_hits: usize,
    import_misses: usize,
    manifest_hits: usize,
}

impl ImportCache {
    /// Create empty caches
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved import for `key`
    pub fn import(&mut self, key: &ImportKey) -> Option<&AvailableTypes> {
        if self.imports.contains_key(key) {
            self.import_hits += 1;
            log::debug!("import cache hit for {}", key.module);
            self.imports.get(key)
        } else {
            self.import_misses += 1;
            None
        }
    }

    /// Store a resolved import
    pub fn insert_import(&mut self, key: ImportKey, types: AvailableTypes) {
        self.imports.insert(key, types);
    }

    /// Forget a resolved import
    pub fn remove_import(&mut self, key: &ImportKey) {
        self.imports.remove(key);
    }

    /// Parsed manifest stored under `path`
    pub fn manifest(&mut self, path: &Path) -> Option<Rc<ModuleManifest>> {
        let manifest = self.manifests.get(path).cloned();
        if manifest.is_some() {
            self.manifest_hits += 1;
        }
        manifest
    }

    /// Store a parsed manifest
    pub fn insert_manifest(&mut self, path: PathBuf, manifest: Rc<ModuleManifest>) {
        self.manifests.insert(path, manifest);
    }

    /// Outcome of an earlier search for `(module, version)`.
    ///
    /// `Some(None)` means the module was searched for and not found.
    pub fn seen_import(&self, module: &str, version: Revision) -> Option<Option<PathBuf>> {
        self.seen_imports
            .get(&(module.to_string(), version))
            .cloned()
    }

    /// Record the outcome of a search for `(module, version)`
    pub fn record_seen(&mut self, module: &str, version: Revision, manifest: Option<PathBuf>) {
        self.seen_imports
            .insert((module.to_string(), version), manifest);
    }

    /// Deferred descriptor for a component file
    pub fn file(&self, path: &Path) -> Option<TypeId> {
        self.files.get(path).copied()
    }

    /// Store a deferred descriptor for a component file
    pub fn insert_file(&mut self, path: PathBuf, ty: TypeId) {
        self.files.insert(path, ty);
    }

    /// Drop everything that depends on the import paths
    pub fn invalidate_module_lookups(&mut self) {
        self.imports.clear();
        self.seen_imports.clear();
    }

    /// Drop every cached entry
    pub fn clear(&mut self) {
        self.invalidate_module_lookups();
        self.manifests.clear();
        self.files.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            imports: self.imports.len(),
            import_hits: self.import_hits,
            import_misses: self.import_misses,
            manifests: self.manifests.len(),
            manifest_hits: self.manifest_hits,
            files: self.files.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(module: &str) -> ImportKey {
        ImportKey::new("", module, Revision::invalid(), false, false)
    }

    #[test]
    fn test_import_hits_and_misses() {
        let mut cache = ImportCache::new();
        assert!(cache.import(&key("Q.Controls")).is_none());
        cache.insert_import(key("Q.Controls"), AvailableTypes::new());
        assert!(cache.import(&key("Q/Controls")).is_some());

        let stats = cache.stats();
        assert_eq!(stats.imports, 1);
        assert_eq!(stats.import_hits, 1);
        assert_eq!(stats.import_misses, 1);
        assert_eq!(stats.hit_ratio(), 0.5);
    }

    #[test]
    fn test_invalidation_keeps_manifests() {
        let mut cache = ImportCache::new();
        let path = PathBuf::from("/imports/Q/qmldir");
        cache.insert_import(key("Q"), AvailableTypes::new());
        cache.insert_manifest(path.clone(), Rc::new(ModuleManifest::new("Q")));
        cache.record_seen("Q", Revision::invalid(), Some(path.clone()));
        cache.record_seen("R", Revision::invalid(), None);

        assert_eq!(cache.seen_import("R", Revision::invalid()), Some(None));
        assert_eq!(cache.seen_import("S", Revision::invalid()), None);

        cache.invalidate_module_lookups();
        assert_eq!(cache.seen_import("Q", Revision::invalid()), None);
        assert!(cache.manifest(&path).is_some());
        assert_eq!(cache.stats().imports, 0);

        cache.clear();
        assert!(cache.manifest(&path).is_none());
    }
}
