//! Lazily populated descriptors
//!
//! Component files listed in module manifests are not parsed when the
//! manifest is read. They get a placeholder descriptor that carries just
//! enough to be named, and the full contents are filled in the first time
//! somebody dereferences the placeholder.

use std::path::PathBuf;

use crate::descriptor::{ScopeKind, TypeDescriptor, TypeId};
use crate::graph::TypeGraph;

/// Where a deferred descriptor is loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredSource {
    /// Component file
    pub file_path: PathBuf,
    /// Identity name, derived from the file name
    pub internal_name: String,
    /// Module that listed the file
    pub module_name: String,
    /// Whether the module manifest marked the file as a singleton
    pub is_singleton: bool,
}

impl DeferredSource {
    /// Describe a component file; the internal name is the file's base name
    pub fn new(file_path: impl Into<PathBuf>, module_name: impl Into<String>) -> Self {
        let file_path = file_path.into();
        let internal_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.split('.').next().unwrap_or(name).to_string())
            .unwrap_or_default();
        Self {
            file_path,
            internal_name,
            module_name: module_name.into(),
            is_singleton: false,
        }
    }
}

/// Load state of a deferred descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Not populated yet
    Unloaded(DeferredSource),
    /// Being populated; re-entrant loads are no-ops
    Loading,
    /// Populated
    Loaded,
}

impl TypeGraph {
    /// Create a placeholder for a component file
    pub fn add_deferred(&mut self, source: DeferredSource) -> TypeId {
        let mut desc = TypeDescriptor::new(ScopeKind::Object);
        desc.internal_name = source.internal_name.clone();
        desc.module_name = source.module_name.clone();
        desc.file_path = Some(source.file_path.clone());
        desc.is_composite = true;
        desc.deferred = Some(Deferred::Unloaded(source));
        self.add(desc)
    }

    /// Whether `id` is a placeholder that has not been populated yet
    pub fn is_unloaded(&self, id: TypeId) -> bool {
        self[id].is_unloaded()
    }

    /// Record the singleton marker from a module manifest.
    ///
    /// Placeholders remember the marker until they are loaded; populated
    /// descriptors take it directly.
    pub fn mark_singleton(&mut self, id: TypeId, singleton: bool) {
        let desc = &mut self[id];
        match &mut desc.deferred {
            Some(Deferred::Unloaded(source)) => source.is_singleton = singleton,
            _ => desc.is_singleton = singleton,
        }
    }

    /// Move a placeholder into the loading state.
    ///
    /// Returns the load source, or `None` when the descriptor is not an
    /// unloaded placeholder (already loaded, currently loading, or native).
    pub fn begin_load(&mut self, id: TypeId) -> Option<DeferredSource> {
        let desc = &mut self[id];
        match desc.deferred.take() {
            Some(Deferred::Unloaded(source)) => {
                desc.deferred = Some(Deferred::Loading);
                log::debug!("loading component {}", source.file_path.display());
                Some(source)
            }
            other => {
                desc.deferred = other;
                None
            }
        }
    }

    /// Finish a load started with [`begin_load`](Self::begin_load).
    ///
    /// Identity fields are reset from the source regardless of what the
    /// populating step wrote.
    pub fn finish_load(&mut self, id: TypeId, source: &DeferredSource) {
        let desc = &mut self[id];
        desc.internal_name = source.internal_name.clone();
        desc.module_name = source.module_name.clone();
        desc.file_path = Some(source.file_path.clone());
        desc.is_composite = true;
        desc.deferred = Some(Deferred::Loaded);
    }

    /// Populate a placeholder with `populate`, at most once.
    ///
    /// Returns `None` when there was nothing to load.
    pub fn load_with<F, E>(&mut self, id: TypeId, populate: F) -> Option<Result<(), E>>
    where
        F: FnOnce(&mut TypeGraph, TypeId, &DeferredSource) -> Result<(), E>,
    {
        let source = self.begin_load(id)?;
        let outcome = populate(self, id, &source);
        self.finish_load(id, &source);
        Some(outcome)
    }
}
