//! The importer
//!
//! [`Importer`] turns import requests into namespace tables. It owns the
//! type graph every descriptor lives in, the caches, and the diagnostics
//! collected along the way.
//!
//! Importing a module works in three steps:
//! 1. find the module's directory manifest on the import paths (or reuse a
//!    cached one),
//! 2. import the modules it depends on into a fresh [`AvailableTypes`],
//! 3. merge the module's own exports on top and resolve the newly merged
//!    native descriptors.
//!
//! The result is cached per [`ImportKey`]. A placeholder entry is cached
//! before step 2 so that import cycles terminate.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::FxHashSet;
use tessera_types::resolve::{self, UsedTypes};
use tessera_types::{
    prefixed_name, Context, DeferredSource, Export, ImportKey, NamespaceTable, Offer, Revision,
    TypeDescriptor, TypeGraph, TypeId, ANONYMOUS_PREFIX,
};

use crate::available::AvailableTypes;
use crate::cache::{CacheStats, ImportCache};
use crate::config::ImporterConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity, SourceLocation};
use crate::error::ImportError;
use crate::front_end::{ComponentFrontEnd, NullFrontEnd};
use crate::fs::{FileSystem, RealFileSystem};
use crate::manifest::{ExportedType, ModuleManifest};
use crate::paths::candidate_directories;
use crate::qmldir::{DirectoryManifest, ModuleImport};
use crate::typeinfo::read_type_info;

/// Module name under which the builtins are known
pub const BUILTIN_MODULE: &str = "QML";

const QMLDIR: &str = "qmldir";
const PLUGIN_TYPE_INFO: &str = "plugins.qmltypes";
const FAKE_QMLDIR_SUFFIX: &str = "_FAKE_QMLDIR";
const BOOTSTRAP_TYPES: [&str; 2] = ["int", "Array"];
const GLOBAL_OBJECT: &str = "GlobalObject";

/// Resolves imports into namespace tables
pub struct Importer {
    config: ImporterConfig,
    fs: Rc<dyn FileSystem>,
    front_end: Rc<dyn ComponentFrontEnd>,
    graph: TypeGraph,
    /// Outcome of the one bootstrap attempt; a failure is kept and replayed
    builtins: Option<Result<AvailableTypes, ImportError>>,
    bootstrapping: bool,
    cache: ImportCache,
    diagnostics: Vec<Diagnostic>,
    static_modules: Vec<String>,
}

impl Importer {
    /// Create an importer reading from the real file system
    pub fn new(config: ImporterConfig) -> Self {
        let fs: Rc<dyn FileSystem> = match &config.resource_root {
            Some(root) => Rc::new(RealFileSystem::with_resource_root(root)),
            None => Rc::new(RealFileSystem::new()),
        };
        Self {
            config,
            fs,
            front_end: Rc::new(NullFrontEnd),
            graph: TypeGraph::new(),
            builtins: None,
            bootstrapping: false,
            cache: ImportCache::new(),
            diagnostics: Vec::new(),
            static_modules: Vec::new(),
        }
    }

    /// Read files through `fs` instead
    pub fn with_file_system(mut self, fs: Rc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Populate component files with `front_end`
    pub fn with_front_end(mut self, front_end: Rc<dyn ComponentFrontEnd>) -> Self {
        self.front_end = front_end;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    /// File system used for all reads
    pub fn file_system(&self) -> Rc<dyn FileSystem> {
        Rc::clone(&self.fs)
    }

    /// The type graph
    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// The type graph, mutably
    pub fn graph_mut(&mut self) -> &mut TypeGraph {
        &mut self.graph
    }

    /// Diagnostics collected so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Remove and return the collected diagnostics
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Statically linked modules seen by [`import_module`](Self::import_module)
    pub fn static_modules(&self) -> &[String] {
        &self.static_modules
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop all cached imports, manifests and component descriptors.
    ///
    /// Descriptors already handed out stay valid.
    pub fn clear_caches(&mut self) {
        self.cache.clear();
    }

    /// Directories searched for modules
    pub fn import_paths(&self) -> &[PathBuf] {
        &self.config.import_paths
    }

    /// Replace the import paths.
    ///
    /// Resolved imports are forgotten; parsed manifests and component
    /// descriptors are kept.
    pub fn set_import_paths(&mut self, paths: Vec<PathBuf>) {
        self.config.import_paths = paths;
        self.cache.invalidate_module_lookups();
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        log::debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    // ----- builtins -----

    /// Visible names of the builtins
    pub fn import_builtins(&mut self) -> Result<NamespaceTable, ImportError> {
        Ok(self.builtins()?.visible.clone())
    }

    /// Native names of the builtins
    pub fn builtin_internal_names(&mut self) -> Result<NamespaceTable, ImportError> {
        Ok(self.builtins()?.native.clone())
    }

    /// The global object type of the builtins, if they define one
    pub fn global_object(&mut self) -> Result<Option<TypeId>, ImportError> {
        Ok(self.builtins()?.native.get(GLOBAL_OBJECT))
    }

    fn builtins(&mut self) -> Result<&AvailableTypes, ImportError> {
        if self.bootstrapping {
            return Err(ImportError::BuiltinsLoading);
        }
        if self.builtins.is_none() {
            let outcome = self.bootstrap_builtins();
            self.builtins = Some(outcome);
        }
        match &self.builtins {
            Some(Ok(builtins)) => Ok(builtins),
            Some(Err(err)) => Err(err.clone()),
            None => Err(ImportError::BuiltinsLoading),
        }
    }

    /// The builtins, if bootstrap has finished successfully
    fn loaded_builtins(&self) -> Option<&AvailableTypes> {
        self.builtins.as_ref().and_then(|outcome| outcome.as_ref().ok())
    }

    /// Native builtin names, empty while the builtins are being loaded
    fn builtin_native(&self) -> NamespaceTable {
        match self.loaded_builtins() {
            Some(builtins) => builtins.native.clone(),
            None => NamespaceTable::native(),
        }
    }

    fn bootstrap_builtins(&mut self) -> Result<AvailableTypes, ImportError> {
        self.bootstrapping = true;
        let result = self.load_builtins();
        self.bootstrapping = false;
        result
    }

    fn load_builtins(&mut self) -> Result<AvailableTypes, ImportError> {
        let mut manifest = ModuleManifest::new(BUILTIN_MODULE);
        let mut remaining = self.config.builtin_files.clone();
        let mut searched = self.config.import_paths.clone();

        for directory in self.config.import_paths.clone() {
            if remaining.is_empty() {
                break;
            }
            self.scan_builtins(&directory, &mut remaining, &mut manifest);
        }

        if !remaining.is_empty() {
            let resource_dir = self.config.builtin_resource_dir.clone();
            log::warn!(
                "builtins {} not found on import paths, falling back to {}",
                remaining.join(", "),
                resource_dir.display()
            );
            self.scan_builtins(&resource_dir, &mut remaining, &mut manifest);
            searched.push(resource_dir);
        }

        if !remaining.is_empty() {
            self.report(Diagnostic::new(
                DiagnosticKind::MissingBuiltins,
                format!(
                    "Failed to find the following builtins: {}. Import paths used: {}",
                    remaining.join(", "),
                    searched
                        .iter()
                        .map(|path| path.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
        }

        let key = ImportKey::new("", BUILTIN_MODULE, Revision::invalid(), false, true);
        let mut types = AvailableTypes::new();
        self.import_dependencies(&manifest, &mut types, "", Revision::invalid(), true);
        self.process_import(&key, &manifest, &mut types);

        for name in BOOTSTRAP_TYPES {
            if types.native.get(name).is_none() {
                return Err(ImportError::MissingBootstrapType { name, searched });
            }
        }

        let array = types.native.get("Array");
        types.native.set_array_type(array);
        types.visible.set_array_type(array);
        log::debug!("loaded {} builtin types", types.native.len());
        Ok(types)
    }

    fn scan_builtins(
        &mut self,
        directory: &Path,
        remaining: &mut Vec<String>,
        manifest: &mut ModuleManifest,
    ) {
        let Ok(entries) = self.fs.list_dir(directory) else {
            return;
        };
        for entry in entries {
            if remaining.is_empty() {
                return;
            }
            if self.fs.is_dir(&entry) {
                self.scan_builtins(&entry, remaining, manifest);
                continue;
            }
            let Some(name) = entry.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if let Some(position) = remaining.iter().position(|file| file == name) {
                remaining.remove(position);
                self.load_type_info(&entry, manifest);
            }
        }
    }

    /// Re-expose every builtin visible name under `prefix`
    fn expose_builtins(&self, types: &mut AvailableTypes, prefix: &str) {
        let Some(builtins) = self.loaded_builtins() else {
            return;
        };
        for (name, entry) in builtins.visible.iter() {
            if let Some(ty) = entry.ty {
                types
                    .visible
                    .set(prefixed_name(prefix, name), ty, entry.revision);
            }
        }
        if !prefix.is_empty() {
            types.visible.add_prefix(prefix);
        }
    }

    // ----- public import entry points -----

    /// Import a module and return its visible names.
    ///
    /// A module that cannot be found yields an empty table and a
    /// `ModuleNotFound` diagnostic.
    pub fn import_module(
        &mut self,
        module: &str,
        prefix: &str,
        version: Revision,
    ) -> Result<NamespaceTable, ImportError> {
        Ok(self.import_module_types(module, prefix, version)?.visible)
    }

    /// Import a module and return both its native and visible names
    pub fn import_module_types(
        &mut self,
        module: &str,
        prefix: &str,
        version: Revision,
    ) -> Result<AvailableTypes, ImportError> {
        let mut result = AvailableTypes::with_native(self.builtins()?.native.clone());
        if !self.import_helper(module, &mut result, prefix, version, false, false) {
            self.report(Diagnostic::new(
                DiagnosticKind::ModuleNotFound,
                format!(
                    "Failed to import {}. Are your import paths set up properly?",
                    module
                ),
            ));
        }
        for module in &result.static_modules {
            if !self.static_modules.contains(module) {
                self.static_modules.push(module.clone());
            }
        }
        Ok(result)
    }

    /// Deferred descriptor for a single component file
    pub fn import_file(&mut self, path: &Path) -> TypeId {
        self.local_file_descriptor(path, "")
    }

    /// Import every component file of a directory, plus whatever the
    /// directory's own manifest exports.
    ///
    /// Only files with the component extension whose name starts with an
    /// uppercase letter are importable; a `.ui` infix is dropped.
    pub fn import_directory(
        &mut self,
        directory: &Path,
        prefix: &str,
    ) -> Result<NamespaceTable, ImportError> {
        let mut types = AvailableTypes::with_native(self.builtins()?.native.clone());

        match self.fs.list_dir(directory) {
            Ok(entries) => {
                for entry in entries {
                    if self.fs.is_dir(&entry) {
                        continue;
                    }
                    let Some(name) = self.component_name(&entry) else {
                        continue;
                    };
                    let ty = self.local_file_descriptor(&entry, "");
                    types
                        .visible
                        .set(prefixed_name(prefix, &name), ty, Revision::invalid());
                }
            }
            Err(err) => log::debug!("cannot list {}: {}", directory.display(), err),
        }

        let module = directory.to_string_lossy().into_owned();
        self.import_helper(&module, &mut types, prefix, Revision::invalid(), false, true);
        Ok(types.visible)
    }

    fn component_name(&self, path: &Path) -> Option<String> {
        let file_name = path.file_name()?.to_str()?;
        let stem = file_name
            .strip_suffix(self.config.component_extension.as_str())?
            .strip_suffix('.')?;
        let stem = stem.strip_suffix(".ui").unwrap_or(stem);
        if stem.contains('.') || !stem.chars().next()?.is_uppercase() {
            return None;
        }
        Some(stem.to_string())
    }

    /// Pre-register manifests so later imports of the modules they export
    /// need no probing.
    ///
    /// Files named `qmldir` are read as directory manifests, anything else
    /// as a type description.
    pub fn import_manifests(&mut self, files: &[PathBuf]) {
        for file in files {
            let is_qmldir = file.file_name().is_some_and(|name| name == QMLDIR);
            let (manifest, manifest_path) = match file.parent() {
                Some(directory) if is_qmldir => (self.read_qmldir(directory), file.clone()),
                _ => {
                    self.report(Diagnostic::new(
                        DiagnosticKind::NotADirectoryManifest,
                        format!(
                            "Argument {} is not a qmldir file. Assuming type description.",
                            file.display()
                        ),
                    ));
                    let mut manifest = ModuleManifest::default();
                    self.load_type_info(file, &mut manifest);
                    let mut fake = file.clone().into_os_string();
                    fake.push(FAKE_QMLDIR_SUFFIX);
                    (manifest, PathBuf::from(fake))
                }
            };

            let served: Vec<(String, Revision)> = manifest
                .exports()
                .map(|export| (export.package.clone(), export.version))
                .collect();
            for (package, version) in served {
                self.cache
                    .record_seen(&package, version, Some(manifest_path.clone()));
                self.cache
                    .record_seen(&package, Revision::invalid(), Some(manifest_path.clone()));
            }
            self.cache.insert_manifest(manifest_path, Rc::new(manifest));
        }
    }

    // ----- import resolution -----

    fn import_helper(
        &mut self,
        module: &str,
        types: &mut AvailableTypes,
        prefix: &str,
        version: Revision,
        is_dependency: bool,
        is_file: bool,
    ) -> bool {
        if module == BUILTIN_MODULE && !is_file {
            if let Some(builtins) = self.loaded_builtins() {
                let _ = types.merge(builtins, false);
            }
            if !is_dependency {
                self.expose_builtins(types, prefix);
            }
            return true;
        }

        let key = ImportKey::new(prefix, module, version, is_file, is_dependency);
        if self.merge_cached(&key, types) {
            return true;
        }

        // Placeholder so that cyclic imports of this key find something.
        self.cache.insert_import(key.clone(), AvailableTypes::new());

        let Some(manifest) = self.locate_manifest(module, version, is_file) else {
            self.cache.remove_import(&key);
            return false;
        };

        let mut resolved = AvailableTypes::new();
        self.import_dependencies(&manifest, &mut resolved, prefix, version, is_dependency);
        self.process_import(&key, &manifest, &mut resolved);
        self.cache.insert_import(key.clone(), resolved);
        self.merge_cached(&key, types)
    }

    fn merge_cached(&mut self, key: &ImportKey, types: &mut AvailableTypes) -> bool {
        let Some(cached) = self.cache.import(key) else {
            return false;
        };
        let poisoned = types.merge(cached, !key.is_dependency);
        for name in poisoned {
            self.report(Diagnostic::new(
                DiagnosticKind::AmbiguousExport,
                format!(
                    "Ambiguous type detected. {} is defined multiple times (importing {}).",
                    name, key.module
                ),
            ));
        }
        true
    }

    fn locate_manifest(
        &mut self,
        module: &str,
        version: Revision,
        is_file: bool,
    ) -> Option<Rc<ModuleManifest>> {
        if let Some(seen) = self.cache.seen_import(module, version) {
            return seen.and_then(|path| self.cache.manifest(&path));
        }

        let candidates = if is_file {
            vec![PathBuf::from(module)]
        } else {
            candidate_directories(&self.config.import_paths, module, version)
        };

        for directory in candidates {
            let qmldir = directory.join(QMLDIR);
            let manifest = match self.cache.manifest(&qmldir) {
                Some(manifest) => manifest,
                None if self.fs.exists(&qmldir) && !self.fs.is_dir(&qmldir) => {
                    let manifest = Rc::new(self.read_qmldir(&directory));
                    self.cache.insert_manifest(qmldir.clone(), Rc::clone(&manifest));
                    manifest
                }
                None => {
                    log::debug!("no manifest in {}", directory.display());
                    continue;
                }
            };

            if let Some(major) = version.major() {
                if !is_file && !manifest.serves_major(major) {
                    log::debug!(
                        "{} does not export {} version {}",
                        qmldir.display(),
                        module,
                        major
                    );
                    continue;
                }
            }

            self.cache.record_seen(module, version, Some(qmldir));
            return Some(manifest);
        }

        self.cache.record_seen(module, version, None);
        None
    }

    fn import_dependencies(
        &mut self,
        manifest: &ModuleManifest,
        types: &mut AvailableTypes,
        prefix: &str,
        version: Revision,
        is_dependency: bool,
    ) {
        for dependency in &manifest.dependencies {
            let requested = if dependency.auto_version {
                version
            } else {
                dependency.version
            };
            if !self.import_helper(&dependency.module, types, "", requested, true, false) {
                log::debug!(
                    "dependency {} of {} not found",
                    dependency.module,
                    manifest.module_name
                );
            }
        }

        for import in &manifest.imports {
            if import.optional && !self.config.enable_optional_imports {
                self.report(Diagnostic::new(
                    DiagnosticKind::OptionalImportUnsupported,
                    format!(
                        "Skipping optional import {} of {}",
                        import.module, manifest.module_name
                    ),
                ));
                continue;
            }
            let requested = if import.auto_version {
                version
            } else {
                import.version
            };
            let import_prefix = if is_dependency { "" } else { prefix };
            if !self.import_helper(
                &import.module,
                types,
                import_prefix,
                requested,
                is_dependency,
                false,
            ) {
                log::debug!(
                    "import {} of {} not found",
                    import.module,
                    manifest.module_name
                );
            }
        }
    }

    /// Merge a manifest's exports into `types` and resolve the new natives
    fn process_import(
        &mut self,
        key: &ImportKey,
        manifest: &ModuleManifest,
        types: &mut AvailableTypes,
    ) {
        let prefix = key.prefix.as_str();
        if !prefix.is_empty() {
            types.visible.add_prefix(prefix);
        }
        if manifest.is_static {
            types.add_static_module(&manifest.module_name);
        }
        if manifest.is_system {
            self.expose_builtins(types, prefix);
            types.is_system = true;
        }

        for script in manifest.scripts() {
            let native_name =
                prefixed_name(ANONYMOUS_PREFIX, &self.graph[script.ty].internal_name);
            self.insert_exports(script, &native_name, key, types);
        }

        for object in manifest.objects() {
            let internal_name = self.graph[object.ty].internal_name.clone();
            let native_name = if self.graph.is_composite(object.ty) {
                prefixed_name(ANONYMOUS_PREFIX, &internal_name)
            } else {
                internal_name.clone()
            };

            if object.exports.is_empty() {
                let anonymous = prefixed_name(ANONYMOUS_PREFIX, &internal_name);
                let hidden = prefixed_name(prefix, &anonymous);
                types.visible.set(hidden, object.ty, Revision::invalid());
                types.native.set(native_name, object.ty, Revision::invalid());
            } else {
                self.insert_exports(object, &native_name, key, types);
            }
        }

        let mut scope = self.builtin_native();
        if let Err(err) = scope.merge(&types.native) {
            log::error!("{}", err);
        }
        let array = scope.get("Array").or(scope.array_type());
        scope.set_array_type(array);
        if types.native.array_type().is_none() {
            types.native.set_array_type(array);
            types.visible.set_array_type(array);
        }

        let pending: Vec<TypeId> = manifest
            .objects()
            .iter()
            .map(|object| object.ty)
            .filter(|&ty| !self.graph.is_unloaded(ty))
            .collect();

        let mut used = UsedTypes::default();
        for &ty in &pending {
            resolve::resolve_enums(&mut self.graph, ty, &scope, &mut used);
            resolve::resolve_list(&mut self.graph, ty, scope.array_type());
        }
        for &ty in &pending {
            if self.graph[ty].base_type.is_some() {
                continue;
            }
            if self.graph.is_composite(ty) {
                let name = self.graph[ty].internal_name.clone();
                self.report(Diagnostic::new(
                    DiagnosticKind::IncompleteCompositeType,
                    format!("Found incomplete composite type {}.", name),
                ));
            }
            resolve::resolve_non_enum_types(&mut self.graph, ty, &scope, &mut used);
        }
    }

    fn insert_exports(
        &mut self,
        exported: &ExportedType,
        native_name: &str,
        key: &ImportKey,
        types: &mut AvailableTypes,
    ) {
        let mut best: Option<&Export> = None;
        for export in &exported.exports {
            if !key.version.admits(export.version) {
                continue;
            }
            if best.map_or(true, |current| export.version > current.version) {
                best = Some(export);
            }

            let name = prefixed_name(&key.prefix, &export.name);
            if types.visible.offer(&name, exported.ty, export.version) == Offer::Poisoned {
                self.report(Diagnostic::new(
                    DiagnosticKind::AmbiguousExport,
                    format!(
                        "Ambiguous type detected. {} {} is defined multiple times.",
                        name, export.version
                    ),
                ));
            }
        }

        let revision = best.map_or_else(Revision::zero, |export| export.revision);
        types.native.set(native_name, exported.ty, revision);
    }

    // ----- manifest reading -----

    fn read_qmldir(&mut self, directory: &Path) -> ModuleManifest {
        let qmldir = directory.join(QMLDIR);
        let source = match self.fs.read_to_string(&qmldir) {
            Ok(source) => source,
            Err(err) => {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::ManifestUnreadable,
                        format!("Failed to read qmldir file {}: {}", qmldir.display(), err),
                    )
                    .with_location(SourceLocation::file(&qmldir)),
                );
                return ModuleManifest::default();
            }
        };

        let parsed = DirectoryManifest::parse(&source);
        for error in &parsed.errors {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::ManifestParseFailure,
                    format!("Failed to parse qmldir file {}: {}", qmldir.display(), error.message),
                )
                .with_location(SourceLocation::line(&qmldir, error.line)),
            );
        }

        let mut manifest = ModuleManifest::new(parsed.module.clone());
        manifest.imports = parsed.imports.clone();
        manifest.dependencies = parsed.dependencies.clone();
        manifest.is_static = parsed.is_static;
        manifest.is_system = parsed.is_system;

        for component in &parsed.components {
            let file = directory.join(&component.file_name);
            if !self.fs.exists(&file) {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::MissingDeclaredComponentFile,
                        format!(
                            "{} is listed as component in {} but {} does not exist.",
                            component.type_name,
                            qmldir.display(),
                            file.display()
                        ),
                    )
                    .with_location(SourceLocation::file(&qmldir)),
                );
                continue;
            }

            if manifest.object(&component.file_name).is_none() {
                let ty = self.local_file_descriptor(&file, &parsed.module);
                manifest.insert_object(component.file_name.clone(), ExportedType::new(ty));
            }
            let Some(entry) = manifest.object_mut(&component.file_name) else {
                continue;
            };
            if component.singleton {
                self.graph.mark_singleton(entry.ty, true);
            }
            if !component.internal {
                entry.exports.push(Export::new(
                    parsed.module.clone(),
                    component.type_name.clone(),
                    component.version,
                    component.version,
                ));
            }
        }

        for type_info in &parsed.type_infos {
            self.load_type_info(&directory.join(type_info), &mut manifest);
        }

        if parsed.type_infos.is_empty() && !parsed.plugins.is_empty() {
            let default_info = directory.join(PLUGIN_TYPE_INFO);
            if self.fs.exists(&default_info) {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::UndeclaredTypeInfo,
                        format!("typeinfo not declared in qmldir file: {}", qmldir.display()),
                    )
                    .with_location(SourceLocation::file(&qmldir)),
                );
                self.load_type_info(&default_info, &mut manifest);
            }
        }

        for script in &parsed.scripts {
            let file = directory.join(&script.file_name);
            if manifest.script_mut(&script.file_name).is_none() {
                let ty = self.local_file_descriptor(&file, &parsed.module);
                manifest.insert_script(script.file_name.clone(), ExportedType::new(ty));
            }
            if let Some(entry) = manifest.script_mut(&script.file_name) {
                entry.exports.push(Export::new(
                    parsed.module.clone(),
                    script.name.clone(),
                    script.version,
                    script.version,
                ));
            }
        }

        manifest
    }

    fn load_type_info(&mut self, path: &Path, manifest: &mut ModuleManifest) {
        if !self.fs.exists(path) {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::MissingManifestFile,
                    format!("QML types file does not exist: {}", path.display()),
                )
                .with_location(SourceLocation::file(path)),
            );
            return;
        }
        if self.fs.is_dir(path) {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::ManifestIsDirectory,
                    format!("QML types file cannot be a directory: {}", path.display()),
                )
                .with_location(SourceLocation::file(path)),
            );
            return;
        }

        let source = match self.fs.read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::ManifestUnreadable,
                        format!("Failed to read types file {}: {}", path.display(), err),
                    )
                    .with_location(SourceLocation::file(path)),
                );
                return;
            }
        };

        let info = match read_type_info(&mut self.graph, &source) {
            Ok(info) => info,
            Err(err) => {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::ManifestParseFailure,
                        format!("Failed to parse types file {}: {}", path.display(), err),
                    )
                    .with_location(SourceLocation::file(path)),
                );
                return;
            }
        };

        for error in info.errors {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::ManifestParseFailure,
                    format!("Failed to parse types file {}: {}", path.display(), error),
                )
                .with_location(SourceLocation::file(path)),
            );
        }
        for warning in info.warnings {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::ManifestParseFailure,
                    format!("{}: {}", path.display(), warning),
                )
                .with_severity(Severity::Warning)
                .with_location(SourceLocation::file(path)),
            );
        }

        if !info.dependencies.is_empty() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::DeprecatedDependencyFormat,
                    format!(
                        "Found deprecated dependencies specifications in {}. \
                         Specify dependencies in the qmldir file instead.",
                        path.display()
                    ),
                )
                .with_location(SourceLocation::file(path)),
            );
        }
        for dependency in info.dependencies {
            match ModuleImport::parse(&dependency) {
                Some(import) => manifest.dependencies.push(import),
                None => self.report(
                    Diagnostic::new(
                        DiagnosticKind::ManifestParseFailure,
                        format!("Invalid dependency '{}' in {}", dependency, path.display()),
                    )
                    .with_severity(Severity::Warning),
                ),
            }
        }

        for (name, exported) in info.objects {
            if self.graph[exported.ty].module_name.is_empty() {
                self.graph[exported.ty].module_name = manifest.module_name.clone();
            }
            manifest.insert_object(name, exported);
        }
    }

    fn local_file_descriptor(&mut self, path: &Path, module: &str) -> TypeId {
        if let Some(ty) = self.cache.file(path) {
            return ty;
        }
        let ty = self.graph.add_deferred(DeferredSource::new(path, module));
        self.cache.insert_file(path.to_path_buf(), ty);
        ty
    }

    // ----- deferred loading -----

    /// Populate a deferred descriptor if it has not been populated yet.
    ///
    /// Runs the front end at most once per descriptor. Loads triggered while
    /// the descriptor is already loading are no-ops.
    pub fn ensure_loaded(&mut self, id: TypeId) {
        let Some(source) = self.graph.begin_load(id) else {
            return;
        };

        let front_end = Rc::clone(&self.front_end);
        if let Err(err) = front_end.populate(self, &source.file_path, id) {
            let location = match err.line {
                Some(line) => SourceLocation::line(&source.file_path, line),
                None => SourceLocation::file(&source.file_path),
            };
            self.report(
                Diagnostic::new(
                    DiagnosticKind::FrontEndFailure,
                    format!("Failed to load {}: {}", source.file_path.display(), err),
                )
                .with_location(location),
            );
        }
        self.graph.finish_load(id, &source);

        let builtins = self.builtin_native();
        let mut used = UsedTypes::default();
        resolve::resolve_enums(&mut self.graph, id, &builtins, &mut used);

        let declared = self.graph[id].is_singleton;
        let name = self.graph[id].internal_name.clone();
        if source.is_singleton && !declared {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::SingletonMismatch,
                    format!(
                        "Type {} declared as singleton in qmldir but missing pragma Singleton",
                        name
                    ),
                )
                .with_location(SourceLocation::file(&source.file_path)),
            );
            self.graph[id].is_singleton = true;
        } else if !source.is_singleton && declared {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::SingletonMismatch,
                    format!(
                        "Type {} not declared as singleton in qmldir but using pragma Singleton",
                        name
                    ),
                )
                .with_location(SourceLocation::file(&source.file_path)),
            );
            self.graph[id].is_singleton = false;
        }
    }

    /// Populate a descriptor and return it
    pub fn descriptor(&mut self, id: TypeId) -> &TypeDescriptor {
        self.ensure_loaded(id);
        &self.graph[id]
    }

    /// Populate every deferred descriptor on the base and extension chains
    /// of `id`.
    pub fn ensure_chain_loaded(&mut self, id: TypeId) {
        let mut seen = FxHashSet::default();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            self.ensure_loaded(current);
            let desc = &self.graph[current];
            pending.extend(desc.extension_type);
            pending.extend(desc.base_type);
        }
    }

    /// Whether `id` and everything it derives from is resolved, loading
    /// component files on the way.
    pub fn is_fully_resolved(&mut self, id: TypeId) -> bool {
        self.ensure_chain_loaded(id);
        self.graph.is_fully_resolved(id)
    }

    /// Look a name up, loading the outer component of `Outer.Inline` names
    /// when needed.
    pub fn find_type(
        &mut self,
        name: &str,
        types: &NamespaceTable,
        used: &mut UsedTypes,
    ) -> Option<(TypeId, Revision)> {
        if let Some(found) = resolve::find_type(&mut self.graph, name, types, used) {
            return Some(found);
        }
        if types.context() != Context::Visible {
            return None;
        }
        let split = name.rfind('.').filter(|&split| split > 0)?;
        let (outer, _) = resolve::find_type(&mut self.graph, &name[..split], types, used)?;
        self.ensure_chain_loaded(outer);
        resolve::find_type(&mut self.graph, name, types, used)
    }

    /// Resolve a populated component against the names it imports
    pub fn resolve_component(&mut self, id: TypeId, types: &NamespaceTable, used: &mut UsedTypes) {
        resolve::resolve_types(&mut self.graph, id, types, used);
    }
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("config", &self.config)
            .field("types", &self.graph.len())
            .field("builtins_loaded", &self.loaded_builtins().is_some())
            .field("bootstrapping", &self.bootstrapping)
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}
