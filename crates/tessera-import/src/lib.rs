//! Tessera Import Engine
//!
//! This crate turns `import` statements of Tessera documents into namespace
//! tables, including:
//! - Module lookup on import paths with versioned directory probing
//! - Directory manifest (`qmldir`) and type description parsing
//! - Dependency propagation and import cycle handling
//! - Ambiguity detection between modules exporting the same name
//! - Lazy population of component file descriptors
//! - Diagnostics rendered through codespan-reporting

#![warn(missing_docs)]

pub mod available;
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod front_end;
pub mod fs;
pub mod importer;
pub mod manifest;
pub mod paths;
pub mod qmldir;
pub mod typeinfo;

pub use available::AvailableTypes;
pub use cache::CacheStats;
pub use config::{ConfigError, ImporterConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity, SourceLocation};
pub use error::{FrontEndError, ImportError};
pub use front_end::{ComponentFrontEnd, NullFrontEnd};
pub use fs::{FileSystem, MemoryFileSystem, RealFileSystem};
pub use importer::{Importer, BUILTIN_MODULE};
pub use manifest::{ExportedType, ModuleManifest};
pub use qmldir::{DirectoryManifest, ModuleImport};
pub use typeinfo::{read_type_info, TypeInfo, TypeInfoError};

pub use tessera_types::{NamespaceTable, Revision, TypeGraph, TypeId};
