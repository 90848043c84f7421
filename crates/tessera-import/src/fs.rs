//! File access
//!
//! All manifest and directory probing goes through [`FileSystem`] so the
//! importer can run against the real disk, a bundled resource tree, or an
//! in-memory tree in tests. Paths starting with `:` name bundled resources.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;

/// Read-only view of the files the importer may look at
pub trait FileSystem {
    /// Whether a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Whether the path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Entries directly inside a directory, sorted
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Whole contents of a file
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Whether a path names a bundled resource
pub fn is_resource_path(path: &Path) -> bool {
    path.to_str().is_some_and(|path| path.starts_with(':'))
}

/// The process's file system, with resource paths mapped below an optional
/// resource root.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem {
    resource_root: Option<PathBuf>,
}

impl RealFileSystem {
    /// Create a file system without bundled resources
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `:`-prefixed paths from `root`
    pub fn with_resource_root(root: impl Into<PathBuf>) -> Self {
        Self {
            resource_root: Some(root.into()),
        }
    }

    fn map(&self, path: &Path) -> Option<PathBuf> {
        if !is_resource_path(path) {
            return Some(path.to_path_buf());
        }
        let Some(root) = self.resource_root.as_ref() else {
            log::warn!("no resource root configured for {}", path.display());
            return None;
        };
        let relative = path.to_str()?.trim_start_matches(':').trim_start_matches('/');
        Some(root.join(relative))
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no resource root for {}", path.display()),
        )
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.map(path).is_some_and(|path| path.exists())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.map(path).is_some_and(|path| path.is_dir())
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mapped = self.map(path).ok_or_else(|| Self::not_found(path))?;
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&mapped)? {
            let entry = entry?;
            entries.push(path.join(entry.file_name()));
        }
        entries.sort();
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let mapped = self.map(path).ok_or_else(|| Self::not_found(path))?;
        std::fs::read_to_string(mapped)
    }
}

/// In-memory file tree that counts reads per file
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, String>,
    reads: RefCell<FxHashMap<PathBuf, usize>>,
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

impl MemoryFileSystem {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file
    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), contents.into());
    }

    /// How often a file has been read
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        self.reads
            .borrow()
            .get(&normalize(path.as_ref()))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of reads
    pub fn total_reads(&self) -> usize {
        self.reads.borrow().values().sum()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.files.contains_key(&path) || self.is_dir(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.files
            .keys()
            .any(|file| file != &path && file.starts_with(&path))
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let path = normalize(path);
        let mut entries: Vec<PathBuf> = self
            .files
            .keys()
            .filter_map(|file| file.strip_prefix(&path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|first| path.join(first.as_os_str()))
            .collect();
        if entries.is_empty() && !self.is_dir(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", path.display()),
            ));
        }
        entries.sort();
        entries.dedup();
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let path = normalize(path);
        let contents = self.files.get(&path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })?;
        *self.reads.borrow_mut().entry(path).or_insert(0) += 1;
        Ok(contents)
    }
}
