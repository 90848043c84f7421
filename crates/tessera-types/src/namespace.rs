//! Namespace tables
//!
//! A [`NamespaceTable`] maps names to descriptors for one resolution
//! context. The native context holds implementation names (`QObject`,
//! `List<int>`, `Owner::Enum`), the visible context holds the names users
//! write in documents (`Item`, `Q.Item`, `list<int>`).
//!
//! Visible names exported by more than one module at the same version are
//! poisoned: the name stays in the table so later lookups know it exists,
//! but it resolves to nothing.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::descriptor::TypeId;
use crate::error::TypeGraphError;
use crate::resolve::UsedTypes;
use crate::revision::Revision;
use crate::ANONYMOUS_PREFIX;

/// Resolution context of a namespace table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Implementation names
    Native,
    /// Names written in documents
    Visible,
}

/// A table entry; `ty` is `None` for poisoned names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportedType {
    /// Target descriptor
    pub ty: Option<TypeId>,
    /// Version the name was imported at
    pub revision: Revision,
}

/// Result of looking a name up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The name is not in the table
    Absent,
    /// The name is ambiguous
    Poisoned,
    /// The name resolves to a descriptor
    Found(TypeId, Revision),
}

/// Outcome of offering an entry to a visible table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// The name was new
    Inserted,
    /// The entry was overwritten by a higher version
    Replaced,
    /// The existing entry was kept
    Kept,
    /// The name clashed with a different descriptor at the same version
    Poisoned,
}

/// Name-to-descriptor table for one context
#[derive(Debug, Clone)]
pub struct NamespaceTable {
    context: Context,
    entries: FxHashMap<String, ImportedType>,
    prefixes: FxHashSet<String>,
    array_type: Option<TypeId>,
}

impl NamespaceTable {
    /// Create an empty table
    pub fn new(context: Context) -> Self {
        Self {
            context,
            entries: FxHashMap::default(),
            prefixes: FxHashSet::default(),
            array_type: None,
        }
    }

    /// Create an empty native table
    pub fn native() -> Self {
        Self::new(Context::Native)
    }

    /// Create an empty visible table
    pub fn visible() -> Self {
        Self::new(Context::Visible)
    }

    /// Context of this table
    pub fn context(&self) -> Context {
        self.context
    }

    /// Number of names, poisoned ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no names
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the name is present, even if poisoned
    pub fn has_type(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Look a name up
    pub fn lookup(&self, name: &str) -> Lookup {
        match self.entries.get(name) {
            None => Lookup::Absent,
            Some(ImportedType { ty: None, .. }) => Lookup::Poisoned,
            Some(ImportedType {
                ty: Some(ty),
                revision,
            }) => Lookup::Found(*ty, *revision),
        }
    }

    /// Descriptor behind a name, `None` when absent or poisoned
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.entries.get(name).and_then(|entry| entry.ty)
    }

    /// Raw entry for a name
    pub fn entry(&self, name: &str) -> Option<ImportedType> {
        self.entries.get(name).copied()
    }

    /// Insert or overwrite a name unconditionally
    pub fn set(&mut self, name: impl Into<String>, ty: TypeId, revision: Revision) {
        self.entries.insert(
            name.into(),
            ImportedType {
                ty: Some(ty),
                revision,
            },
        );
    }

    /// Mark a name as ambiguous
    pub fn poison(&mut self, name: impl Into<String>, revision: Revision) {
        self.entries
            .insert(name.into(), ImportedType { ty: None, revision });
    }

    /// Remove a name
    pub fn remove(&mut self, name: &str) -> Option<ImportedType> {
        self.entries.remove(name)
    }

    /// Offer an entry, applying the version tie-break of visible tables.
    ///
    /// The same descriptor keeps the higher of the two versions. A different
    /// descriptor at a lower version is ignored, at the same version it
    /// poisons the name, and at a higher version it takes over the name
    /// (poisoned or not). Native tables simply overwrite.
    pub fn offer(&mut self, name: &str, ty: TypeId, revision: Revision) -> Offer {
        if self.context == Context::Native {
            let replaced = self.entries.contains_key(name);
            self.set(name, ty, revision);
            return if replaced { Offer::Replaced } else { Offer::Inserted };
        }

        let Some(existing) = self.entries.get_mut(name) else {
            self.set(name, ty, revision);
            return Offer::Inserted;
        };

        if existing.ty == Some(ty) {
            if revision > existing.revision {
                existing.revision = revision;
                return Offer::Replaced;
            }
            return Offer::Kept;
        }

        if revision < existing.revision {
            Offer::Kept
        } else if revision == existing.revision {
            existing.ty = None;
            Offer::Poisoned
        } else {
            *existing = ImportedType {
                ty: Some(ty),
                revision,
            };
            Offer::Replaced
        }
    }

    /// Merge another table of the same context into this one.
    ///
    /// Returns the names that became ambiguous through the merge. Import
    /// prefixes are united, and the array type is taken over when this
    /// table has none.
    pub fn merge(&mut self, other: &NamespaceTable) -> Result<Vec<String>, TypeGraphError> {
        if self.context != other.context {
            return Err(TypeGraphError::ContextMismatch {
                expected: self.context,
                found: other.context,
            });
        }

        let mut poisoned = Vec::new();
        for (name, entry) in &other.entries {
            match (self.context, entry.ty) {
                (Context::Native, _) => {
                    self.entries.insert(name.clone(), *entry);
                }
                (Context::Visible, Some(ty)) => {
                    if self.offer(name, ty, entry.revision) == Offer::Poisoned {
                        poisoned.push(name.clone());
                    }
                }
                (Context::Visible, None) => {
                    let keep = self
                        .entries
                        .get(name)
                        .is_some_and(|existing| existing.revision > entry.revision);
                    if !keep {
                        self.entries.insert(name.clone(), *entry);
                    }
                }
            }
        }

        self.prefixes.extend(other.prefixes.iter().cloned());
        if self.array_type.is_none() {
            self.array_type = other.array_type;
        }

        poisoned.sort();
        Ok(poisoned)
    }

    /// Record that names were imported under a qualifier
    pub fn add_prefix(&mut self, prefix: impl Into<String>) {
        self.prefixes.insert(prefix.into());
    }

    /// Whether a qualifier is in use
    pub fn is_prefix(&self, prefix: &str) -> bool {
        self.prefixes.contains(prefix)
    }

    /// All qualifiers in use
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    /// Descriptor list wrappers extend
    pub fn array_type(&self) -> Option<TypeId> {
        self.array_type
    }

    /// Set the descriptor list wrappers extend
    pub fn set_array_type(&mut self, ty: Option<TypeId>) {
        self.array_type = ty;
    }

    /// Iterate over all entries in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImportedType)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// All names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolvable names never recorded in `used`, sorted.
    ///
    /// Anonymous names cannot be written by users and are never reported.
    pub fn unused_names(&self, used: &UsedTypes) -> Vec<&str> {
        let mut unused: Vec<&str> = self
            .entries
            .iter()
            .filter(|(name, entry)| {
                entry.ty.is_some() && !name.contains(ANONYMOUS_PREFIX) && !used.contains(*name)
            })
            .map(|(name, _)| name.as_str())
            .collect();
        unused.sort_unstable();
        unused
    }
}
