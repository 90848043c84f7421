//! Arena of type descriptors
//!
//! Descriptors reference each other by [`TypeId`], which makes cyclic
//! base/extension/child relations representable without shared ownership.

use std::ops::{Index, IndexMut};

use rustc_hash::FxHashSet;

use crate::descriptor::{Property, ScopeKind, TypeDescriptor, TypeId};

/// Owner of every descriptor created during an import session
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeDescriptor>,
}

impl Index<TypeId> for TypeGraph {
    type Output = TypeDescriptor;

    fn index(&self, id: TypeId) -> &TypeDescriptor {
        &self.nodes[id.index()]
    }
}

impl IndexMut<TypeId> for TypeGraph {
    fn index_mut(&mut self, id: TypeId) -> &mut TypeDescriptor {
        &mut self.nodes[id.index()]
    }
}

impl TypeGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no descriptors
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a descriptor, `None` for ids from another graph
    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.nodes.get(id.index())
    }

    /// Store a descriptor and return its id
    pub fn add(&mut self, descriptor: TypeDescriptor) -> TypeId {
        let id = TypeId(self.nodes.len() as u32);
        self.nodes.push(descriptor);
        id
    }

    /// Store a descriptor as a child scope of `parent`
    pub fn add_child(&mut self, parent: TypeId, mut descriptor: TypeDescriptor) -> TypeId {
        descriptor.parent = Some(parent);
        let id = self.add(descriptor);
        self[parent].children.push(id);
        id
    }

    /// Copy a descriptor into a new node owned by the same parent.
    ///
    /// The copy shares links with `origin` but not identity; its own
    /// child list starts empty.
    pub fn clone_node(&mut self, origin: TypeId) -> TypeId {
        let mut copy = self[origin].clone();
        copy.children.clear();
        copy.list_type = None;
        match copy.parent {
            Some(parent) => self.add_child(parent, copy),
            None => self.add(copy),
        }
    }

    /// Iterate over all ids in creation order
    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.nodes.len() as u32).map(TypeId)
    }

    /// Whether the descriptor originates from a component file
    pub fn is_composite(&self, id: TypeId) -> bool {
        let desc = &self[id];
        desc.is_composite || desc.deferred.is_some()
    }

    /// Visit `start` and its base chain, visiting each scope's extension
    /// chain before the scope itself. Stops as soon as `check` returns true.
    ///
    /// Every scope is visited at most once, so cyclic chains terminate.
    pub fn search_base_and_extension<F>(&self, start: TypeId, mut check: F) -> bool
    where
        F: FnMut(TypeId, &TypeDescriptor) -> bool,
    {
        let mut seen = FxHashSet::default();
        let mut scope = Some(start);

        while let Some(current) = scope {
            if !seen.insert(current) {
                break;
            }

            let mut extension = self[current].extension_type;
            while let Some(ext) = extension {
                if !seen.insert(ext) {
                    break;
                }
                if check(ext, &self[ext]) {
                    return true;
                }
                extension = self[ext].base_type;
            }

            if check(current, &self[current]) {
                return true;
            }
            scope = self[current].base_type;
        }

        false
    }

    /// First scope on the base chain of `id` (including itself) that is not
    /// a component file
    pub fn non_composite_base(&self, id: TypeId) -> Option<TypeId> {
        let mut seen = FxHashSet::default();
        let mut scope = Some(id);
        while let Some(current) = scope {
            if !seen.insert(current) {
                return None;
            }
            if !self.is_composite(current) {
                return Some(current);
            }
            scope = self[current].base_type;
        }
        None
    }

    /// Whether the base link of `id` is established.
    ///
    /// Grouped and attached scopes count as resolved when they carry no
    /// internal name. Every other scope counts as resolved when it names no
    /// base, or when the base link is set and, for component files, the
    /// chain eventually reaches a native type. Descriptors whose component
    /// file has not been loaded yet are never resolved.
    pub fn is_resolved(&self, id: TypeId) -> bool {
        let desc = &self[id];
        if desc.is_unloaded() {
            return false;
        }

        let name_is_empty = match desc.kind {
            ScopeKind::AttachedProperty | ScopeKind::GroupedProperty => {
                desc.internal_name.is_empty()
            }
            _ => desc.base_type_name.is_empty(),
        };
        if name_is_empty {
            return true;
        }

        let Some(base) = desc.base_type else {
            return false;
        };
        if self.is_composite(id) && self.non_composite_base(base).is_none() {
            return false;
        }
        true
    }

    /// Whether every scope on the base/extension chain of `id` is resolved
    pub fn is_fully_resolved(&self, id: TypeId) -> bool {
        let mut resolved = true;
        self.search_base_and_extension(id, |scope, _| {
            if !self.is_resolved(scope) {
                resolved = false;
                return true;
            }
            false
        });
        resolved
    }

    /// Find a property on `id` or anywhere on its base/extension chain
    pub fn property(&self, id: TypeId, name: &str) -> Option<&Property> {
        let mut found = None;
        self.search_base_and_extension(id, |scope, _| {
            if self[scope].has_own_property(name) {
                found = Some(scope);
                return true;
            }
            false
        });
        found.and_then(|scope| self[scope].properties.get(name))
    }

    /// Nearest attached-properties type on the base chain of `id`
    pub fn attached_type(&self, id: TypeId) -> Option<TypeId> {
        let mut found = None;
        self.search_base_and_extension(id, |_, desc| {
            if let Some(attached) = desc.attached_type {
                found = Some(attached);
                return true;
            }
            false
        });
        found
    }

    /// Whether `id` derives from `base`, directly or through extensions
    pub fn inherits(&self, id: TypeId, base: TypeId) -> bool {
        self.search_base_and_extension(id, |scope, _| scope == base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::AccessSemantics;

    fn chain(graph: &mut TypeGraph, names: &[&str]) -> Vec<TypeId> {
        let ids: Vec<TypeId> = names
            .iter()
            .map(|name| graph.add(TypeDescriptor::named(*name)))
            .collect();
        for pair in ids.windows(2) {
            let (derived, base) = (pair[0], pair[1]);
            graph[derived].base_type_name = graph[base].internal_name.clone();
            graph[derived].base_type = Some(base);
        }
        ids
    }

    #[test]
    fn test_add_child_sets_parent() {
        let mut graph = TypeGraph::new();
        let owner = graph.add(TypeDescriptor::named("Item"));
        let child = graph.add_child(owner, TypeDescriptor::new(ScopeKind::Enum));
        assert_eq!(graph[child].parent, Some(owner));
        assert_eq!(graph[owner].children, vec![child]);
    }

    #[test]
    fn test_search_visits_extension_before_scope() {
        let mut graph = TypeGraph::new();
        let ids = chain(&mut graph, &["Derived", "Base"]);
        let ext = graph.add(TypeDescriptor::named("BaseExt"));
        graph[ids[1]].extension_type = Some(ext);

        let mut visited = Vec::new();
        graph.search_base_and_extension(ids[0], |_, desc| {
            visited.push(desc.internal_name.clone());
            false
        });
        assert_eq!(visited, vec!["Derived", "BaseExt", "Base"]);
    }

    #[test]
    fn test_search_terminates_on_cycle() {
        let mut graph = TypeGraph::new();
        let ids = chain(&mut graph, &["A", "B"]);
        graph[ids[1]].base_type = Some(ids[0]);

        let mut count = 0;
        let found = graph.search_base_and_extension(ids[0], |_, _| {
            count += 1;
            false
        });
        assert!(!found);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_is_resolved() {
        let mut graph = TypeGraph::new();
        let root = graph.add(TypeDescriptor::named("Object"));
        assert!(graph.is_resolved(root));

        let pending = graph.add(TypeDescriptor::named("Item").with_base("Object"));
        assert!(!graph.is_resolved(pending));
        graph[pending].base_type = Some(root);
        assert!(graph.is_resolved(pending));

        let grouped = graph.add(TypeDescriptor::new(ScopeKind::GroupedProperty));
        assert!(graph.is_resolved(grouped));
    }

    #[test]
    fn test_composite_needs_native_base() {
        let mut graph = TypeGraph::new();
        let a = graph.add(TypeDescriptor::named("A").with_base("B"));
        let b = graph.add(TypeDescriptor::named("B").with_base("A"));
        graph[a].is_composite = true;
        graph[b].is_composite = true;
        graph[a].base_type = Some(b);
        graph[b].base_type = Some(a);

        assert!(!graph.is_resolved(a));
        assert!(!graph.is_fully_resolved(a));
        assert_eq!(graph.non_composite_base(a), None);

        let native = graph.add(TypeDescriptor::named("Object"));
        graph[b].base_type_name = "Object".to_string();
        graph[b].base_type = Some(native);
        assert!(graph.is_resolved(a));
        assert!(graph.is_fully_resolved(a));
        assert_eq!(graph.non_composite_base(a), Some(native));
    }

    #[test]
    fn test_property_lookup_walks_chain() {
        let mut graph = TypeGraph::new();
        let ids = chain(&mut graph, &["Rect", "Item"]);
        graph[ids[1]].add_property(Property::new("width", "double"));
        assert!(graph.property(ids[0], "width").is_some());
        assert!(graph.property(ids[0], "height").is_none());
        assert!(graph.inherits(ids[0], ids[1]));
        assert!(!graph.inherits(ids[1], ids[0]));
    }

    #[test]
    fn test_clone_node_keeps_parent() {
        let mut graph = TypeGraph::new();
        let owner = graph.add(TypeDescriptor::named("Item"));
        let wrapper = graph.add_child(
            owner,
            TypeDescriptor::named("Item::Mode").with_semantics(AccessSemantics::Value),
        );
        let copy = graph.clone_node(wrapper);
        assert_ne!(copy, wrapper);
        assert_eq!(graph[copy].parent, Some(owner));
        assert_eq!(graph[owner].children.len(), 2);
        assert_eq!(graph[copy].semantics, AccessSemantics::Value);
    }
}
