//! Type resolution
//!
//! Turns the type names recorded on descriptors into links, looking names
//! up in a [`NamespaceTable`]. Every pass only fills links that are still
//! empty, so running a pass again is harmless and cyclic graphs terminate.
//!
//! Resolution happens in two flavours:
//! - [`resolve_types`] resolves a descriptor and all of its child scopes,
//!   including enum wrappers and the list wrapper.
//! - [`resolve_enums`] followed later by [`resolve_non_enum_types`] splits
//!   the same work so that enum wrappers of a whole batch of descriptors
//!   exist before any base type is looked up.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::descriptor::{AccessSemantics, ScopeKind, TypeDescriptor, TypeId};
use crate::graph::TypeGraph;
use crate::namespace::{Context, Lookup, NamespaceTable};
use crate::revision::Revision;

/// Names looked up during resolution
pub type UsedTypes = FxHashSet<String>;

/// Native spellings of list types
const NATIVE_LIST_SPELLINGS: [&str; 2] = ["List<", "ListProperty<"];
/// Visible spelling of list types
const VISIBLE_LIST_SPELLING: &str = "list<";
/// Name of the extension every sequence carries
const ARRAY_TYPE_NAME: &str = "Array";
/// Underlying type of enumerations that declare none
const DEFAULT_ENUM_TYPE: &str = "int";

fn list_element<'a>(name: &'a str, spellings: &[&str]) -> Option<&'a str> {
    spellings.iter().find_map(|open| {
        name.strip_prefix(open)
            .and_then(|rest| rest.strip_suffix('>'))
            .filter(|element| !element.is_empty())
    })
}

/// Look a name up in `types`.
///
/// Direct hits (and poisoned names) are final. Otherwise native tables
/// understand `List<T>`/`ListProperty<T>` and `Outer::Inner`, visible tables
/// understand `list<T>` and `Outer.Inline`. Every name that hits the table
/// directly is recorded in `used`.
pub fn find_type(
    graph: &mut TypeGraph,
    name: &str,
    types: &NamespaceTable,
    used: &mut UsedTypes,
) -> Option<(TypeId, Revision)> {
    match types.lookup(name) {
        Lookup::Found(ty, revision) => {
            used.insert(name.to_string());
            return Some((ty, revision));
        }
        Lookup::Poisoned => {
            used.insert(name.to_string());
            return None;
        }
        Lookup::Absent => {}
    }

    match types.context() {
        Context::Native => {
            if let Some(element) = list_element(name, &NATIVE_LIST_SPELLINGS) {
                let (element, revision) = find_type(graph, element, types, used)?;
                return resolve_list(graph, element, types.array_type())
                    .map(|list| (list, revision));
            }

            let split = name.rfind("::").filter(|&split| split > 0)?;
            let outer_name = &name[..split];
            let (outer, revision) = match types.lookup(outer_name) {
                Lookup::Found(ty, revision) => (ty, revision),
                _ => return None,
            };
            used.insert(outer_name.to_string());
            graph[outer]
                .children
                .iter()
                .copied()
                .find(|&child| graph[child].internal_name == name)
                .map(|child| (child, revision))
        }
        Context::Visible => {
            if let Some(element) = list_element(name, &[VISIBLE_LIST_SPELLING]) {
                let (element, revision) = find_type(graph, element, types, used)?;
                return resolve_list(graph, element, types.array_type())
                    .map(|list| (list, revision));
            }

            let split = name.rfind('.').filter(|&split| split > 0)?;
            let (outer, revision) = find_type(graph, &name[..split], types, used)?;
            find_inline_component(graph, outer, &name[split + 1..])
                .map(|component| (component, revision))
        }
    }
}

/// Breadth-first search for an inline component over the child scopes of
/// `outer` and of every type on its base chain.
fn find_inline_component(graph: &TypeGraph, outer: TypeId, name: &str) -> Option<TypeId> {
    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::from([outer]);

    while let Some(scope) = queue.pop_front() {
        if !seen.insert(scope) {
            continue;
        }
        let desc = &graph[scope];
        if let Some(found) = desc.children.iter().copied().find(|&child| {
            graph[child].kind == ScopeKind::InlineComponent && graph[child].internal_name == name
        }) {
            return Some(found);
        }
        queue.extend(desc.children.iter().copied());
        queue.extend(desc.base_type);
    }
    None
}

/// Return the list wrapper for `element`, creating it on first use.
///
/// Reference-typed elements are wrapped as `ListProperty<T>`, value-typed
/// ones as `List<T>`. Sequences cannot be wrapped again.
pub fn resolve_list(
    graph: &mut TypeGraph,
    element: TypeId,
    array_type: Option<TypeId>,
) -> Option<TypeId> {
    if let Some(existing) = graph[element].list_type {
        return Some(existing);
    }

    let desc = &graph[element];
    if desc.is_sequence() || desc.kind == ScopeKind::List {
        return None;
    }

    let spelling = if desc.semantics == AccessSemantics::Reference || graph.is_composite(element) {
        "ListProperty"
    } else {
        "List"
    };

    let mut wrapper = TypeDescriptor::new(ScopeKind::List);
    wrapper.internal_name = format!("{}<{}>", spelling, desc.internal_name);
    wrapper.module_name = desc.module_name.clone();
    wrapper.semantics = AccessSemantics::Sequence;
    wrapper.value_type_name = desc.internal_name.clone();
    wrapper.value_type = Some(element);
    wrapper.extension_type_name = ARRAY_TYPE_NAME.to_string();
    wrapper.extension_type = array_type;
    wrapper.extension_is_namespace = true;
    wrapper.is_creatable = false;
    wrapper.parent = Some(element);

    let list = graph.add(wrapper);
    graph[element].list_type = Some(list);
    Some(list)
}

/// Create a value-typed wrapper scope for every enumeration of `id` that
/// does not have one yet.
///
/// Wrappers are named `Owner::Enum`, become children of the owner, and
/// derive from the enumeration's underlying type. An enumeration alias gets
/// its own copy of the wrapper named `Owner::Alias`.
pub fn resolve_enums(
    graph: &mut TypeGraph,
    id: TypeId,
    types: &NamespaceTable,
    used: &mut UsedTypes,
) {
    let mut pending: Vec<String> = graph[id]
        .enumerations
        .values()
        .filter(|enumeration| enumeration.ty.is_none())
        .map(|enumeration| enumeration.name.clone())
        .collect();
    pending.sort_unstable();

    for name in pending {
        let Some(enumeration) = graph[id].enumerations.get(&name).cloned() else {
            continue;
        };
        let owner = graph[id].internal_name.clone();

        let underlying = if enumeration.type_name.is_empty() {
            DEFAULT_ENUM_TYPE
        } else {
            enumeration.type_name.as_str()
        };
        let base = find_type(graph, underlying, types, used);

        let mut wrapper = TypeDescriptor::new(ScopeKind::Enum);
        wrapper.internal_name = format!("{}::{}", owner, name);
        wrapper.module_name = graph[id].module_name.clone();
        wrapper.base_type_name = underlying.to_string();
        wrapper.base_type = base.map(|(ty, _)| ty);
        wrapper.base_revision = base.map(|(_, revision)| revision).unwrap_or_default();
        wrapper.semantics = AccessSemantics::Value;
        wrapper.is_creatable = false;
        let wrapper = graph.add_child(id, wrapper);

        let mut own = enumeration.clone();
        own.ty = Some(wrapper);
        graph[wrapper].add_enumeration(own.clone());
        graph[id].add_enumeration(own);

        let Some(alias) = enumeration.alias.clone().filter(|alias| *alias != name) else {
            continue;
        };
        if graph[id].enumerations.contains_key(&alias) {
            continue;
        }
        let aliased = graph.clone_node(wrapper);
        graph[aliased].internal_name = format!("{}::{}", owner, alias);

        let mut entry = enumeration;
        entry.name = alias;
        entry.alias = Some(name);
        entry.ty = Some(aliased);
        graph[id].add_enumeration(entry);
    }
}

fn resolve_name(
    graph: &mut TypeGraph,
    owner: TypeId,
    type_name: &str,
    is_list: bool,
    types: &NamespaceTable,
    used: &mut UsedTypes,
) -> Option<TypeId> {
    if let Some((ty, _)) = find_type(graph, type_name, types, used) {
        if is_list {
            return resolve_list(graph, ty, types.array_type());
        }
        return Some(ty);
    }
    graph[owner]
        .enumerations
        .get(type_name)
        .and_then(|enumeration| enumeration.ty)
}

/// Fill the empty links of `id` itself: base, attached, value and extension
/// types, then property, return and parameter types.
///
/// Returns the revision under which the base type was found.
pub fn resolve_type(
    graph: &mut TypeGraph,
    id: TypeId,
    types: &NamespaceTable,
    used: &mut UsedTypes,
) -> Revision {
    {
        let desc = &mut graph[id];
        if desc.is_sequence() && desc.extension_type_name.is_empty() {
            desc.extension_type_name = ARRAY_TYPE_NAME.to_string();
            desc.extension_is_namespace = true;
        }
    }

    let desc = &graph[id];
    let base_name = (desc.base_type.is_none() && !desc.base_type_name.is_empty())
        .then(|| desc.base_type_name.clone());
    let attached_name = (desc.attached_type.is_none() && !desc.attached_type_name.is_empty())
        .then(|| desc.attached_type_name.clone());
    let value_name = (desc.value_type.is_none() && !desc.value_type_name.is_empty())
        .then(|| desc.value_type_name.clone());
    let extension_name = (desc.extension_type.is_none() && !desc.extension_type_name.is_empty())
        .then(|| desc.extension_type_name.clone());

    if let Some(name) = base_name {
        if let Some((base, revision)) = find_type(graph, &name, types, used) {
            graph[id].base_type = Some(base);
            graph[id].base_revision = revision;
        }
    }
    if let Some(name) = attached_name {
        graph[id].attached_type = find_type(graph, &name, types, used).map(|(ty, _)| ty);
    }
    if let Some(name) = value_name {
        graph[id].value_type = find_type(graph, &name, types, used).map(|(ty, _)| ty);
    }
    if let Some(name) = extension_name {
        let found = find_type(graph, &name, types, used).map(|(ty, _)| ty);
        graph[id].extension_type = found.or_else(|| {
            (name == ARRAY_TYPE_NAME)
                .then(|| types.array_type())
                .flatten()
        });
    }

    resolve_members(graph, id, types, used);
    graph[id].base_revision
}

fn resolve_members(
    graph: &mut TypeGraph,
    id: TypeId,
    types: &NamespaceTable,
    used: &mut UsedTypes,
) {
    let properties: Vec<(String, String, bool)> = graph[id]
        .properties
        .values()
        .filter(|property| property.ty.is_none() && !property.type_name.is_empty())
        .map(|property| (property.name.clone(), property.type_name.clone(), property.is_list))
        .collect();
    for (name, type_name, is_list) in properties {
        let resolved = resolve_name(graph, id, &type_name, is_list, types, used);
        if let Some(property) = graph[id].properties.get_mut(&name) {
            property.ty = resolved;
        }
    }

    let method_names: Vec<String> = graph[id].methods.keys().cloned().collect();
    for name in method_names {
        let Some(mut overloads) = graph[id].methods.get(&name).cloned() else {
            continue;
        };
        for method in &mut overloads {
            if method.return_type.is_none() && !method.return_type_name.is_empty() {
                method.return_type =
                    resolve_name(graph, id, &method.return_type_name, false, types, used);
            }
            for parameter in &mut method.parameters {
                if parameter.ty.is_none() && !parameter.type_name.is_empty() {
                    parameter.ty =
                        resolve_name(graph, id, &parameter.type_name, false, types, used);
                }
            }
        }
        graph[id].methods.insert(name, overloads);
    }
}

/// Adjust a child scope to its owner before it is resolved.
///
/// A grouped-property scope takes the type of the owner's property of the
/// same name as its base. An attached-property scope takes the attached
/// type of the type it is named after.
pub fn update_child_scope(
    graph: &mut TypeGraph,
    child: TypeId,
    owner: TypeId,
    types: &NamespaceTable,
    used: &mut UsedTypes,
) {
    if graph[child].base_type.is_some() {
        return;
    }
    let name = graph[child].internal_name.clone();

    match graph[child].kind {
        ScopeKind::GroupedProperty => {
            let Some((type_name, ty)) = graph
                .property(owner, &name)
                .map(|property| (property.type_name.clone(), property.ty))
            else {
                return;
            };
            graph[child].base_type_name = type_name;
            graph[child].base_type = ty;
        }
        ScopeKind::AttachedProperty => {
            let Some((attaching, _)) = find_type(graph, &name, types, used) else {
                return;
            };
            if let Some(attached) = graph.attached_type(attaching) {
                graph[child].base_type_name = graph[attached].internal_name.clone();
                graph[child].base_type = Some(attached);
            }
        }
        _ => {}
    }
}

/// Resolve `id` completely: enum wrappers, list wrapper, own links, then
/// every child scope recursively.
pub fn resolve_types(
    graph: &mut TypeGraph,
    id: TypeId,
    types: &NamespaceTable,
    used: &mut UsedTypes,
) -> Revision {
    resolve_enums(graph, id, types, used);
    resolve_list(graph, id, types.array_type());
    let revision = resolve_type(graph, id, types, used);

    let children = graph[id].children.clone();
    for child in children {
        update_child_scope(graph, child, id, types, used);
        resolve_types(graph, child, types, used);
    }
    revision
}

/// Resolve own links of `id` and its child scopes, leaving enumerations
/// and list wrappers alone.
pub fn resolve_non_enum_types(
    graph: &mut TypeGraph,
    id: TypeId,
    types: &NamespaceTable,
    used: &mut UsedTypes,
) {
    resolve_type(graph, id, types, used);

    let children = graph[id].children.clone();
    for child in children {
        update_child_scope(graph, child, id, types, used);
        resolve_non_enum_types(graph, child, types, used);
    }
}
