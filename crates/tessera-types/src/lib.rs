//! Tessera Type Graph
//!
//! Descriptors for importable component types, the arena that owns them,
//! the namespace tables that map names onto them, and the resolution
//! passes that turn type names into links between descriptors.

#![warn(missing_docs)]

pub mod revision;
pub mod descriptor;
pub mod graph;
pub mod deferred;
pub mod namespace;
pub mod resolve;
pub mod error;

pub use revision::{Export, ImportKey, Revision};
pub use descriptor::{
    AccessSemantics, Enumeration, Method, MethodKind, Parameter, Property, ScopeKind,
    TypeDescriptor, TypeId,
};
pub use graph::TypeGraph;
pub use deferred::{Deferred, DeferredSource};
pub use namespace::{Context, ImportedType, Lookup, NamespaceTable, Offer};
pub use resolve::UsedTypes;
pub use error::TypeGraphError;

/// Prefix given to names that have no public export.
pub const ANONYMOUS_PREFIX: &str = "$anonymous$";

/// Join a qualifier and a name with `.`, or return the name unchanged
/// when the qualifier is empty.
pub fn prefixed_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_name() {
        assert_eq!(prefixed_name("", "Item"), "Item");
        assert_eq!(prefixed_name("Q", "Item"), "Q.Item");
        assert_eq!(
            prefixed_name(ANONYMOUS_PREFIX, "Foo"),
            "$anonymous$.Foo"
        );
    }
}
