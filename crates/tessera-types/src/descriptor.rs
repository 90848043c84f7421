//! Type descriptors
//!
//! A [`TypeDescriptor`] is the node type of the [`TypeGraph`](crate::TypeGraph).
//! Links to other descriptors are stored as [`TypeId`]s next to the names
//! they were resolved from, so a link is either filled in or still waiting
//! for its name to be looked up.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::deferred::Deferred;
use crate::revision::Revision;

/// Index of a descriptor inside a [`TypeGraph`](crate::TypeGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Position of the descriptor in the graph's storage
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How values of a type are accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessSemantics {
    /// Object handles
    #[default]
    Reference,
    /// Copied values
    Value,
    /// Ordered collections
    Sequence,
    /// No instances (namespaces)
    None,
}

/// What kind of scope a descriptor describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScopeKind {
    /// A regular object type
    #[default]
    Object,
    /// A grouped property block such as `font { ... }`
    GroupedProperty,
    /// An attached property block such as `Keys { ... }`
    AttachedProperty,
    /// An enumeration wrapper
    Enum,
    /// A synthesized list of some element type
    List,
    /// A named component declared inside another component
    InlineComponent,
}

/// A property declared on a descriptor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Declared type name
    pub type_name: String,
    /// Resolved type
    pub ty: Option<TypeId>,
    /// Whether the property holds a list of `type_name`
    pub is_list: bool,
    /// Whether the property may be assigned
    pub is_writable: bool,
    /// Whether the property must be set on instantiation
    pub is_required: bool,
    /// Revision the property was introduced in
    pub revision: Option<u32>,
}

impl Property {
    /// Create a writable, non-list property
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_writable: true,
            ..Default::default()
        }
    }

    /// Mark the property as a list property
    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }
}

/// Whether a method is callable or a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodKind {
    /// An invokable method
    #[default]
    Method,
    /// A signal
    Signal,
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameter {
    /// Parameter name, possibly empty
    pub name: String,
    /// Declared type name
    pub type_name: String,
    /// Resolved type
    pub ty: Option<TypeId>,
}

impl Parameter {
    /// Create an unresolved parameter
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ty: None,
        }
    }
}

/// A method or signal declared on a descriptor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Method {
    /// Method name
    pub name: String,
    /// Method or signal
    pub kind: MethodKind,
    /// Declared return type name, empty for none
    pub return_type_name: String,
    /// Resolved return type
    pub return_type: Option<TypeId>,
    /// Parameters in declaration order
    pub parameters: Vec<Parameter>,
    /// Whether this is a constructor
    pub is_constructor: bool,
    /// Revision the method was introduced in
    pub revision: Option<u32>,
}

impl Method {
    /// Create a method with no parameters
    pub fn new(name: impl Into<String>, kind: MethodKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }
}

/// An enumeration declared on a descriptor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enumeration {
    /// Enumeration name
    pub name: String,
    /// Alternative name the same enumeration is reachable under
    pub alias: Option<String>,
    /// Key names in declaration order
    pub keys: Vec<String>,
    /// Values matching `keys`, when known
    pub values: Vec<i64>,
    /// Whether the keys are flags
    pub is_flag: bool,
    /// Declared underlying type, `int` when empty
    pub type_name: String,
    /// Wrapper descriptor created during enum resolution
    pub ty: Option<TypeId>,
}

impl Enumeration {
    /// Create an enumeration with the given keys
    pub fn new<I, S>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// A node of the type graph
#[derive(Debug, Clone, Default)]
pub struct TypeDescriptor {
    /// What kind of scope this is
    pub kind: ScopeKind,
    /// Identity name, unique within a module
    pub internal_name: String,
    /// Module the descriptor belongs to, empty for local files
    pub module_name: String,
    /// Source file of a component, if any
    pub file_path: Option<PathBuf>,

    /// Base type name
    pub base_type_name: String,
    /// Resolved base type
    pub base_type: Option<TypeId>,
    /// Revision of the base type's export the link was resolved through
    pub base_revision: Revision,

    /// Value semantics of instances
    pub semantics: AccessSemantics,
    /// Whether the descriptor was loaded from a component file
    pub is_composite: bool,
    /// Whether the type is a singleton
    pub is_singleton: bool,
    /// Whether instances can be created
    pub is_creatable: bool,

    /// Attached-properties type name
    pub attached_type_name: String,
    /// Resolved attached-properties type
    pub attached_type: Option<TypeId>,
    /// Element type name for sequences
    pub value_type_name: String,
    /// Resolved element type for sequences
    pub value_type: Option<TypeId>,
    /// Extension type name
    pub extension_type_name: String,
    /// Resolved extension type
    pub extension_type: Option<TypeId>,
    /// Whether the extension only contributes names, not members
    pub extension_is_namespace: bool,

    /// Implemented interface names
    pub interface_names: Vec<String>,
    /// Name of the default property
    pub default_property: Option<String>,
    /// Name of the parent property
    pub parent_property: Option<String>,

    /// Properties by name
    pub properties: FxHashMap<String, Property>,
    /// Methods by name; overloads share a name
    pub methods: FxHashMap<String, Vec<Method>>,
    /// Enumerations by name
    pub enumerations: FxHashMap<String, Enumeration>,

    /// Owned child scopes
    pub children: Vec<TypeId>,
    /// Owning scope
    pub parent: Option<TypeId>,
    /// Memoized list wrapper for this element type
    pub list_type: Option<TypeId>,
    /// Lazy-load state for component files
    pub deferred: Option<Deferred>,
}

impl TypeDescriptor {
    /// Create an empty descriptor of the given kind
    pub fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            is_creatable: true,
            ..Default::default()
        }
    }

    /// Create an object descriptor with an internal name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            internal_name: name.into(),
            ..Self::new(ScopeKind::Object)
        }
    }

    /// Set the base type name
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_type_name = base.into();
        self
    }

    /// Set the access semantics
    pub fn with_semantics(mut self, semantics: AccessSemantics) -> Self {
        self.semantics = semantics;
        self
    }

    /// `module/name`, or just the name for descriptors outside a module
    pub fn qualified_name(&self) -> String {
        if self.module_name.is_empty() {
            self.internal_name.clone()
        } else {
            format!("{}/{}", self.module_name, self.internal_name)
        }
    }

    /// Add or replace a property
    pub fn add_property(&mut self, property: Property) {
        self.properties.insert(property.name.clone(), property);
    }

    /// Add a method overload
    pub fn add_method(&mut self, method: Method) {
        self.methods
            .entry(method.name.clone())
            .or_default()
            .push(method);
    }

    /// Add or replace an enumeration
    pub fn add_enumeration(&mut self, enumeration: Enumeration) {
        self.enumerations
            .insert(enumeration.name.clone(), enumeration);
    }

    /// Whether the descriptor has a property of this name itself
    pub fn has_own_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Whether this descriptor still waits for its component file to load
    pub fn is_unloaded(&self) -> bool {
        matches!(self.deferred, Some(Deferred::Unloaded(_)))
    }

    /// Whether access to this type yields a sequence
    pub fn is_sequence(&self) -> bool {
        self.semantics == AccessSemantics::Sequence
    }
}
