//! Versions, exports and import keys

use std::fmt;

use crate::error::TypeGraphError;

/// A `major.minor` version where either part may be absent.
///
/// Ordering compares the major part first; an absent part sorts before any
/// present one, so `Revision::invalid()` is lower than every valid revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Revision {
    major: Option<u16>,
    minor: Option<u16>,
}

impl Revision {
    /// Create a revision with both parts present
    pub const fn new(major: u16, minor: u16) -> Self {
        Self {
            major: Some(major),
            minor: Some(minor),
        }
    }

    /// Create a revision carrying only a major part
    pub const fn major_only(major: u16) -> Self {
        Self {
            major: Some(major),
            minor: None,
        }
    }

    /// The revision with neither part, meaning "any version"
    pub const fn invalid() -> Self {
        Self {
            major: None,
            minor: None,
        }
    }

    /// Revision `0.0`
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Major part, if present
    pub fn major(&self) -> Option<u16> {
        self.major
    }

    /// Minor part, if present
    pub fn minor(&self) -> Option<u16> {
        self.minor
    }

    /// Whether at least one part is present
    pub fn is_valid(&self) -> bool {
        self.major.is_some() || self.minor.is_some()
    }

    /// Parse `"2"`, `"2.15"` or the empty string.
    pub fn parse(text: &str) -> Result<Self, TypeGraphError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::invalid());
        }

        let invalid = || TypeGraphError::InvalidRevision(text.to_string());
        let (major, minor) = match text.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (text, None),
        };

        let major = major.parse::<u16>().map_err(|_| invalid())?;
        match minor {
            Some(minor) => {
                let minor = minor.parse::<u16>().map_err(|_| invalid())?;
                Ok(Self::new(major, minor))
            }
            None => Ok(Self::major_only(major)),
        }
    }

    /// Whether an export declared at `export` is visible to an import
    /// requesting `self`.
    ///
    /// An invalid request admits everything. Otherwise the majors must agree
    /// and, when the request names a minor, the export's minor must not
    /// exceed it. Exports without a version are always admitted.
    pub fn admits(&self, export: Revision) -> bool {
        if let (Some(requested), Some(declared)) = (self.major, export.major) {
            if requested != declared {
                return false;
            }
        }
        match (self.minor, export.minor) {
            (Some(requested), Some(declared)) => declared <= requested,
            _ => true,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.major, self.minor) {
            (Some(major), Some(minor)) => write!(f, "{}.{}", major, minor),
            (Some(major), None) => write!(f, "{}", major),
            (None, Some(minor)) => write!(f, ".{}", minor),
            (None, None) => Ok(()),
        }
    }
}

/// A public name under which a descriptor is importable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Export {
    /// Module (package) declaring the export
    pub package: String,
    /// Exported name
    pub name: String,
    /// Version at which the name becomes available
    pub version: Revision,
    /// Revision of the underlying native type
    pub revision: Revision,
}

impl Export {
    /// Create a new export
    pub fn new(
        package: impl Into<String>,
        name: impl Into<String>,
        version: Revision,
        revision: Revision,
    ) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            version,
            revision,
        }
    }

    /// An export is usable only when it has a name
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{} {}", self.name, self.version)
        } else {
            write!(f, "{}/{} {}", self.package, self.name, self.version)
        }
    }
}

/// Key identifying one resolved import request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportKey {
    /// Qualifier the import's names are placed under
    pub prefix: String,
    /// Dotted module name, or a directory path for file imports
    pub module: String,
    /// Requested version
    pub version: Revision,
    /// Whether the import targets a directory rather than a module
    pub is_file: bool,
    /// Whether the import was pulled in as a dependency of another module
    pub is_dependency: bool,
}

impl ImportKey {
    /// Create a key, normalizing `/` separators in the module name to `.`
    pub fn new(
        prefix: impl Into<String>,
        module: &str,
        version: Revision,
        is_file: bool,
        is_dependency: bool,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            module: module.replace('/', "."),
            version,
            is_file,
            is_dependency,
        }
    }
}
