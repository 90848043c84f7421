//! Fatal import errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the importer from being usable at all.
///
/// Everything recoverable is reported as a
/// [`Diagnostic`](crate::diagnostics::Diagnostic) instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    /// The builtins do not define a type every import depends on
    #[error("Required builtin type '{name}' is missing; searched {searched:?}")]
    MissingBootstrapType {
        /// Internal name of the missing type
        name: &'static str,
        /// Directories the builtins were searched in
        searched: Vec<PathBuf>,
    },

    /// The builtins were requested while they were still being loaded
    #[error("Builtins requested while they are still being loaded")]
    BuiltinsLoading,
}

/// Error reported by a component front end
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct FrontEndError {
    /// What went wrong
    pub message: String,
    /// Line of the component file, if known
    pub line: Option<usize>,
}

impl FrontEndError {
    /// Create an error without position
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    /// Attach a line number
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}
