//! Type graph errors

use thiserror::Error;

use crate::namespace::Context;

/// Errors raised by the type graph and namespace tables
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeGraphError {
    /// A version string could not be parsed
    #[error("Invalid version '{0}'")]
    InvalidRevision(String),

    /// Two namespace tables of different contexts were combined
    #[error("Cannot merge a {found:?} namespace into a {expected:?} namespace")]
    ContextMismatch {
        /// Context of the receiving table
        expected: Context,
        /// Context of the table being merged in
        found: Context,
    },
}
