//! Error types for path parsing and resolution

use keypath_core::AccessError;
use thiserror::Error;

/// Errors raised while parsing or resolving property paths
#[derive(Debug, Clone, Error)]
pub enum PathError {
    /// The path string does not follow the path grammar
    #[error("Malformed path {path:?}: {reason}")]
    Malformed {
        /// The offending path string
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// A segment named a field the receiver type does not have
    #[error("Field access failed: {type_name} has no field {field}")]
    FieldAccess {
        /// Name of the receiver type
        type_name: String,
        /// The unknown field name
        field: String,
    },

    /// A non-terminal tag filter matched more than one child
    #[error("Ambiguous path segment {segment}[]: {matches} children matched, expected one")]
    AmbiguousPath {
        /// The filter tag
        segment: String,
        /// How many children matched
        matches: usize,
    },

    /// None of the accessor strategies apply to (type, field)
    #[error("No accessor for field {field} on type {type_name}")]
    NoAccessor {
        /// Name of the receiver type
        type_name: String,
        /// The requested field name
        field: String,
    },

    /// A write-path intermediate was null and the governing extension
    /// does not support on-demand creation
    #[error("Cannot create intermediate value for segment {segment}")]
    UnresolvedIntermediate {
        /// The segment whose value was null
        segment: String,
    },

    /// An underlying access-layer failure
    #[error(transparent)]
    Access(AccessError),
}

impl From<AccessError> for PathError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NoSuchField { type_name, field } => {
                PathError::FieldAccess { type_name, field }
            }
            other => PathError::Access(other),
        }
    }
}
