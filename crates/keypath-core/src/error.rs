//! Error types for the core object model

use thiserror::Error;

/// Errors raised while accessing fields, containers, or extensions
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    /// No extension registered anywhere on the supertype chain
    #[error("No class extension registered for type {key}")]
    NoExtension {
        /// Display name of the type key the lookup started from
        key: String,
    },

    /// Field lookup failed on the receiver type
    #[error("Type {type_name} has no field named {field}")]
    NoSuchField {
        /// Name of the receiver type
        type_name: String,
        /// Requested field name
        field: String,
    },

    /// Operation not supported by the receiver's container kind
    #[error("Container kind {kind} does not support {operation}")]
    UnsupportedContainerOperation {
        /// Display name of the container kind
        kind: String,
        /// Name of the rejected operation
        operation: String,
    },

    /// Positional access outside the container bounds
    #[error("Index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Container length at the time of the call
        len: usize,
    },

    /// A non-public member was referenced through the access layer
    #[error("Member {member} of {type_name} is not publicly accessible")]
    NotPublic {
        /// Name of the declaring type
        type_name: String,
        /// Name of the offending field or method
        member: String,
    },

    /// A class name was registered twice
    #[error("Class {name} is already registered")]
    DuplicateClass {
        /// The duplicated class name
        name: String,
    },

    /// A value had the wrong runtime kind for the operation
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected kind or type name
        expected: String,
        /// Kind or type name actually found
        found: String,
    },

    /// A host method body returned an error
    #[error("Method {method} on {type_name} failed: {message}")]
    MethodFailed {
        /// Name of the declaring type
        type_name: String,
        /// Name of the method
        method: String,
        /// Message produced by the method body
        message: String,
    },
}
