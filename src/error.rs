use thiserror::Error;

use crate::registry::Direction;

/// Structural navigation failures raised by an XPath processor.
///
/// These indicate the tree is inconsistent with the requested operation;
/// they are never retried and surface to the caller wrapped in
/// [`MappingError::Navigation`].
#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("invalid xpath expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("invalid element or attribute name: '{name}'")]
    InvalidName { name: String },

    #[error("stale node handle: {details}")]
    DetachedNode { details: String },

    #[error("cannot {operation} at an attribute position")]
    NotAnElement { operation: &'static str },

    #[error("malformed document: {details}")]
    MalformedDocument { details: String },

    #[error("document serialization failed: {details}")]
    Serialization { details: String },
}

/// Main mapping error type surfaced by `serialize`/`deserialize`.
///
/// All variants are fatal for the call that raised them; the engine
/// performs no internal retry and never returns partial results.
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("no {direction} mapping registered for type {type_name}")]
    UnregisteredType {
        type_name: String,
        direction: Direction,
    },

    #[error("required field '{field}' missing at '{expression}'")]
    FieldMissing { field: String, expression: String },

    #[error("invalid value for field '{field}': '{value}' is not a valid {expected}")]
    ValueFormat {
        field: String,
        value: String,
        expected: String,
    },

    #[error("unknown type name: {type_name}")]
    UnknownTypeName { type_name: String },

    #[error("no type resolver configured")]
    NoTypeResolver,
}

/// Result type alias for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;

/// Result type alias for navigation primitives
pub type NavigationResult<T> = std::result::Result<T, NavigationError>;
