use thiserror::Error;

use crate::names::ValueShape;

/// Usage errors raised by mutating operations on the document model.
///
/// Structural problems found by validation are not errors of this kind;
/// they are returned as [`crate::ValidationError`] values.
#[derive(Error, Debug)]
pub enum DomError {
    /// Names become element names and may not contain whitespace
    #[error("Invalid name '{0}': names must be non-empty and contain no whitespace")]
    InvalidName(String),

    /// Name already taken within the same namespace
    #[error("Duplicate {namespace} name: {name}")]
    DuplicateName { namespace: &'static str, name: String },

    /// Positional insertion past the end of a list
    #[error("Index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// An element cannot become a child of itself or of its descendants
    #[error("Cannot insert '{0}' below itself")]
    CyclicInsertion(String),

    /// No registered action variant with this id
    #[error("Unknown action variant: {0}")]
    UnknownActionVariant(String),

    /// The process-wide action registry is already in place
    #[error("Action registry already installed")]
    RegistryAlreadyInstalled,

    /// Operation only valid on another kind of control statement
    #[error("Expected a {expected} statement, found {actual}")]
    WrongStatementKind { expected: &'static str, actual: &'static str },

    /// Operation not supported by the resource's current type
    #[error("Resource '{resource}' does not support {operation}")]
    UnsupportedResourceOperation { resource: String, operation: &'static str },

    /// More than one resource type structure on a single resource
    #[error("Resource '{0}' declares more than one resource type")]
    AmbiguousResourceType(String),

    /// Default value whose shape does not fit the input's declared type
    #[error("Input '{input}' of type {io_type} cannot hold a {shape:?} default")]
    DefaultValueShapeMismatch {
        input: String,
        io_type: String,
        shape: ValueShape,
    },

    /// Operation needs an owning document but the entity is detached
    #[error("'{0}' is not part of a document")]
    NotInDocument(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl DomError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DomError::InvalidName(_) => "ERR_DOM_INVALID_NAME",
            DomError::DuplicateName { .. } => "ERR_DOM_DUPLICATE_NAME",
            DomError::IndexOutOfRange { .. } => "ERR_DOM_INDEX_OUT_OF_RANGE",
            DomError::CyclicInsertion(_) => "ERR_DOM_CYCLIC_INSERTION",
            DomError::UnknownActionVariant(_) => "ERR_DOM_UNKNOWN_VARIANT",
            DomError::RegistryAlreadyInstalled => "ERR_DOM_REGISTRY_INSTALLED",
            DomError::WrongStatementKind { .. } => "ERR_DOM_WRONG_STATEMENT_KIND",
            DomError::UnsupportedResourceOperation { .. } => "ERR_DOM_UNSUPPORTED_RESOURCE_OP",
            DomError::AmbiguousResourceType(_) => "ERR_DOM_AMBIGUOUS_RESOURCE_TYPE",
            DomError::DefaultValueShapeMismatch { .. } => "ERR_DOM_DEFAULT_SHAPE_MISMATCH",
            DomError::NotInDocument(_) => "ERR_DOM_NOT_IN_DOCUMENT",
            DomError::Config(_) => "ERR_DOM_CONFIG",
        }
    }
}

/// Result type for document model operations
pub type DomResult<T> = Result<T, DomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_messages() {
        let err = DomError::InvalidName("my name".to_string());
        assert_eq!(err.error_code(), "ERR_DOM_INVALID_NAME");
        assert!(err.to_string().contains("'my name'"));

        let err = DomError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(err.to_string(), "Index 4 out of range for 2 entries");
    }
}
