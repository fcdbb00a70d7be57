use thiserror::Error;

/// Faults raised by the in-memory store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InMemoryError {
    #[error("Missing or invalid key attribute: {0}")]
    MissingKey(String),
    #[error("The conditional request failed")]
    ConditionalCheckFailed,
    #[error("Query requires a key condition expression")]
    MissingKeyCondition,
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),
    #[error("Unbound placeholder: {0}")]
    UnboundPlaceholder(String),
    #[error("Requested resource not found: index {0}")]
    UnknownIndex(String),
    #[error("Limit must be greater than or equal to 1, got {0}")]
    InvalidLimit(i32),
}
