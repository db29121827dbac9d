use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuarryError {
    /// One or more fields failed their declared rules
    #[error("Validation failed for: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Error executing a statement
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Error in statement
    #[error("Statement error: {0}")]
    Statement(String),

    /// A query was refused before rendering (e.g. a non-numeric limit)
    #[error("Unsafe query: {0}")]
    UnsafeQuery(String),

    /// An accessor name that is not a declared relation
    #[error("Call to undefined method {entity}::{method} in {file} on line {line}")]
    UndefinedMethod {
        entity: String,
        method: String,
        file: &'static str,
        line: u32,
    },

    /// A relation was read through the wrong accessor
    #[error("Relation {entity}::{relation} is {actual}, not {expected}")]
    RelationKind {
        entity: String,
        relation: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The entity type was never registered
    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),

    /// No rows matched when at least one was expected
    #[error("No rows found")]
    NotFound,

    /// Error with transaction
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// The unit of work asked for a rollback
    #[error("Transaction aborted")]
    Aborted,

    /// Error mapping data
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Generic error
    #[error("Database error: {0}")]
    Other(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for database operations
pub type Result<T> = std::result::Result<T, QuarryError>;
