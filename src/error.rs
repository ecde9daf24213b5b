use thiserror::Error;

/// Main error type for relpath
#[derive(Error, Debug)]
pub enum RelpathError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors, including incompatible `params.json` files
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path or split data that does not match the expected layout
    #[error("Schema violation: {0}")]
    Schema(String),

    /// Entity name missing from the vocabulary
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// Relation name missing from the vocabulary
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    /// Leftover state from an earlier run, e.g. a temporary directory that already exists
    #[error("Resource conflict: {0}")]
    ResourceConflict(String),
}

/// Convenient Result type using RelpathError
pub type Result<T> = std::result::Result<T, RelpathError>;
