//! Error types for the advisor and its collaborators.

use std::time::Duration;

/// Errors raised by storage-backed collaborators.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to obtain a connection from the pool.
    #[error("Connection pool error: {0}")]
    Pool(String),

    /// A query failed.
    #[error("Query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// A stored document could not be decoded.
    #[error("Malformed document: {0}")]
    Document(#[from] serde_json::Error),

    /// Migration run failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// The lookup did not answer in time.
    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The collaborator is not reachable at all.
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
}

impl From<deadpool_postgres::PoolError> for DatabaseError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        DatabaseError::Pool(err.to_string())
    }
}

/// Errors returned by the advisor entry points.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// No project exists with the requested id.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// The project repository failed.
    #[error("Project repository error: {0}")]
    Database(#[from] DatabaseError),

    /// A collaborator and its built-in fallback both failed.
    #[error("{collaborator} unavailable and fallback failed: {source}")]
    Collaborator {
        collaborator: &'static str,
        #[source]
        source: DatabaseError,
    },
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is missing.
    #[error("Missing required setting: {0}")]
    MissingRequired(String),

    /// A variable is present but unusable.
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// Result type for advisor operations.
pub type Result<T> = std::result::Result<T, AdvisorError>;
