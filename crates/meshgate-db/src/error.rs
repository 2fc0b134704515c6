//! Database-specific error types and conversions.

use meshgate_core::error::MeshError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<DbError> for MeshError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => MeshError::NotFound { entity, id },
            other => MeshError::Database(other.to_string()),
        }
    }
}
