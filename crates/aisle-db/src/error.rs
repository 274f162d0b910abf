//! Database-specific error types and conversions.

use aisle_core::error::PanelError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A statement or row decode failed at runtime, outside the
    /// migration path.
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique slug violated: {slug}")]
    DuplicateSlug { slug: String },
}

impl From<DbError> for PanelError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => PanelError::NotFound { entity, id },
            DbError::DuplicateSlug { slug } => PanelError::DuplicateSlug { slug },
            other => PanelError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_failures_do_not_read_as_migrations() {
        let err = PanelError::from(DbError::Query("constraint violated".into()));
        match err {
            PanelError::Database(message) => {
                assert!(message.starts_with("Query failed:"));
                assert!(!message.contains("Migration"));
            }
            other => panic!("expected Database, got {other:?}"),
        }

        let err = PanelError::from(DbError::Migration("bad DDL".into()));
        match err {
            PanelError::Database(message) => assert!(message.starts_with("Migration failed:")),
            other => panic!("expected Database, got {other:?}"),
        }
    }
}
