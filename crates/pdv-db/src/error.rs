//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! SQLite error (sqlx::Error)
//!      │
//!      ▼
//! DbError (this module)  ← adds context and categorization
//!      │
//!      ▼
//! StoreError             ← joins infra errors with the core taxonomy
//!                          (InsufficientStock, Shortfall, ...) at the
//!                          ledger/checkout surface
//! ```

use thiserror::Error;

use pdv_core::CoreError;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in the database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Database connection failed (missing file, permissions, disk).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed to apply.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Constraint violation surfaced by SQLite (CHECK, FK, UNIQUE).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// All pool connections in use.
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Anything else.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                if msg.contains("constraint") {
                    DbError::ConstraintViolation(msg)
                } else {
                    DbError::QueryFailed(msg)
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for plain database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors crossing the ledger/checkout surface: either a business rule
/// (core taxonomy) or an infrastructure failure. Both are recoverable;
/// the failed operation leaves no partial state behind.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for ledger and checkout operations.
pub type StoreResult<T> = Result<T, StoreError>;
