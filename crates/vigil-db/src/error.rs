//! Error types for the persistence layer.

/// Errors that can occur in the persistence layer.
///
/// During steady-state operation a [`DbError`] fails only the current
/// camera's sync pass; it is fatal to the process only during startup
/// (initial connection or migration failure).
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
