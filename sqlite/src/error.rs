//! Error types for store operations.
//!
//! Provides a unified error type covering engine-level failures and
//! definition validation. Mutators with defined no-op semantics (rename,
//! add-column, destroy-column with unmet preconditions) do not error at
//! all — they return `Ok(())` and leave the file untouched.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The embedded engine rejected a statement (e.g. duplicate table name
    /// on create). When this surfaces from the column-destruction protocol,
    /// the transaction has already rolled back and the file is unchanged.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A table definition failed structural validation before any statement
    /// was issued.
    #[error("invalid table definition: {0}")]
    InvalidDefinition(String),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
