//! Exit store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Database(#[from] rusqlite::Error),

    /// A writer panicked while holding the store lock.
    #[error("exit store lock poisoned: {0}")]
    Poisoned(String),

    /// A stored row does not decode into an exit record.
    #[error("corrupt exit record: {0}")]
    InvalidData(String),

    #[error("schema migration failed: {0}")]
    Migration(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
