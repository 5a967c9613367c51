//! Storage-layer errors and their mapping into the core error type.

use histograph_core::errors::{DatabaseError, Error};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Connect failures also land here: the pool opens sessions lazily.
    #[error("Failed to acquire pooled connection: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Blocking task failed: {0}")]
    Task(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Pool(_) => {
                Error::Database(DatabaseError::ConnectionFailed(err.to_string()))
            }
            StorageError::Query(_) => {
                Error::Database(DatabaseError::StatementFailed(err.to_string()))
            }
            StorageError::Task(_) => Error::Database(DatabaseError::Internal(err.to_string())),
        }
    }
}
