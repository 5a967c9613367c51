//! Error types shared by the Histograph sync crates.

use thiserror::Error;

/// Result type alias for Histograph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error surfaced to callers of a batch sync.
#[derive(Debug, Error)]
pub enum Error {
    /// Store-side failure (connection or statement)
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// A message could not be turned into a statement
    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    /// The identifier normalizer rejected an id
    #[error("Normalize error: {0}")]
    Normalize(String),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reported by the store or its transport.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A store session could not be acquired; the batch was not attempted.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The store rejected the batch; nothing from it was committed.
    #[error("Statement failed: {0}")]
    StatementFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures raised while building statements, before any network call.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("unsupported action '{action}' for {entity_type} message")]
    UnsupportedAction { action: String, entity_type: String },

    #[error("{entity_type} message in dataset '{dataset}' has neither id nor uri")]
    MissingIdentifier {
        entity_type: String,
        dataset: String,
    },

    #[error("malformed {entity_type} payload: {message}")]
    MalformedPayload {
        entity_type: String,
        message: String,
    },
}

impl Error {
    /// Create a normalize error
    pub fn normalize(message: impl Into<String>) -> Self {
        Self::Normalize(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True when the failure happened before the store was contacted.
    pub fn is_pre_flight(&self) -> bool {
        !matches!(
            self,
            Self::Database(DatabaseError::StatementFailed(_))
                | Self::Database(DatabaseError::Internal(_))
        )
    }
}
