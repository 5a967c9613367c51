//! Executes a batch command against the store.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use log::debug;

use histograph_core::errors::Result;

use crate::db::{with_connection, PgPool};
use crate::errors::StorageError;

/// Runs a multi-statement command as one request.
///
/// Implementations must apply all statements or none of them.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute_batch(&self, sql: String) -> Result<()>;
}

/// Executes batches over pooled Postgres connections.
///
/// The command goes out through the simple query protocol, which Postgres
/// runs as a single implicit transaction. Each call checks out its own
/// connection, so concurrent batches do not wait on each other.
#[derive(Clone)]
pub struct PgStatementExecutor {
    pool: Arc<PgPool>,
}

impl PgStatementExecutor {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }
}

#[async_trait]
impl StatementExecutor for PgStatementExecutor {
    async fn execute_batch(&self, sql: String) -> Result<()> {
        with_connection(self.pool.clone(), move |conn| {
            debug!("[PostGIS] Executing batch command ({} bytes)", sql.len());
            conn.batch_execute(&sql).map_err(StorageError::from)?;
            Ok(())
        })
        .await
    }
}
