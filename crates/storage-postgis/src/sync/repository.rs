//! Batch sync of PIT change messages into the PostGIS mirror table.

use std::sync::Arc;

use log::{debug, info, log, warn, Level};
use uuid::Uuid;

use histograph_core::errors::{Error, Result};
use histograph_core::pit::{ChangeMessage, IdNormalizer, SyncReport};

use super::executor::{PgStatementExecutor, StatementExecutor};
use super::query::QueryBuilder;
use crate::config::PostgisConfig;
use crate::db::create_pool;
use crate::schema;

/// Store-side failures, including a session that cannot be acquired, are
/// errors. Anything rejected before the store is involved is a warning.
fn failure_level(err: &Error) -> Level {
    match err {
        Error::Database(_) => Level::Error,
        _ => Level::Warn,
    }
}

pub struct PitSyncRepository {
    builder: QueryBuilder,
    executor: Arc<dyn StatementExecutor>,
    pg: Option<PgStatementExecutor>,
}

impl PitSyncRepository {
    /// Connect to the store described by `config`.
    ///
    /// The pool connects lazily; connection failures surface on the first
    /// batch that needs the store.
    ///
    /// With the default [`DeleteIdPolicy::Raw`](crate::DeleteIdPolicy::Raw),
    /// a delete matches the payload id as received, so it does not remove a
    /// row stored under a normalized id. Use `DeleteIdPolicy::Normalized` for
    /// add and delete to address the same row.
    pub fn connect(config: &PostgisConfig, normalizer: Arc<dyn IdNormalizer>) -> Result<Self> {
        let pg = PgStatementExecutor::new(create_pool(config)?);
        Ok(Self {
            builder: QueryBuilder::new(config, normalizer)?,
            executor: Arc::new(pg.clone()),
            pg: Some(pg),
        })
    }

    /// Use a custom executor instead of a Postgres pool.
    pub fn with_executor(
        config: &PostgisConfig,
        normalizer: Arc<dyn IdNormalizer>,
        executor: Arc<dyn StatementExecutor>,
    ) -> Result<Self> {
        Ok(Self {
            builder: QueryBuilder::new(config, normalizer)?,
            executor,
            pg: None,
        })
    }

    /// Create the mirror table and its indexes when missing. Returns `true`
    /// if the table was created. No-op for custom executors.
    pub async fn bootstrap(&self) -> Result<bool> {
        match &self.pg {
            Some(pg) => schema::bootstrap(pg.pool(), self.builder.table_name().to_string()).await,
            None => Ok(false),
        }
    }

    /// One statement per pit message, in input order. Any failure aborts
    /// the whole batch.
    pub fn build_batch(&self, messages: &[ChangeMessage]) -> Result<Vec<String>> {
        let mut statements = Vec::new();
        for (index, message) in messages.iter().enumerate() {
            if !message.is_pit() {
                continue;
            }
            let statement = self.builder.build(message).map_err(|err| {
                warn!(
                    "[PitSync] Rejecting batch: message {} (action={}, dataset={}): {}",
                    index,
                    message.action.as_str(),
                    message.dataset,
                    err
                );
                err
            })?;
            statements.push(statement);
        }
        Ok(statements)
    }

    /// Apply `messages` as one unit of work.
    ///
    /// Messages that are not pits are skipped. When no statements remain the
    /// store is not contacted.
    pub async fn sync(&self, messages: &[ChangeMessage]) -> Result<SyncReport> {
        let batch_id = Uuid::now_v7();
        let statements = self.build_batch(messages)?;

        if statements.is_empty() {
            debug!(
                "[PitSync] Batch {}: no pit statements in {} messages, skipping store",
                batch_id,
                messages.len()
            );
            return Ok(SyncReport::new(batch_id, messages.len(), 0));
        }

        let statement_count = statements.len();
        let command = statements.join("\n");
        if let Err(err) = self.executor.execute_batch(command).await {
            log!(
                failure_level(&err),
                "[PitSync] Batch {} failed ({} statements): {}",
                batch_id,
                statement_count,
                err
            );
            return Err(err);
        }

        info!(
            "[PitSync] PostGIS => {} (batch {}, {} statements)",
            messages.len(),
            batch_id,
            statement_count
        );
        Ok(SyncReport::new(batch_id, messages.len(), statement_count))
    }

    /// Callback form of [`sync`](Self::sync); `on_done` runs exactly once.
    pub async fn sync_with<F>(&self, messages: &[ChangeMessage], on_done: F)
    where
        F: FnOnce(Result<SyncReport>),
    {
        on_done(self.sync(messages).await);
    }
}
