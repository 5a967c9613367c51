//! Postgres connection pool and blocking-task helpers.

use std::sync::Arc;
use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, Pool, PooledConnection};
use log::debug;

use histograph_core::errors::Result;

use crate::config::PostgisConfig;
use crate::errors::StorageError;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Build a lazily-connecting pool; sessions are opened on first checkout.
pub fn create_pool(config: &PostgisConfig) -> Result<Arc<PgPool>> {
    config.validate()?;
    debug!(
        "[PostGIS] Creating pool (max_size={}, timeout={}s)",
        config.max_pool_size, config.connection_timeout_secs
    );
    let manager = ConnectionManager::<PgConnection>::new(config.database_url.clone());
    let pool = r2d2::Pool::builder()
        .max_size(config.max_pool_size)
        .min_idle(Some(0))
        .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
        .build_unchecked(manager);
    Ok(Arc::new(pool))
}

pub fn get_connection(pool: &PgPool) -> Result<PgPooledConnection> {
    Ok(pool.get().map_err(StorageError::from)?)
}

/// Run `job` with a pooled connection on the blocking thread pool.
pub async fn with_connection<F, T>(pool: Arc<PgPool>, job: F) -> Result<T>
where
    F: FnOnce(&mut PgConnection) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut conn = get_connection(&pool)?;
        job(&mut *conn)
    })
    .await
    .map_err(|err| StorageError::Task(err.to_string()))?
}
