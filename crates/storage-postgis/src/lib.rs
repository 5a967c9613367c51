//! # histograph-storage-postgis
//!
//! Keeps a PostGIS table in step with the Histograph PIT change stream.
//! Each batch of change messages becomes one multi-statement command of
//! `(id, dataset)`-keyed upserts and deletes, executed in a single round trip.

pub mod config;
pub mod db;
pub mod errors;
pub mod schema;
pub mod sync;

pub use config::{DeleteIdPolicy, PostgisConfig};
pub use errors::StorageError;
pub use sync::{PitSyncRepository, QueryBuilder, StatementExecutor};
