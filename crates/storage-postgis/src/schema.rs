//! Mirror table bootstrap, run once at startup.

use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use log::info;

use histograph_core::errors::Result;

use crate::db::{with_connection, PgPool};
use crate::errors::StorageError;

const DEFAULT_SCHEMA: &str = "public";

#[derive(diesel::QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    c: i64,
}

/// Split `schema.table`; unqualified names live in `public`.
fn split_table_name(table_name: &str) -> (&str, &str) {
    table_name
        .split_once('.')
        .unwrap_or((DEFAULT_SCHEMA, table_name))
}

/// Catalog spelling of `table_name`. Unquoted identifiers are folded to
/// lower case by Postgres, and `pg_tables` stores the folded form.
fn catalog_name(table_name: &str) -> (String, String) {
    let (schema, table) = split_table_name(table_name);
    (schema.to_ascii_lowercase(), table.to_ascii_lowercase())
}

pub fn create_table_sql(table_name: &str) -> String {
    let (schema, table) = split_table_name(table_name);
    format!(
        "CREATE TABLE {schema}.{table} (\n\
         \x20   id text NOT NULL,\n\
         \x20   dataset text NOT NULL,\n\
         \x20   name text,\n\
         \x20   type text,\n\
         \x20   data jsonb,\n\
         \x20   geometry geometry,\n\
         \x20   CONSTRAINT {table}_pkey PRIMARY KEY (id, dataset)\n\
         );\n\
         CREATE INDEX {table}_gix ON {schema}.{table} USING GIST (geometry);\n\
         CREATE INDEX {table}_dataset ON {schema}.{table} (dataset);\n\
         CREATE INDEX {table}_type ON {schema}.{table} (type);\n"
    )
}

pub fn table_exists(conn: &mut PgConnection, table_name: &str) -> Result<bool> {
    let (schema, table) = catalog_name(table_name);
    let row = diesel::sql_query(
        "SELECT COUNT(*) AS c FROM pg_catalog.pg_tables WHERE schemaname = $1 AND tablename = $2",
    )
    .bind::<Text, _>(schema)
    .bind::<Text, _>(table)
    .get_result::<CountRow>(conn)
    .map_err(StorageError::from)?;
    Ok(row.c > 0)
}

/// Create the table and its indexes if missing. Returns `true` if created.
pub fn ensure_table(conn: &mut PgConnection, table_name: &str) -> Result<bool> {
    if table_exists(conn, table_name)? {
        return Ok(false);
    }
    info!(
        "[PostGIS] Table \"{}\" does not exist - creating table...",
        table_name
    );
    conn.batch_execute(&create_table_sql(table_name))
        .map_err(StorageError::from)?;
    Ok(true)
}

pub async fn bootstrap(pool: Arc<PgPool>, table_name: String) -> Result<bool> {
    with_connection(pool, move |conn| ensure_table(conn, &table_name)).await
}
