//! Translation of PIT change messages into batched SQL and their execution.

pub mod executor;
pub mod literal;
pub mod query;
mod repository;
pub mod row;

pub use executor::{PgStatementExecutor, StatementExecutor};
pub use query::QueryBuilder;
pub use repository::PitSyncRepository;
pub use row::{to_row, PitRowLiterals, PIT_COLUMNS};
