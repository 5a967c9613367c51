//! # histograph-core
//!
//! Domain types for mirroring the Histograph PIT change stream into a
//! relational store: change messages, identifier normalization, batch
//! reports and errors.

pub mod errors;
pub mod pit;

pub use errors::{BuilderError, DatabaseError, Error, Result};
