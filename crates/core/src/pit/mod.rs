//! PIT change-stream domain models.

mod normalizer;
mod pit_model;
mod sync_report;

pub use normalizer::*;
pub use pit_model::*;
pub use sync_report::*;
