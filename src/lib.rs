//! Weekly per-customer basket reports.
//!
//! Transaction baskets are flattened into one row per item, enriched with
//! product categories and customer loyalty scores, split into Sunday-bounded
//! week windows and aggregated per customer into one JSON report per window.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod natural;
pub mod partition;
pub mod pipeline;
pub mod records;
pub mod reference;
pub mod sink;
pub mod transaction;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::{run, run_to_directory, RunSummary};
