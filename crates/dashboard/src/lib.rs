//! Dashboard crate for the reel-stats analytics workspace.
//!
//! This crate owns the record store and coordinates ingestion with the
//! aggregation engines.

pub mod dashboard;

pub use dashboard::{Dashboard, View};
