//! Aggregation engines over the movie record collection.
//!
//! This crate provides:
//! - The Aggregator trait shared by all engines
//! - GenreAverageEngine: rating average per genre tag
//! - YearlyRuntimeEngine: runtime average/min/max per release year
//! - TopNEngine: highest-rated popular feature films
//!
//! ## Architecture
//! Engines are synchronous and never mutate their input. Each call is a full
//! recompute over a store snapshot and returns an owned summary; nothing is
//! updated incrementally.
//!
//! ## Example Usage
//! ```ignore
//! use aggregates::{compute_genre_averages, compute_top_n, compute_yearly_runtime_stats};
//!
//! let records = store.snapshot();
//! let genres = compute_genre_averages(&records);
//! let years = compute_yearly_runtime_stats(&records);
//! let top = compute_top_n(&records, 100);
//! ```

pub mod genre_average;
pub mod top_n;
pub mod traits;
pub mod yearly_runtime;

#[cfg(test)]
mod fixtures;

// Re-export main types
pub use genre_average::{GenreAggregate, GenreAverageEngine, GenreAverages, compute_genre_averages};
pub use top_n::{RankedEntry, TopNEngine, TopRanking, compute_top_n};
pub use traits::Aggregator;
pub use yearly_runtime::{
    YearlyRuntimeAggregate, YearlyRuntimeEngine, YearlyRuntimes, compute_yearly_runtime_stats,
};
