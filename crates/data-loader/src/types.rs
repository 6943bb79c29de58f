//! Core domain types for the title-ratings dataset.
//!
//! This module defines the canonical record every downstream engine consumes,
//! plus the ingestion status the store publishes.
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (Year, Minutes)
//! - `Option<T>` instead of sentinel strings for unknown values
//! - Derive macros for common traits

use crate::error::DataLoadError;
use serde::Serialize;

// =============================================================================
// Type Aliases
// =============================================================================

/// Release (or end) year of a title
pub type Year = u16;

/// Runtime in minutes
///
/// Signed so that odd source data is carried through rather than rejected.
pub type Minutes = i32;

// =============================================================================
// MovieRecord
// =============================================================================

/// One dataset row after normalization.
///
/// Rust concepts:
/// - `Option<Year>` is `None` when the source said "unknown" (`\N`)
/// - `Vec<String>` keeps genre tags in source order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    /// Unique title identifier (`tconst`), passed through verbatim
    pub id: String,
    /// e.g. "movie", "short", "tvSeries"
    pub title_type: String,
    pub primary_title: String,
    pub original_title: String,
    pub is_adult: bool,
    pub start_year: Option<Year>,
    pub end_year: Option<Year>,
    pub runtime_minutes: Option<Minutes>,
    /// Empty when the source had no genres
    pub genres: Vec<String>,
    /// `NaN` when the raw value did not parse
    pub average_rating: f64,
    /// `None` when the raw value was unknown or did not parse
    pub num_votes: Option<u64>,
}

impl MovieRecord {
    /// Whether `average_rating` can take part in sums and rankings
    pub fn has_usable_rating(&self) -> bool {
        self.average_rating.is_finite()
    }
}

// =============================================================================
// Ingestion status
// =============================================================================

/// Loading state published by the [`MovieStore`](crate::MovieStore).
///
/// Lifecycle:
/// - idle: `{ is_loading: false, error: None, progress_percent: 0 }`
/// - fetch started: `{ true, None, 0 }`
/// - bytes arriving: `progress_percent` grows monotonically
/// - done: `{ false, error?, 100 }`, whether the fetch succeeded or not
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngestionStatus {
    pub is_loading: bool,
    pub error: Option<DataLoadError>,
    /// Always within `0..=100`
    pub progress_percent: u8,
}

impl IngestionStatus {
    /// Status at the start of a fetch
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            error: None,
            progress_percent: 0,
        }
    }

    /// Status once a fetch has ended, successfully or not
    pub fn finished(error: Option<DataLoadError>) -> Self {
        Self {
            is_loading: false,
            error,
            progress_percent: 100,
        }
    }

    /// True once loading has ended without an error
    pub fn is_ready(&self) -> bool {
        !self.is_loading && self.error.is_none() && self.progress_percent == 100
    }
}
