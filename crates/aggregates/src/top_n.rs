//! Top-N ranking of popular feature films.

use crate::traits::Aggregator;
use data_loader::{MovieRecord, Year};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Default number of ranked entries
pub const DEFAULT_LIMIT: usize = 100;
/// Default title type that qualifies
pub const DEFAULT_TITLE_TYPE: &str = "movie";
/// Default popularity floor
pub const DEFAULT_MIN_VOTES: u64 = 100_000;

/// Display fields of one ranked title
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub title: String,
    pub average_rating: f64,
    pub num_votes: u64,
    pub start_year: Option<Year>,
}

/// 1-based rank -> entry. Ranks are contiguous from 1.
pub type TopRanking = BTreeMap<usize, RankedEntry>;

/// Ranks qualifying titles by rating.
///
/// ## Algorithm
/// 1. Keep records with `title_type == self.title_type`,
///    `num_votes >= self.min_votes` and a usable rating
/// 2. Stable sort by rating, highest first; equal ratings keep their
///    original record order
/// 3. Take the first `limit` and number them from 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopNEngine {
    pub limit: usize,
    pub title_type: String,
    pub min_votes: u64,
}

impl TopNEngine {
    /// Create a TopNEngine.
    ///
    /// # Arguments
    /// * `limit` - Maximum number of entries (typically 100)
    /// * `title_type` - Required title type (typically "movie")
    /// * `min_votes` - Minimum vote count (typically 100,000)
    pub fn new(limit: usize, title_type: impl Into<String>, min_votes: u64) -> Self {
        Self {
            limit,
            title_type: title_type.into(),
            min_votes,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn qualifies(&self, record: &MovieRecord) -> bool {
        record.title_type == self.title_type
            && record.num_votes.is_some_and(|votes| votes >= self.min_votes)
            && record.has_usable_rating()
    }
}

impl Default for TopNEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_TITLE_TYPE, DEFAULT_MIN_VOTES)
    }
}

impl Aggregator for TopNEngine {
    type Output = TopRanking;

    fn name(&self) -> &str {
        "TopNEngine"
    }

    fn aggregate(&self, records: &[MovieRecord]) -> TopRanking {
        let mut qualifying: Vec<&MovieRecord> =
            records.iter().filter(|r| self.qualifies(r)).collect();

        // `sort_by` is stable; NaN ratings were filtered out above
        qualifying.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
        let qualified = qualifying.len();
        qualifying.truncate(self.limit);

        let ranking: TopRanking = qualifying
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                (
                    i + 1,
                    RankedEntry {
                        title: record.primary_title.clone(),
                        average_rating: record.average_rating,
                        // qualifies() guarantees a vote count
                        num_votes: record.num_votes.unwrap_or_default(),
                        start_year: record.start_year,
                    },
                )
            })
            .collect();

        debug!(
            "{}: {} records, {} qualified, {} ranked",
            self.name(),
            records.len(),
            qualified,
            ranking.len()
        );
        ranking
    }
}

/// Rank the top `n` popular feature films with the default filter
pub fn compute_top_n(records: &[MovieRecord], n: usize) -> TopRanking {
    TopNEngine::default().with_limit(n).aggregate(records)
}
