//! Per-genre rating averages.
//!
//! A record with N genre tags contributes its full rating to N separate
//! aggregates; ratings are not split across tags.

use crate::traits::Aggregator;
use data_loader::MovieRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Rating summary for one genre tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreAggregate {
    /// `sum / amount`
    pub average: f64,
    /// Number of contributing records
    pub amount: usize,
    /// Contributing ratings in record order
    pub ratings: Vec<f64>,
}

/// Genre tag -> aggregate, sorted by tag
pub type GenreAverages = BTreeMap<String, GenreAggregate>;

/// Computes [`GenreAverages`].
///
/// ## Algorithm
/// For each record with a usable rating:
/// 1. For each of its genre tags, add the rating to that tag's sum
/// 2. Append the rating to that tag's series
///
/// Then divide each sum by its count. Tags only appear once something
/// contributed to them; records whose rating did not parse are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenreAverageEngine;

impl Aggregator for GenreAverageEngine {
    type Output = GenreAverages;

    fn name(&self) -> &str {
        "GenreAverageEngine"
    }

    fn aggregate(&self, records: &[MovieRecord]) -> GenreAverages {
        let mut sums: BTreeMap<&str, (f64, Vec<f64>)> = BTreeMap::new();
        let mut skipped = 0usize;

        for record in records {
            if !record.has_usable_rating() {
                skipped += 1;
                continue;
            }
            for genre in &record.genres {
                let (sum, ratings) = sums.entry(genre.as_str()).or_default();
                *sum += record.average_rating;
                ratings.push(record.average_rating);
            }
        }

        let averages: GenreAverages = sums
            .into_iter()
            .map(|(genre, (sum, ratings))| {
                let amount = ratings.len();
                (
                    genre.to_string(),
                    GenreAggregate {
                        average: sum / amount as f64,
                        amount,
                        ratings,
                    },
                )
            })
            .collect();

        debug!(
            "{}: {} records -> {} genres ({} skipped, unusable rating)",
            self.name(),
            records.len(),
            averages.len(),
            skipped
        );
        averages
    }
}

/// Compute per-genre averages over the whole collection
pub fn compute_genre_averages(records: &[MovieRecord]) -> GenreAverages {
    GenreAverageEngine.aggregate(records)
}
