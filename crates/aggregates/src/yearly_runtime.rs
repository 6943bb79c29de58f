//! Per-year runtime statistics.

use crate::traits::Aggregator;
use data_loader::{MovieRecord, Year};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Runtime summary for one release year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyRuntimeAggregate {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Runtimes in record order
    pub runtimes: Vec<f64>,
}

impl YearlyRuntimeAggregate {
    /// Start a bucket from its first runtime
    ///
    /// min/max are seeded from the value itself, never from zero.
    fn seeded(runtime: f64) -> Self {
        Self {
            average: runtime,
            min: runtime,
            max: runtime,
            runtimes: vec![runtime],
        }
    }

    fn push(&mut self, runtime: f64) {
        self.min = self.min.min(runtime);
        self.max = self.max.max(runtime);
        self.runtimes.push(runtime);
    }
}

/// Release year -> aggregate, in ascending year order
pub type YearlyRuntimes = BTreeMap<Year, YearlyRuntimeAggregate>;

/// Computes [`YearlyRuntimes`].
///
/// Records without a start year are skipped entirely. Records with a year but
/// no runtime are skipped for this view only; a year whose records all lack a
/// runtime gets no bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct YearlyRuntimeEngine;

impl Aggregator for YearlyRuntimeEngine {
    type Output = YearlyRuntimes;

    fn name(&self) -> &str {
        "YearlyRuntimeEngine"
    }

    fn aggregate(&self, records: &[MovieRecord]) -> YearlyRuntimes {
        let mut years = YearlyRuntimes::new();

        for record in records {
            let (Some(year), Some(runtime)) = (record.start_year, record.runtime_minutes) else {
                continue;
            };
            let runtime = f64::from(runtime);
            years
                .entry(year)
                .and_modify(|bucket| bucket.push(runtime))
                .or_insert_with(|| YearlyRuntimeAggregate::seeded(runtime));
        }

        for bucket in years.values_mut() {
            let total: f64 = bucket.runtimes.iter().sum();
            bucket.average = total / bucket.runtimes.len() as f64;
        }

        debug!(
            "{}: {} records -> {} years",
            self.name(),
            records.len(),
            years.len()
        );
        years
    }
}

/// Compute runtime statistics per release year
pub fn compute_yearly_runtime_stats(records: &[MovieRecord]) -> YearlyRuntimes {
    YearlyRuntimeEngine.aggregate(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::movie;

    #[test]
    fn test_average_min_max() {
        let records = vec![
            movie("A", 7.0).year(2000).runtime(90).build(),
            movie("B", 7.0).year(2000).runtime(120).build(),
            movie("C", 7.0).year(2000).runtime(60).build(),
        ];

        let years = compute_yearly_runtime_stats(&records);
        let bucket = &years[&2000];

        assert_eq!(bucket.average, 90.0);
        assert_eq!(bucket.min, 60.0);
        assert_eq!(bucket.max, 120.0);
        assert_eq!(bucket.runtimes, vec![90.0, 120.0, 60.0]);
    }

    #[test]
    fn test_missing_year_creates_no_bucket() {
        let records = vec![
            movie("A", 7.0).runtime(100).build(),
            movie("B", 7.0).year(1999).runtime(80).build(),
        ];

        let years = compute_yearly_runtime_stats(&records);

        assert_eq!(years.len(), 1);
        assert_eq!(years[&1999].runtimes, vec![80.0]);
    }

    #[test]
    fn test_missing_runtime_is_skipped() {
        let records = vec![
            movie("A", 7.0).year(2010).build(),
            movie("B", 7.0).year(2010).runtime(100).build(),
            movie("C", 7.0).year(2011).build(),
        ];

        let years = compute_yearly_runtime_stats(&records);

        assert_eq!(years[&2010].runtimes, vec![100.0]);
        assert_eq!(years[&2010].average, 100.0);
        assert!(!years.contains_key(&2011));
    }

    #[test]
    fn test_min_not_floored_at_zero() {
        let records = vec![
            movie("A", 7.0).year(1950).runtime(85).build(),
            movie("B", 7.0).year(1950).runtime(95).build(),
        ];
        let years = compute_yearly_runtime_stats(&records);
        assert_eq!(years[&1950].min, 85.0);

        let negative = vec![
            movie("A", 7.0).year(1900).runtime(-5).build(),
            movie("B", 7.0).year(1900).runtime(-2).build(),
        ];
        let years = compute_yearly_runtime_stats(&negative);
        assert_eq!(years[&1900].max, -2.0);
        assert_eq!(years[&1900].min, -5.0);
    }

    #[test]
    fn test_years_are_ascending() {
        let records = vec![
            movie("A", 7.0).year(2020).runtime(100).build(),
            movie("B", 7.0).year(1920).runtime(60).build(),
            movie("C", 7.0).year(1970).runtime(110).build(),
        ];
        let years: Vec<Year> = compute_yearly_runtime_stats(&records).into_keys().collect();
        assert_eq!(years, vec![1920, 1970, 2020]);
    }
}
