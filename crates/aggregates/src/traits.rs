//! Core trait for the aggregation engines.
//!
//! Every engine is a pure function from the full record collection to a
//! fresh summary. There is no incremental path: when the store changes, the
//! old summary is discarded and the engine runs again.

use data_loader::MovieRecord;

/// A full-recompute aggregation over the record collection.
///
/// ## Design Note
/// - `Send + Sync` so engines can be moved into blocking tasks
/// - Input is borrowed for the duration of the call only; the output owns
///   everything it holds and keeps no reference back into the records
pub trait Aggregator: Send + Sync {
    /// What one pass produces
    type Output;

    /// Returns the name of this engine (for logging/debugging)
    fn name(&self) -> &str;

    /// Compute the summary from scratch
    fn aggregate(&self, records: &[MovieRecord]) -> Self::Output;
}
