//! The movie record store.
//!
//! Single writer, many readers: only the
//! [`StreamingIngestor`](crate::StreamingIngestor) writes, everyone else takes
//! snapshots. Both the record list and the status sit behind
//! `tokio::sync::watch` senders, so a replacement is one atomic swap and
//! readers never see a half-built list.

use crate::error::DataLoadError;
use crate::types::{IngestionStatus, MovieRecord};
use std::sync::Arc;
use tokio::sync::watch;

/// Owns the canonical record collection and the ingestion status.
///
/// Rust concepts:
/// - `Arc<Vec<MovieRecord>>` lets readers keep a snapshot alive after the
///   store has moved on to a newer one
/// - Interior mutability through `watch::Sender` means writers only need `&self`
#[derive(Debug)]
pub struct MovieStore {
    records: watch::Sender<Arc<Vec<MovieRecord>>>,
    status: watch::Sender<IngestionStatus>,
}

impl MovieStore {
    /// Creates an empty store with idle status
    pub fn new() -> Self {
        let (records, _) = watch::channel(Arc::new(Vec::new()));
        let (status, _) = watch::channel(IngestionStatus::default());
        Self { records, status }
    }

    /// Current record collection
    pub fn snapshot(&self) -> Arc<Vec<MovieRecord>> {
        self.records.borrow().clone()
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current ingestion status
    pub fn status(&self) -> IngestionStatus {
        self.status.borrow().clone()
    }

    /// Watch status changes (progress updates, completion)
    pub fn subscribe(&self) -> watch::Receiver<IngestionStatus> {
        self.status.subscribe()
    }

    // Writer side. Crate-private: the ingestor is the only writer.

    pub(crate) fn begin_loading(&self) {
        self.status.send_replace(IngestionStatus::loading());
    }

    pub(crate) fn set_progress(&self, percent: u8) {
        self.status.send_if_modified(|status| {
            if status.progress_percent == percent {
                return false;
            }
            status.progress_percent = percent;
            true
        });
    }

    pub(crate) fn publish(&self, records: Vec<MovieRecord>) {
        self.records.send_replace(Arc::new(records));
    }

    pub(crate) fn finish(&self, error: Option<DataLoadError>) {
        self.status.send_replace(IngestionStatus::finished(error));
    }
}

impl Default for MovieStore {
    fn default() -> Self {
        Self::new()
    }
}
