//! Streaming ingestion of the dataset.
//!
//! Fetches the payload chunk by chunk so progress can be reported against the
//! declared `Content-Length`, then decodes, parses and normalizes it and
//! replaces the store's record collection in one step.
//!
//! Failures never escape [`StreamingIngestor::ingest`]: they end up in
//! [`IngestionStatus::error`] and the loading state is always closed.
//!
//! ## Known limitation
//! There is no cancellation. Starting a second ingestion while one is in
//! flight resets the status; both will eventually publish.

use crate::config::IngestConfig;
use crate::error::{DataLoadError, Result};
use crate::parser::{self, ParsedMovies};
use crate::store::MovieStore;
use crate::types::{IngestionStatus, MovieRecord};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Callback receiving progress percentages as they change
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// The `(records, finalStatus)` pair of one ingestion run
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Store contents after the run; unchanged from before if the run failed
    pub records: Arc<Vec<MovieRecord>>,
    pub status: IngestionStatus,
}

impl IngestOutcome {
    pub fn is_success(&self) -> bool {
        self.status.error.is_none()
    }
}

/// Fetches the dataset and publishes it into a [`MovieStore`].
///
/// ## Usage
/// ```ignore
/// let store = Arc::new(MovieStore::new());
/// let ingestor = StreamingIngestor::new(IngestConfig::new(url), store.clone())?
///     .with_progress(|pct| println!("{pct}%"));
/// let outcome = ingestor.ingest().await;
/// ```
#[derive(Clone)]
pub struct StreamingIngestor {
    client: reqwest::Client,
    config: IngestConfig,
    store: Arc<MovieStore>,
    on_progress: Option<ProgressCallback>,
}

impl fmt::Debug for StreamingIngestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingIngestor")
            .field("config", &self.config)
            .field("has_progress_callback", &self.on_progress.is_some())
            .finish()
    }
}

impl StreamingIngestor {
    /// Build an ingestor with its own HTTP client
    pub fn new(config: IngestConfig, store: Arc<MovieStore>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| DataLoadError::Network {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            config,
            store,
            on_progress: None,
        })
    }

    /// Register a progress callback (builder pattern).
    ///
    /// Called with each new percentage; repeated values are not reported.
    pub fn with_progress(mut self, callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Fetch the configured URL and publish its records
    pub async fn ingest(&self) -> IngestOutcome {
        self.store.begin_loading();
        let mut progress = ProgressTracker::new(None);
        let started = Instant::now();
        info!("Fetching dataset from {}", self.config.url);

        let result = match self.open().await {
            Ok(response) => {
                progress = ProgressTracker::new(response.content_length());
                self.read_payload(response.bytes_stream(), &mut progress)
                    .await
            }
            Err(err) => Err(err),
        };

        self.complete(result, &mut progress, started)
    }

    /// Publish records read from an already-open byte stream.
    ///
    /// `total_len` plays the role of `Content-Length`; `None` (or zero)
    /// leaves progress at 0 until the stream ends.
    pub async fn ingest_stream<S, E>(&self, stream: S, total_len: Option<u64>) -> IngestOutcome
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: fmt::Display,
    {
        self.store.begin_loading();
        let mut progress = ProgressTracker::new(total_len);
        let started = Instant::now();

        let result = self.read_payload(stream, &mut progress).await;
        self.complete(result, &mut progress, started)
    }

    /// Send the request and reject non-success statuses
    async fn open(&self) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        if !response.status().is_success() {
            return Err(DataLoadError::HttpStatus {
                url: self.config.url.clone(),
                status: response.status().as_u16(),
            });
        }

        match response.content_length() {
            Some(len) => debug!("Declared content length: {} bytes", len),
            None => debug!("No content length declared, progress unavailable until done"),
        }
        Ok(response)
    }

    /// Drain the stream, decode, and parse
    async fn read_payload<S, E>(
        &self,
        stream: S,
        progress: &mut ProgressTracker,
    ) -> Result<ParsedMovies>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: fmt::Display,
    {
        let mut stream = std::pin::pin!(stream);
        let mut chunks: Vec<Bytes> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.network_error(e))?;
            if let Some(percent) = progress.advance(chunk.len()) {
                self.report(percent);
            }
            chunks.push(chunk);
        }

        // Reassemble in arrival order
        let mut payload = Vec::with_capacity(progress.received() as usize);
        for chunk in &chunks {
            payload.extend_from_slice(chunk);
        }
        drop(chunks);

        let text = String::from_utf8(payload).map_err(|e| DataLoadError::Decode {
            valid_up_to: e.utf8_error().valid_up_to(),
        })?;

        // Parsing is CPU-bound, keep it off the async workers
        tokio::task::spawn_blocking(move || parser::parse_movies(&text))
            .await
            .map_err(|e| DataLoadError::Parse {
                line: 0,
                reason: format!("parser task failed: {e}"),
            })?
    }

    /// Publish on success, record the error otherwise, and close loading
    fn complete(
        &self,
        result: Result<ParsedMovies>,
        progress: &mut ProgressTracker,
        started: Instant,
    ) -> IngestOutcome {
        match result {
            Ok(parsed) => {
                if parsed.unusable_fields > 0 {
                    warn!(
                        "{} numeric fields could not be parsed and were marked unusable",
                        parsed.unusable_fields
                    );
                }
                info!(
                    "Ingested {} records ({} bytes) in {:.2?}",
                    parsed.records.len(),
                    progress.received(),
                    started.elapsed()
                );
                self.store.publish(parsed.records);
                self.store.finish(None);
            }
            Err(err) => {
                warn!("Ingestion from {} failed: {}", self.config.url, err);
                self.store.finish(Some(err));
            }
        }

        if let Some(percent) = progress.finish() {
            self.report(percent);
        }

        IngestOutcome {
            records: self.store.snapshot(),
            status: self.store.status(),
        }
    }

    fn report(&self, percent: u8) {
        self.store.set_progress(percent);
        if let Some(callback) = &self.on_progress {
            callback(percent);
        }
    }

    fn network_error(&self, err: impl fmt::Display) -> DataLoadError {
        DataLoadError::Network {
            url: self.config.url.clone(),
            reason: err.to_string(),
        }
    }
}

// =============================================================================
// Progress tracking
// =============================================================================

/// Byte counter that turns received/total into a percentage.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    total: Option<u64>,
    received: u64,
    last_reported: Option<u8>,
}

impl ProgressTracker {
    /// A zero total is treated as unknown
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total: total.filter(|&t| t > 0),
            received: 0,
            last_reported: None,
        }
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    /// Record `n` more bytes; returns the new percentage if it changed
    pub fn advance(&mut self, n: usize) -> Option<u8> {
        self.received += n as u64;
        let total = self.total?;
        let percent = ((self.received as f64 / total as f64) * 100.0)
            .round()
            .min(100.0) as u8;
        self.update(percent)
    }

    /// Force 100%; returns it unless it was already reported
    pub fn finish(&mut self) -> Option<u8> {
        self.update(100)
    }

    fn update(&mut self, percent: u8) -> Option<u8> {
        if self.last_reported == Some(percent) {
            return None;
        }
        self.last_reported = Some(percent);
        Some(percent)
    }
}
