//! # Dashboard
//!
//! Ties ingestion and the aggregation engines together:
//! 1. Ingest the dataset into the store
//! 2. On success, recompute genre averages (fire-and-forget from the
//!    ingestion's point of view)
//! 3. Compute yearly runtimes and the top-N ranking whenever a caller asks
//!
//! Every view is computed from one store snapshot taken after the atomic
//! replacement, never from a list that is still being built.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::Stream;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use aggregates::{
    Aggregator, GenreAverageEngine, GenreAverages, TopNEngine, TopRanking, YearlyRuntimeEngine,
    YearlyRuntimes,
};
use data_loader::{IngestConfig, IngestOutcome, IngestionStatus, MovieStore, StreamingIngestor};

/// The derived views a dashboard serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    GenreAverages,
    YearlyRuntimes,
    TopMovies,
}

/// "Calculating" flags, one per view
#[derive(Debug, Default)]
struct ViewFlags {
    genres: AtomicBool,
    runtimes: AtomicBool,
    top: AtomicBool,
}

impl ViewFlags {
    fn flag(&self, view: View) -> &AtomicBool {
        match view {
            View::GenreAverages => &self.genres,
            View::YearlyRuntimes => &self.runtimes,
            View::TopMovies => &self.top,
        }
    }
}

/// Sets a view's flag for as long as it lives, clears it on drop
struct Calculating<'a>(&'a AtomicBool);

impl<'a> Calculating<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for Calculating<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns the record store and the derived views built from it
pub struct Dashboard {
    store: Arc<MovieStore>,
    ingestor: StreamingIngestor,
    top_engine: TopNEngine,
    genre_averages: watch::Sender<Arc<GenreAverages>>,
    flags: ViewFlags,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("records", &self.store.len())
            .field("status", &self.store.status())
            .field("top_engine", &self.top_engine)
            .finish()
    }
}

impl Dashboard {
    /// Create a dashboard with an empty store
    ///
    /// # Arguments
    /// * `config` - Where to fetch the dataset from
    pub fn new(config: IngestConfig) -> Result<Self> {
        let store = Arc::new(MovieStore::new());
        let ingestor = StreamingIngestor::new(config, store.clone())
            .context("Failed to set up dataset ingestion")?;
        let (genre_averages, _) = watch::channel(Arc::new(GenreAverages::new()));

        Ok(Self {
            store,
            ingestor,
            top_engine: TopNEngine::default(),
            genre_averages,
            flags: ViewFlags::default(),
        })
    }

    /// Report ingestion progress to `callback` (builder pattern)
    pub fn with_progress(mut self, callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.ingestor = self.ingestor.with_progress(callback);
        self
    }

    /// Replace the default top-N filter (builder pattern)
    pub fn with_top_engine(mut self, engine: TopNEngine) -> Self {
        self.top_engine = engine;
        self
    }

    pub fn store(&self) -> &Arc<MovieStore> {
        &self.store
    }

    pub fn status(&self) -> IngestionStatus {
        self.store.status()
    }

    // =========================================================================
    // Ingestion
    // =========================================================================

    /// Fetch the dataset, then refresh genre averages if it loaded
    pub async fn load(&self) -> IngestOutcome {
        let outcome = self.ingestor.ingest().await;
        self.after_ingest(&outcome).await;
        outcome
    }

    /// Same as [`load`](Self::load) over an already-open byte stream
    pub async fn load_stream<S, E>(&self, stream: S, total_len: Option<u64>) -> IngestOutcome
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: fmt::Display,
    {
        let outcome = self.ingestor.ingest_stream(stream, total_len).await;
        self.after_ingest(&outcome).await;
        outcome
    }

    /// Runs once per ingestion, after the store has been replaced.
    ///
    /// A failing recompute is logged and does not change the ingestion outcome.
    async fn after_ingest(&self, outcome: &IngestOutcome) {
        if !outcome.is_success() {
            debug!("Ingestion failed, keeping previous genre averages");
            return;
        }
        if let Err(err) = self.recompute_genre_averages().await {
            warn!("Genre average recompute failed: {:#}", err);
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Recompute genre averages from the current snapshot and publish them
    pub async fn recompute_genre_averages(&self) -> Result<Arc<GenreAverages>> {
        let _calculating = Calculating::start(self.flags.flag(View::GenreAverages));
        let start_time = Instant::now();
        let records = self.store.snapshot();

        // CPU-bound pass over the whole collection
        let averages = tokio::task::spawn_blocking(move || GenreAverageEngine.aggregate(&records))
            .await
            .context("Genre average task panicked")?;
        let averages = Arc::new(averages);

        self.genre_averages.send_replace(averages.clone());
        info!(
            "Computed averages for {} genres in {:.2?}",
            averages.len(),
            start_time.elapsed()
        );
        Ok(averages)
    }

    /// Latest published genre averages (empty before the first load)
    pub fn genre_averages(&self) -> Arc<GenreAverages> {
        self.genre_averages.borrow().clone()
    }

    /// Watch genre average publications
    pub fn subscribe_genre_averages(&self) -> watch::Receiver<Arc<GenreAverages>> {
        self.genre_averages.subscribe()
    }

    /// Runtime statistics per year, computed now from the current snapshot
    pub fn yearly_runtimes(&self) -> YearlyRuntimes {
        let _calculating = Calculating::start(self.flags.flag(View::YearlyRuntimes));
        let records = self.store.snapshot();
        YearlyRuntimeEngine.aggregate(&records)
    }

    /// Top-ranked titles, computed now from the current snapshot
    pub fn top_movies(&self) -> TopRanking {
        let _calculating = Calculating::start(self.flags.flag(View::TopMovies));
        let records = self.store.snapshot();
        self.top_engine.aggregate(&records)
    }

    /// Whether a view is being recomputed right now
    pub fn is_calculating(&self, view: View) -> bool {
        self.flags.flag(view).load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    const PAYLOAD: &str = "\
tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres\taverageRating\tnumVotes
tt1\tmovie\tA\tA\t0\t2000\t\\N\t90\tAction,Drama\t8.0\t120000
tt2\tmovie\tB\tB\t0\t2000\t\\N\t120\tAction\t6.0\t99999
tt3\tmovie\tC\tC\t0\t2000\t\\N\t60\t\\N\t7.0\t500000
tt4\tshort\tD\tD\t0\t\\N\t\\N\t10\tShort\t9.0\t200000
";

    fn chunks(text: &str) -> Vec<std::result::Result<Bytes, io::Error>> {
        vec![Ok(Bytes::copy_from_slice(text.as_bytes()))]
    }

    fn test_dashboard() -> Dashboard {
        Dashboard::new(IngestConfig::new("memory://dashboard")).unwrap()
    }

    // ============================================================================
    // Tests
    // ============================================================================

    #[tokio::test]
    async fn test_load_triggers_genre_averages() {
        let dashboard = test_dashboard();
        assert!(dashboard.genre_averages().is_empty());

        let outcome = dashboard
            .load_stream(futures::stream::iter(chunks(PAYLOAD)), None)
            .await;

        assert!(outcome.is_success());
        let genres = dashboard.genre_averages();
        assert_eq!(genres["Action"].average, 7.0);
        assert_eq!(genres["Action"].amount, 2);
        assert_eq!(genres["Drama"].average, 8.0);
        assert_eq!(genres["Short"].amount, 1);
        assert!(!dashboard.is_calculating(View::GenreAverages));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_views() {
        let dashboard = test_dashboard();
        dashboard
            .load_stream(futures::stream::iter(chunks(PAYLOAD)), None)
            .await;
        let before = dashboard.genre_averages();

        let broken: Vec<std::result::Result<Bytes, io::Error>> =
            vec![Err(io::Error::other("stream reset"))];
        let outcome = dashboard
            .load_stream(futures::stream::iter(broken), None)
            .await;

        assert!(!outcome.is_success());
        assert!(!dashboard.status().is_loading);
        assert_eq!(dashboard.store().len(), 4);
        assert!(Arc::ptr_eq(&before, &dashboard.genre_averages()));
    }

    #[tokio::test]
    async fn test_on_demand_views_use_current_snapshot() {
        let dashboard = test_dashboard();
        assert!(dashboard.yearly_runtimes().is_empty());
        assert!(dashboard.top_movies().is_empty());

        dashboard
            .load_stream(futures::stream::iter(chunks(PAYLOAD)), None)
            .await;

        let years = dashboard.yearly_runtimes();
        assert_eq!(years.len(), 1);
        assert_eq!(years[&2000].average, 90.0);
        assert_eq!(years[&2000].min, 60.0);
        assert_eq!(years[&2000].max, 120.0);

        let top = dashboard.top_movies();
        let titles: Vec<&str> = top.values().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert!(!dashboard.is_calculating(View::TopMovies));
    }

    #[tokio::test]
    async fn test_custom_top_engine() {
        let dashboard = test_dashboard().with_top_engine(TopNEngine::new(1, "short", 0));
        dashboard
            .load_stream(futures::stream::iter(chunks(PAYLOAD)), None)
            .await;

        let top = dashboard.top_movies();
        assert_eq!(top.len(), 1);
        assert_eq!(top[&1].title, "D");
        assert_eq!(top[&1].start_year, None);
    }

    #[tokio::test]
    async fn test_subscribers_see_new_genre_averages() {
        let dashboard = test_dashboard();
        let mut rx = dashboard.subscribe_genre_averages();

        dashboard
            .load_stream(futures::stream::iter(chunks(PAYLOAD)), None)
            .await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().contains_key("Action"));
    }
}
