//! # Data Loader Crate
//!
//! This crate fetches the tab-separated title-ratings dataset over HTTP and
//! turns it into an in-memory collection of canonical records.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MovieRecord, IngestionStatus)
//! - **parser**: Record normalizer and TSV parsing
//! - **ingest**: Streaming fetch with byte-level progress
//! - **store**: The record store (single writer, many readers)
//! - **config**: Where and how to fetch
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{IngestConfig, MovieStore, StreamingIngestor};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MovieStore::new());
//! let ingestor = StreamingIngestor::new(IngestConfig::new(url), store.clone())?;
//!
//! let outcome = ingestor.ingest().await;
//! if let Some(err) = &outcome.status.error {
//!     eprintln!("load failed: {err}");
//! }
//! println!("{} records", store.len());
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod ingest;
pub mod parser;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use config::IngestConfig;
pub use error::{DataLoadError, ErrorKind, Result};
pub use ingest::{IngestOutcome, ProgressTracker, StreamingIngestor};
pub use parser::{MISSING, ParsedMovies, RawFields, normalize, parse_movies};
pub use store::MovieStore;
pub use types::{
    // Type aliases
    Minutes,
    Year,
    // Core types
    IngestionStatus,
    MovieRecord,
};
