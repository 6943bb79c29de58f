use data_loader::{IngestConfig, MovieStore, StreamingIngestor};
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8000/AllMovies.tsv".to_string());

    println!("Loading dataset from {url}...\n");

    let store = Arc::new(MovieStore::new());
    let ingestor = StreamingIngestor::new(IngestConfig::new(url), store.clone())
        .expect("Failed to build HTTP client");

    let start = Instant::now();
    let outcome = ingestor.ingest().await;
    let elapsed = start.elapsed();

    if let Some(err) = outcome.status.error {
        eprintln!("Load failed: {err}");
        std::process::exit(1);
    }

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Records: {}", outcome.records.len());
    println!(
        "\nPerformance: {:.0} records/second",
        outcome.records.len() as f64 / elapsed.as_secs_f64()
    );
}
