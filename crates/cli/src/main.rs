use aggregates::{GenreAverages, TopNEngine, TopRanking, YearlyRuntimes};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dashboard::Dashboard;
use data_loader::{IngestConfig, Year};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::time::{Duration, Instant};

/// ReelStats - rating and runtime statistics for the title dataset
#[derive(Parser)]
#[command(name = "reel-stats")]
#[command(about = "Rating and runtime statistics over a streamed title dataset", long_about = None)]
struct Cli {
    /// URL of the tab-separated dataset
    #[arg(
        short,
        long,
        env = "REEL_STATS_URL",
        default_value = "http://localhost:8000/api/AllMovies.tsv"
    )]
    url: String,

    /// Abort the download after this many seconds
    #[arg(long, env = "REEL_STATS_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Print JSON instead of formatted tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show record count and load status
    Summary,

    /// Average rating per genre, best first
    Genres {
        /// Only show this many genres
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Runtime average/min/max per release year
    Runtimes {
        /// First year to show
        #[arg(long)]
        from: Option<Year>,

        /// Last year to show
        #[arg(long)]
        to: Option<Year>,
    },

    /// Highest-rated popular titles
    Top {
        /// Number of titles to rank
        #[arg(long, default_value = "100")]
        limit: usize,

        /// Minimum number of votes
        #[arg(long, default_value = "100000")]
        min_votes: u64,

        /// Title type to rank
        #[arg(long, default_value = "movie")]
        title_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = IngestConfig::new(cli.url.clone());
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let progress = if cli.json {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}%")?
                .progress_chars("#>-"),
        );
        bar
    };

    let mut dashboard = Dashboard::new(config)?.with_progress({
        let progress = progress.clone();
        move |pct| progress.set_position(u64::from(pct))
    });
    if let Commands::Top {
        limit,
        min_votes,
        title_type,
    } = &cli.command
    {
        dashboard =
            dashboard.with_top_engine(TopNEngine::new(*limit, title_type.clone(), *min_votes));
    }

    // Load the dataset (this may take a moment)
    let start = Instant::now();
    let outcome = dashboard.load().await;
    progress.finish_and_clear();

    if let Some(err) = &outcome.status.error {
        return Err(anyhow::Error::new(err.clone()))
            .with_context(|| format!("Failed to load dataset from {}", cli.url));
    }
    if !cli.json {
        println!(
            "{} Loaded {} records in {:?}",
            "✓".green(),
            outcome.records.len(),
            start.elapsed()
        );
    }

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Summary => handle_summary(&dashboard, cli.json),
        Commands::Genres { limit } => handle_genres(&dashboard.genre_averages(), limit, cli.json),
        Commands::Runtimes { from, to } => {
            handle_runtimes(&dashboard.yearly_runtimes(), from, to, cli.json)
        }
        Commands::Top { .. } => handle_top(&dashboard.top_movies(), cli.json),
    }
}

/// Handle the 'summary' command
fn handle_summary(dashboard: &Dashboard, as_json: bool) -> Result<()> {
    let status = dashboard.status();
    let records = dashboard.store().len();

    if as_json {
        let value = json!({
            "records": records,
            "isLoading": status.is_loading,
            "progressPercent": status.progress_percent,
            "error": status.error.map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Dataset summary".bold().blue());
    println!("{}Records: {}", "• ".green(), records);
    println!("{}Progress: {}%", "• ".green(), status.progress_percent);
    match status.error {
        Some(err) => println!("{}Error: {}", "• ".red(), err),
        None => println!("{}Status: {}", "• ".green(), "ready".green()),
    }
    Ok(())
}

/// Handle the 'genres' command
fn handle_genres(genres: &GenreAverages, limit: Option<usize>, as_json: bool) -> Result<()> {
    // Sort by average rating, best first
    let mut rows: Vec<_> = genres.iter().collect();
    rows.sort_by(|a, b| b.1.average.total_cmp(&a.1.average));
    rows.truncate(limit.unwrap_or(rows.len()));

    if as_json {
        let value: Vec<_> = rows
            .iter()
            .map(|(genre, agg)| {
                json!({
                    "genre": genre,
                    "average": agg.average,
                    "amount": agg.amount,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Average rating by genre:".bold().blue());
    for (genre, agg) in rows {
        println!("  {:<14} {:>5.2}  ({} titles)", genre, agg.average, agg.amount);
    }
    Ok(())
}

/// Handle the 'runtimes' command
fn handle_runtimes(
    years: &YearlyRuntimes,
    from: Option<Year>,
    to: Option<Year>,
    as_json: bool,
) -> Result<()> {
    let from = from.unwrap_or(Year::MIN);
    let to = to.unwrap_or(Year::MAX);
    if from > to {
        return Err(anyhow!("--from {} is after --to {}", from, to));
    }
    let rows = years.range(from..=to);

    if as_json {
        let value: Vec<_> = rows
            .map(|(year, agg)| {
                json!({
                    "year": year,
                    "average": agg.average,
                    "min": agg.min,
                    "max": agg.max,
                    "count": agg.runtimes.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Runtime by release year (minutes):".bold().blue());
    for (year, agg) in rows {
        println!(
            "  {}  avg {:>6.1}  min {:>5}  max {:>5}  ({} titles)",
            year.to_string().green(),
            agg.average,
            agg.min,
            agg.max,
            agg.runtimes.len()
        );
    }
    Ok(())
}

/// Handle the 'top' command
fn handle_top(ranking: &TopRanking, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(ranking)?);
        return Ok(());
    }

    println!("{}", "Top rated titles:".bold().blue());
    for (rank, entry) in ranking {
        println!(
            "{}. {} ({}) - {:.1} [{} votes]",
            rank.to_string().green(),
            entry.title,
            entry
                .start_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "????".to_string()),
            entry.average_rating,
            entry.num_votes
        );
    }
    Ok(())
}
