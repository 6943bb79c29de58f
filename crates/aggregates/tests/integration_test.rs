//! Integration tests for the aggregation engines.
//!
//! These tests parse a small TSV payload with the data-loader and run every
//! engine over the same snapshot, the way the dashboard does.

use aggregates::*;
use data_loader::{MovieRecord, parse_movies};

const PAYLOAD: &str = "\
tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres\taverageRating\tnumVotes
tt0111161\tmovie\tThe Shawshank Redemption\tThe Shawshank Redemption\t0\t1994\t\\N\t142\tDrama\t9.3\t2900000
tt0068646\tmovie\tThe Godfather\tThe Godfather\t0\t1972\t\\N\t175\tCrime,Drama\t9.2\t2000000
tt0110912\tmovie\tPulp Fiction\tPulp Fiction\t0\t1994\t\\N\t154\tCrime,Drama\t8.9\t2200000
tt0109830\tmovie\tForrest Gump\tForrest Gump\t0\t1994\t\\N\t142\tDrama,Romance\t8.8\t2300000
tt0000001\tshort\tCarmencita\tCarmencita\t0\t1894\t\\N\t1\tDocumentary,Short\t5.7\t2100
tt9000001\tmovie\tObscure Indie\tObscure Indie\t0\t1994\t\\N\t\\N\tDrama\t9.9\t150
tt9000002\ttvSeries\tSome Show\tSome Show\t0\t\\N\t\\N\t45\tComedy\tn/a\t400000
";

fn load() -> Vec<MovieRecord> {
    parse_movies(PAYLOAD).unwrap().records
}

#[test]
fn test_genre_averages_over_parsed_payload() {
    let records = load();
    let genres = compute_genre_averages(&records);

    let drama = &genres["Drama"];
    assert_eq!(drama.amount, 5);
    let expected = (9.3 + 9.2 + 8.9 + 8.8 + 9.9) / 5.0;
    assert!((drama.average - expected).abs() < 1e-9);

    assert_eq!(genres["Crime"].amount, 2);
    assert_eq!(genres["Short"].ratings, vec![5.7]);
    // the series has an unparseable rating and must not poison Comedy
    assert!(!genres.contains_key("Comedy"));
}

#[test]
fn test_yearly_runtimes_over_parsed_payload() {
    let records = load();
    let years = compute_yearly_runtime_stats(&records);

    let keys: Vec<u16> = years.keys().copied().collect();
    assert_eq!(keys, vec![1894, 1972, 1994]);

    let nineties = &years[&1994];
    // the indie has no runtime and is left out
    assert_eq!(nineties.runtimes, vec![142.0, 154.0, 142.0]);
    assert_eq!(nineties.min, 142.0);
    assert_eq!(nineties.max, 154.0);
    assert!((nineties.average - 146.0).abs() < 1e-9);
}

#[test]
fn test_top_n_over_parsed_payload() {
    let records = load();
    let top = compute_top_n(&records, 3);

    let titles: Vec<&str> = top.values().map(|e| e.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["The Shawshank Redemption", "The Godfather", "Pulp Fiction"]
    );
    assert_eq!(top[&1].num_votes, 2_900_000);
    assert_eq!(top[&3].start_year, Some(1994));
}

#[test]
fn test_engines_do_not_touch_records() {
    let records = load();
    let before = records.clone();

    let _ = GenreAverageEngine.aggregate(&records);
    let _ = YearlyRuntimeEngine.aggregate(&records);
    let _ = TopNEngine::default().aggregate(&records);

    // NaN != NaN, so compare the debug form
    assert_eq!(format!("{before:?}"), format!("{records:?}"));
}

#[test]
fn test_recompute_reflects_new_snapshot() {
    let mut records = load();
    let first = compute_top_n(&records, 100);

    records.retain(|r| r.primary_title != "The Shawshank Redemption");
    let second = compute_top_n(&records, 100);

    assert_eq!(first.len(), 4);
    assert_eq!(second.len(), 3);
    assert_eq!(second[&1].title, "The Godfather");
}
