//! Parser for the tab-separated title dataset.
//!
//! Two layers live here:
//! - the record normalizer, a pure function from one raw row to a
//!   [`MovieRecord`]
//! - [`parse_movies`], which reads decoded TSV text with a header row and
//!   normalizes every data row, in order
//!
//! Rust concepts you'll learn here:
//! - Borrowed views (`RawFields<'a>`) over parsed rows, no copying
//! - The `FromStr` trait for generic numeric parsing
//! - Order-preserving parallel maps with Rayon

use crate::error::{DataLoadError, Result};
use crate::types::*;
use csv::StringRecord;
use rayon::prelude::*;
use std::str::FromStr;

/// Literal the dataset uses for "value not recorded"
pub const MISSING: &str = "\\N";

/// Columns the normalizer reads, in [`RawFields`] order
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "tconst",
    "titleType",
    "primaryTitle",
    "originalTitle",
    "isAdult",
    "startYear",
    "endYear",
    "runtimeMinutes",
    "genres",
    "averageRating",
    "numVotes",
];

// =============================================================================
// Record normalizer
// =============================================================================

/// One raw row, already split into the columns the normalizer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub tconst: &'a str,
    pub title_type: &'a str,
    pub primary_title: &'a str,
    pub original_title: &'a str,
    pub is_adult: &'a str,
    pub start_year: &'a str,
    pub end_year: &'a str,
    pub runtime_minutes: &'a str,
    pub genres: &'a str,
    pub average_rating: &'a str,
    pub num_votes: &'a str,
}

/// Normalize one raw row into a canonical record.
///
/// Unparseable numeric fields become marker values (`NaN` rating, `None`
/// for the rest). Use [`normalize_with_issues`] to see which ones.
pub fn normalize(fields: &RawFields<'_>) -> MovieRecord {
    normalize_with_issues(fields).0
}

/// Same as [`normalize`], also returning one
/// [`DataLoadError::UnusableNumericField`] per field that did not parse.
pub fn normalize_with_issues(fields: &RawFields<'_>) -> (MovieRecord, Vec<DataLoadError>) {
    let mut issues = Vec::new();

    let mut optional = |field: &str, raw: &str| -> Option<u64> {
        parse_optional(field, raw).unwrap_or_else(|err| {
            issues.push(err);
            None
        })
    };
    let num_votes = optional("numVotes", fields.num_votes);
    let start_year = optional("startYear", fields.start_year);
    let end_year = optional("endYear", fields.end_year);

    let runtime_minutes = parse_optional::<Minutes>("runtimeMinutes", fields.runtime_minutes)
        .unwrap_or_else(|err| {
            issues.push(err);
            None
        });

    // An unknown rating is NaN too, but it is not bad input
    let average_rating = if fields.average_rating == MISSING {
        f64::NAN
    } else {
        fields.average_rating.parse::<f64>().unwrap_or_else(|_| {
            issues.push(unusable("averageRating", fields.average_rating));
            f64::NAN
        })
    };

    let record = MovieRecord {
        id: fields.tconst.to_string(),
        title_type: fields.title_type.to_string(),
        primary_title: fields.primary_title.to_string(),
        original_title: fields.original_title.to_string(),
        is_adult: fields.is_adult == "1",
        start_year: narrow_year("startYear", fields.start_year, start_year, &mut issues),
        end_year: narrow_year("endYear", fields.end_year, end_year, &mut issues),
        runtime_minutes,
        genres: parse_genres(fields.genres),
        average_rating,
        num_votes,
    };

    (record, issues)
}

/// Parse a numeric column that may hold the missing-value sentinel
///
/// Example: "\N" -> Ok(None)
///          "1994" -> Ok(Some(1994))
///          "n/a" -> Err(UnusableNumericField)
pub fn parse_optional<T: FromStr>(field: &str, raw: &str) -> Result<Option<T>> {
    if raw == MISSING {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| unusable(field, raw))
}

/// Split the comma-separated genre list
///
/// Example: "Action,Drama" -> vec!["Action", "Drama"]
///          "\N" -> vec![]
pub fn parse_genres(raw: &str) -> Vec<String> {
    if raw == MISSING {
        return Vec::new();
    }
    raw.split(',')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn narrow_year(
    field: &str,
    raw: &str,
    parsed: Option<u64>,
    issues: &mut Vec<DataLoadError>,
) -> Option<Year> {
    let value = parsed?;
    match Year::try_from(value) {
        Ok(year) => Some(year),
        Err(_) => {
            issues.push(unusable(field, raw));
            None
        }
    }
}

fn unusable(field: &str, raw: &str) -> DataLoadError {
    DataLoadError::UnusableNumericField {
        field: field.to_string(),
        value: raw.to_string(),
    }
}

// =============================================================================
// Tabular parsing
// =============================================================================

/// Header positions of the required columns
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    positions: [usize; REQUIRED_COLUMNS.len()],
}

impl ColumnMap {
    /// Resolve every required column against the header row.
    ///
    /// Extra columns are ignored; column order does not matter.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DataLoadError::MissingColumn {
                    column: column.to_string(),
                })?;
        }
        Ok(Self { positions })
    }

    /// Borrow the required fields out of one row
    ///
    /// Rows were length-checked against the header by the reader, so every
    /// position is in bounds; a short row still degrades to empty strings.
    pub fn fields<'r>(&self, row: &'r StringRecord) -> RawFields<'r> {
        let get = |i: usize| row.get(self.positions[i]).unwrap_or("");
        RawFields {
            tconst: get(0),
            title_type: get(1),
            primary_title: get(2),
            original_title: get(3),
            is_adult: get(4),
            start_year: get(5),
            end_year: get(6),
            runtime_minutes: get(7),
            genres: get(8),
            average_rating: get(9),
            num_votes: get(10),
        }
    }
}

/// Result of parsing a whole payload
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMovies {
    /// Records in payload row order
    pub records: Vec<MovieRecord>,
    /// Count of numeric fields that did not parse across all rows
    pub unusable_fields: usize,
}

/// Parse decoded TSV text (header row first) into canonical records
///
/// Quoting is disabled: titles may contain `"` and the format never escapes
/// tabs or newlines inside a field.
pub fn parse_movies(text: &str) -> Result<ParsedMovies> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()?;

    // `collect` on an indexed parallel iterator keeps the input order
    let normalized: Vec<(MovieRecord, usize)> = rows
        .par_iter()
        .map(|row| {
            let (record, issues) = normalize_with_issues(&columns.fields(row));
            (record, issues.len())
        })
        .collect();

    let unusable_fields = normalized.iter().map(|(_, n)| n).sum();
    let records = normalized.into_iter().map(|(record, _)| record).collect();

    Ok(ParsedMovies {
        records,
        unusable_fields,
    })
}
