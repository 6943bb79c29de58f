//! Error types for the data-loader crate.
//!
//! Every failure the ingestion path can hit is one variant of
//! [`DataLoadError`]. Variants only carry owned strings and integers so the
//! error can be cloned into [`IngestionStatus`](crate::IngestionStatus) and
//! handed to any number of readers.

use thiserror::Error;

/// Errors that can occur while fetching, decoding, and parsing the dataset
///
/// Rust concept: `#[derive(Error)]` from thiserror generates `Display` from the
/// `#[error(...)]` attributes and implements `std::error::Error` for us.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataLoadError {
    /// The stream could not be opened or was interrupted
    #[error("Network failure fetching {url}: {reason}")]
    Network { url: String, reason: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Payload bytes are not valid UTF-8
    #[error("Payload is not valid UTF-8 (valid up to byte {valid_up_to})")]
    Decode { valid_up_to: usize },

    /// Tabular structure could not be read
    #[error("Parse error at line {line}: {reason}")]
    Parse { line: u64, reason: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: u64,
        found: u64,
        line: u64,
    },

    /// Header row lacks a column the normalizer reads
    #[error("Header row is missing required column '{column}'")]
    MissingColumn { column: String },

    /// A numeric column held something that does not parse.
    ///
    /// Never fatal: the normalizer turns this into a marker value
    /// (`NaN` or `None`) and keeps going.
    #[error("Unusable value for {field}: {value:?}")]
    UnusableNumericField { field: String, value: String },
}

/// Coarse classification of [`DataLoadError`] used by callers that only need
/// to branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkFailure,
    DecodeFailure,
    ParseFailure,
    UnusableNumericField,
}

impl DataLoadError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataLoadError::Network { .. } | DataLoadError::HttpStatus { .. } => {
                ErrorKind::NetworkFailure
            }
            DataLoadError::Decode { .. } => ErrorKind::DecodeFailure,
            DataLoadError::Parse { .. }
            | DataLoadError::FieldCountMismatch { .. }
            | DataLoadError::MissingColumn { .. } => ErrorKind::ParseFailure,
            DataLoadError::UnusableNumericField { .. } => ErrorKind::UnusableNumericField,
        }
    }

    /// Whether this error aborts an ingestion
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::UnusableNumericField
    }
}

/// Convert csv errors, keeping line information where the reader has it
impl From<csv::Error> for DataLoadError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line()).unwrap_or(0);
        match err.kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => DataLoadError::FieldCountMismatch {
                expected: *expected_len,
                found: *len,
                line: pos.as_ref().map(|p| p.line()).unwrap_or(line),
            },
            csv::ErrorKind::Utf8 { err, .. } => DataLoadError::Decode {
                valid_up_to: err.valid_up_to(),
            },
            _ => DataLoadError::Parse {
                line,
                reason: err.to_string(),
            },
        }
    }
}

/// Type alias for Results in this crate
///
/// Rust concept: Type aliases reduce repetition
/// Instead of writing `std::result::Result<T, DataLoadError>` everywhere,
/// we can just write `Result<T>`
pub type Result<T> = std::result::Result<T, DataLoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let network = DataLoadError::HttpStatus {
            url: "http://example.test/data.tsv".to_string(),
            status: 503,
        };
        assert_eq!(network.kind(), ErrorKind::NetworkFailure);
        assert!(network.is_fatal());

        let mismatch = DataLoadError::FieldCountMismatch {
            expected: 11,
            found: 3,
            line: 7,
        };
        assert_eq!(mismatch.kind(), ErrorKind::ParseFailure);

        let unusable = DataLoadError::UnusableNumericField {
            field: "numVotes".to_string(),
            value: "many".to_string(),
        };
        assert_eq!(unusable.kind(), ErrorKind::UnusableNumericField);
        assert!(!unusable.is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = DataLoadError::MissingColumn {
            column: "tconst".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Header row is missing required column 'tconst'"
        );

        let err = DataLoadError::Decode { valid_up_to: 42 };
        assert!(err.to_string().contains("42"));
    }
}
