//! Error types for the fitlog_core library.

use std::fmt;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workout log text was rejected by the parser
    #[error("Validation error: {0}")]
    Validation(#[from] ParseError),

    /// Unknown owner or user
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identity already registered
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Record store failure not covered by a more specific variant
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the caller may retry the operation unchanged.
    ///
    /// Only store-side failures qualify. Bad input, unknown owners and
    /// duplicate registrations fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Csv(_) | Error::Store(_))
    }
}

/// A workout log block that failed validation.
///
/// `group` is the 1-based detail group being read when parsing stopped and
/// `line` the 1-based position of the offending line among the non-empty
/// lines of the whole input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("group {group}, line {line}: {kind}")]
pub struct ParseError {
    pub group: usize,
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// Reason a workout log was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("no workout groups found")]
    Empty,

    #[error("expected a line starting with '{marker}', found {found:?}")]
    MissingMarker { marker: char, found: String },

    #[error("category must be followed by 4 detail lines, found {found}")]
    IncompleteGroup { found: usize },

    #[error("{0} is empty")]
    EmptyField(Field),

    #[error("{field} {value:?} is not a number")]
    InvalidNumber { field: Field, value: String },

    #[error("expected '<N> sets <M> reps', found {0:?}")]
    InvalidSetsReps(String),

    #[error("{field} must not be negative, found {value}")]
    Negative { field: Field, value: f64 },
}

/// The field a parse failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Category,
    Name,
    Sets,
    Reps,
    Weight,
    Duration,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Category => "category",
            Field::Name => "exercise name",
            Field::Sets => "sets",
            Field::Reps => "reps",
            Field::Weight => "weight",
            Field::Duration => "duration",
        };
        f.write_str(name)
    }
}
