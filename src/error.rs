//! Error types for dwh-dumper
//!
//! This module provides error handling for the library, including:
//! - A crate-wide [`Error`] type and [`Result`] alias
//! - Usage errors raised before or during extraction for operator mistakes
//! - Handle acquisition and capability errors
//!
//! Task-level failures never unwind past the scheduler: the run context
//! catches them and records a `Failed` task result instead (see
//! [`crate::task::TaskRunContext`]).

use thiserror::Error;

/// Result type alias for dwh-dumper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for dwh-dumper
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output_dir")
        key: Option<String>,
    },

    /// Operator mistake detected before or during extraction
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),

    /// Handle acquisition or capability error
    #[error("handle error: {0}")]
    Handle(#[from] HandleError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A task failed; wraps the underlying cause with the artifact it owns
    #[error("task '{target_path}' failed: {source}")]
    Task {
        /// Target path of the artifact the failing task owns
        target_path: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap this error as the failure of the task owning `target_path`.
    pub(crate) fn into_task_failure(self, target_path: &str) -> Self {
        Error::Task {
            target_path: target_path.to_string(),
            source: Box::new(self),
        }
    }

    /// Render the full cause chain, one cause per line.
    ///
    /// Used for the `<target>.exception.txt` diagnostic artifact.
    pub fn render_chain(&self) -> String {
        use std::error::Error as _;
        let mut out = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            out.push_str("\ncaused by: ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}

/// Usage errors: operator mistakes that abort a run or fail a task with an
/// actionable message
#[derive(Debug, Error)]
pub enum UsageError {
    /// A declared header does not match the shape of the query result
    #[error(
        "result set does not have the expected column count: expected {expected}, actual {actual}. \
         If a custom query has been specified, please confirm the selected columns match the \
         following: {declared}"
    )]
    ColumnCountMismatch {
        /// Number of columns the header declares
        expected: usize,
        /// Number of columns the result actually has
        actual: usize,
        /// The declared column names, comma-separated
        declared: String,
    },

    /// Start date given without an end date
    #[error("end date must be specified with start date, but was missing")]
    EndDateMissing,

    /// End date given without a start date
    #[error("end date can be specified only with start date, but start date was missing")]
    StartDateMissing,

    /// Start date not strictly before end date
    #[error("start date [{start}] must be before end date [{end}]")]
    InvalidDateRange {
        /// Start of the requested range
        start: chrono::DateTime<chrono::Utc>,
        /// End of the requested range
        end: chrono::DateTime<chrono::Utc>,
    },

    /// A task declared a target path that escapes the output directory
    #[error("invalid target path '{0}': must be relative and must not contain '..'")]
    InvalidTargetPath(String),
}

/// Handle-related errors
#[derive(Debug, Error)]
pub enum HandleError {
    /// Failed to open the shared run handle; fatal to the whole run
    #[error("failed to open handle: {0}")]
    OpenFailed(String),

    /// A task required a handle capability the run handle does not provide
    #[error("handle does not provide the required capability: expected {expected}")]
    WrongType {
        /// Name of the expected concrete handle type
        expected: &'static str,
    },
}
