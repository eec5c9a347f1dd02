//! Configuration types for dwh-dumper

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result, UsageError};
use crate::types::Interval;

/// Run behavior configuration (output location, concurrency, cursor tuning)
///
/// Groups settings that apply to a whole extraction run, independent of any
/// particular connector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory the run's artifacts are written into (default: "./dump")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of top-level tasks executed concurrently (default: 1)
    ///
    /// With the default of 1 the driver runs tasks strictly sequentially;
    /// higher values drive independent top-level tasks through a bounded
    /// concurrent scheduler. Children of a task group always execute in
    /// list order regardless of this setting.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Records fetched/buffered per batch on the extraction path (default: 16384)
    ///
    /// Bounds client-side buffering between output flushes and paces
    /// progress accounting. Tasks may override it per query.
    #[serde(default = "default_fetch_batch_size")]
    pub fetch_batch_size: usize,

    /// Write the run summary as a JSON artifact at the end of the run (default: true)
    #[serde(default = "default_true")]
    pub write_run_summary: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            parallelism: default_parallelism(),
            fetch_batch_size: default_fetch_batch_size(),
            write_run_summary: true,
        }
    }
}

impl RunConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            return Err(Error::Config {
                message: "parallelism must be at least 1".to_string(),
                key: Some("parallelism".to_string()),
            });
        }
        if self.fetch_batch_size == 0 {
            return Err(Error::Config {
                message: "fetch_batch_size must be at least 1".to_string(),
                key: Some("fetch_batch_size".to_string()),
            });
        }
        Ok(())
    }
}

/// Arguments handed to a connector when building tasks and opening the handle
///
/// This is the library-side subset of what a frontend would collect from its
/// operator: where the source system lives and which time range to extract
/// logs for. Credential material stays with the connector.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConnectorArguments {
    /// Connection URL or path of the source system
    pub url: String,

    /// Start of the requested log extraction range (inclusive)
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    /// End of the requested log extraction range (exclusive)
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl ConnectorArguments {
    /// Create arguments for a source URL with no date bounds.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            start_date: None,
            end_date: None,
        }
    }

    /// Set the half-open date range `[start, end)` for log extraction.
    pub fn with_date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// The requested extraction interval, if a date range was supplied.
    ///
    /// # Errors
    ///
    /// Returns a usage error when only one bound is present or the range is
    /// inverted; both abort a run before any task executes.
    pub fn interval(&self) -> Result<Option<Interval>> {
        match (self.start_date, self.end_date) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(UsageError::EndDateMissing.into()),
            (None, Some(_)) => Err(UsageError::StartDateMissing.into()),
            (Some(start), Some(end)) => Interval::new(start, end).map(Some),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./dump")
}

fn default_parallelism() -> usize {
    1
}

fn default_fetch_batch_size() -> usize {
    16384
}

fn default_true() -> bool {
    true
}
