//! Core types for dwh-dumper

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

use crate::error::{Result, UsageError};

/// Type-erased success value of a task.
///
/// Tasks with a meaningful result (e.g. a [`Summary`]) return it behind this
/// alias; callers recover the concrete type by downcasting through
/// [`crate::task::TaskResult::value_as`].
pub type TaskOutput = Arc<dyn Any + Send + Sync>;

/// Importance of a task within a run
///
/// Failure policy lives in the run driver: only `Required` failures count
/// against overall run success, `Informational` failures are reported but
/// never affect the classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCategory {
    /// The run is degraded if this task fails
    #[default]
    Required,
    /// Useful but not essential output
    Optional,
    /// Diagnostic output only (e.g. product version)
    Informational,
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskCategory::Required => "REQUIRED",
            TaskCategory::Optional => "OPTIONAL",
            TaskCategory::Informational => "INFORMATIONAL",
        };
        write!(f, "{}", s)
    }
}

/// Recorded outcome tag of a task attempt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// No attempt has been recorded for the task
    #[default]
    NotAttempted,
    /// The task ran to completion and produced its artifact
    Succeeded,
    /// The task raised an error; the error is retained in the result
    Failed,
    /// A precondition was unmet and the task never executed
    Skipped,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskState::NotAttempted => "NOT_ATTEMPTED",
            TaskState::Succeeded => "SUCCEEDED",
            TaskState::Failed => "FAILED",
            TaskState::Skipped => "SKIPPED",
        };
        write!(f, "{}", s)
    }
}

/// How a task's artifact file is opened
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Create the file, truncating any prior content; the header row is written
    #[default]
    CreateTruncate,
    /// Append to an existing file; the header row is suppressed since it
    /// already exists from the prior write
    AppendExisting,
}

/// Success value of a streaming extraction task
///
/// Carries the number of records written and, for time-bounded extractions,
/// the interval the records cover.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of data records written (excluding the header row)
    pub record_count: u64,
    /// Time range the extraction was bounded to, if any
    pub interval: Option<Interval>,
}

impl Summary {
    /// Create a summary for `record_count` written records.
    pub fn new(record_count: u64) -> Self {
        Self {
            record_count,
            interval: None,
        }
    }

    /// Merge a bounding time interval into this summary.
    pub fn with_interval(self, interval: Interval) -> Self {
        Self {
            interval: Some(interval),
            ..self
        }
    }
}

/// Half-open UTC time range `[start, end)` used to bound log queries
///
/// The constructor enforces `start < end`; an `Interval` that exists is
/// always non-empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Create an interval covering `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns a usage error if `start` is not strictly before `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(UsageError::InvalidDateRange { start, end }.into());
        }
        Ok(Self { start, end })
    }

    /// Inclusive start of the interval.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end of the interval.
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the interval.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whether `instant` falls within `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Split into consecutive sub-intervals of at most `chunk` length.
    ///
    /// The final chunk is truncated to the interval end. Log connectors use
    /// this to issue one bounded query per day or hour instead of a single
    /// unbounded scan.
    pub fn chunked(&self, chunk: TimeDelta) -> impl Iterator<Item = Interval> + use<> {
        let (start, end) = (self.start, self.end);
        // A non-positive chunk yields the whole interval in one piece
        let step = if chunk > TimeDelta::zero() {
            chunk
        } else {
            end - start
        };
        let mut cursor = start;
        std::iter::from_fn(move || {
            if cursor >= end {
                return None;
            }
            let chunk_start = cursor;
            let chunk_end = (cursor + step).min(end);
            cursor = chunk_end;
            Some(Interval {
                start: chunk_start,
                end: chunk_end,
            })
        })
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn interval_rejects_inverted_range() {
        let err = Interval::new(utc(2024, 5, 2), utc(2024, 5, 1)).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Usage(UsageError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn interval_rejects_empty_range() {
        assert!(Interval::new(utc(2024, 5, 1), utc(2024, 5, 1)).is_err());
    }

    #[test]
    fn interval_is_half_open() {
        let interval = Interval::new(utc(2024, 5, 1), utc(2024, 5, 2)).unwrap();
        assert!(interval.contains(utc(2024, 5, 1)));
        assert!(!interval.contains(utc(2024, 5, 2)));
    }

    #[test]
    fn chunked_splits_into_days() {
        let interval = Interval::new(utc(2024, 5, 1), utc(2024, 5, 4)).unwrap();
        let days: Vec<_> = interval.chunked(TimeDelta::days(1)).collect();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].start(), utc(2024, 5, 1));
        assert_eq!(days[2].end_exclusive(), utc(2024, 5, 4));
    }

    #[test]
    fn chunked_truncates_final_chunk() {
        let interval = Interval::new(utc(2024, 5, 1), utc(2024, 5, 3)).unwrap();
        let chunks: Vec<_> = interval.chunked(TimeDelta::hours(36)).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].duration(), TimeDelta::hours(12));
    }

    #[test]
    fn summary_with_interval_keeps_count() {
        let interval = Interval::new(utc(2024, 5, 1), utc(2024, 5, 2)).unwrap();
        let summary = Summary::new(42).with_interval(interval);
        assert_eq!(summary.record_count, 42);
        assert_eq!(summary.interval, Some(interval));
    }

    #[test]
    fn task_state_serializes_screaming() {
        let json = serde_json::to_string(&TaskState::NotAttempted).unwrap();
        assert_eq!(json, "\"NOT_ATTEMPTED\"");
    }
}
