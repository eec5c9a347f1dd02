//! The connector boundary: per-system task lists and handle acquisition.
//!
//! A connector knows how to talk to one kind of source system. It supplies
//! the run's task list and opens the shared [`Handle`]; the driver calls
//! `open` exactly once per run and treats its failure as fatal.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ConnectorArguments;
use crate::error::{Result, UsageError};
use crate::handle::Handle;
use crate::task::TaskRef;

/// Adapter for one kind of source system.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Short machine-friendly connector name (e.g. "sqlite-metadata").
    fn name(&self) -> &str;

    /// Human-readable description of what this connector extracts.
    fn description(&self) -> String {
        String::new()
    }

    /// Validate the arguments before any task is built or run.
    ///
    /// The default checks the date range; connectors layer their own checks
    /// on top. Failure aborts the entire run before any task executes.
    fn validate(&self, arguments: &ConnectorArguments) -> Result<()> {
        validate_date_range(arguments)
    }

    /// Append this connector's tasks, in execution order, to `out`.
    fn add_tasks_to(&self, out: &mut Vec<TaskRef>, arguments: &ConnectorArguments) -> Result<()>;

    /// Open the shared run handle. Called exactly once per run.
    async fn open(&self, arguments: &ConnectorArguments) -> Result<Arc<dyn Handle>>;
}

/// Check that a date range, if present, is complete and ordered.
///
/// A start date requires an end date and must precede it; an end date
/// without a start date is rejected.
pub fn validate_date_range(arguments: &ConnectorArguments) -> Result<()> {
    match (arguments.start_date, arguments.end_date) {
        (Some(start), Some(end)) if start >= end => {
            Err(UsageError::InvalidDateRange { start, end }.into())
        }
        (Some(_), None) => Err(UsageError::EndDateMissing.into()),
        (None, Some(_)) => Err(UsageError::StartDateMissing.into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn absent_range_is_valid() {
        let args = ConnectorArguments::new("sqlite:source.db");
        validate_date_range(&args).unwrap();
    }

    #[test]
    fn inverted_range_is_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let args = ConnectorArguments::new("sqlite:source.db").with_date_range(start, end);
        let err = validate_date_range(&args).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Usage(UsageError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn half_open_arguments_are_rejected() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut args = ConnectorArguments::new("sqlite:source.db");
        args.start_date = Some(date);
        assert!(validate_date_range(&args).is_err());

        let mut args = ConnectorArguments::new("sqlite:source.db");
        args.end_date = Some(date);
        assert!(validate_date_range(&args).is_err());
    }
}
