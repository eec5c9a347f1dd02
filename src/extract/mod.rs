//! Streaming SQL extraction: cursor-backed queries serialized straight into
//! tabular artifacts.
//!
//! The result set is consumed through a forward-only row stream with bounded
//! client-side buffering — never "fetch all rows, then write". Peak memory
//! is independent of row count.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{Column, Executor, Statement};
use std::sync::Arc;

use crate::error::{HandleError, Result, UsageError};
use crate::handle::{Handle, SqlHandle};
use crate::output::ArtifactSink;
use crate::progress::RecordCounter;
use crate::task::{Precondition, Task, TaskRunContext};
use crate::types::{Interval, Summary, TaskCategory, TaskOutput, WriteMode};

mod cells;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

/// A function deriving header names from the result metadata column names.
pub type HeaderTransform = Arc<dyn Fn(&[String]) -> Vec<String> + Send + Sync>;

/// How the header row of an extraction artifact is derived.
///
/// Priority order when resolving against the actual result metadata:
/// a declared column list is validated against the result's column count,
/// a transform maps the metadata names, and the fallback uses the metadata
/// names as reported.
#[derive(Clone)]
pub enum HeaderSpec {
    /// Use the column names reported by the result metadata.
    FromResult,
    /// Use this exact ordered column list; the result must have the same
    /// number of columns or the task fails with a usage error.
    Declared(Vec<String>),
    /// Derive the header from the metadata column names.
    Derived(HeaderTransform),
}

impl HeaderSpec {
    fn resolve(&self, metadata: &[String]) -> Result<Vec<String>> {
        match self {
            HeaderSpec::FromResult => Ok(metadata.to_vec()),
            HeaderSpec::Derived(transform) => Ok(transform(metadata)),
            HeaderSpec::Declared(names) => {
                if names.len() != metadata.len() {
                    return Err(UsageError::ColumnCountMismatch {
                        expected: names.len(),
                        actual: metadata.len(),
                        declared: names.join(", "),
                    }
                    .into());
                }
                Ok(names.clone())
            }
        }
    }
}

impl std::fmt::Debug for HeaderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderSpec::FromResult => write!(f, "FromResult"),
            HeaderSpec::Declared(names) => f.debug_tuple("Declared").field(names).finish(),
            HeaderSpec::Derived(_) => write!(f, "Derived(..)"),
        }
    }
}

/// Task extracting the result of one SQL query into a tabular artifact.
///
/// The success value is a [`Summary`] with the record count and, for
/// time-bounded queries, the extraction interval.
pub struct SqlSelectTask {
    target_path: String,
    sql: String,
    header: HeaderSpec,
    write_mode: WriteMode,
    category: TaskCategory,
    interval: Option<Interval>,
    fetch_batch_size: Option<usize>,
    preconditions: Vec<Arc<dyn Precondition>>,
}

impl SqlSelectTask {
    /// Create a task writing the result of `sql` to `target_path`.
    pub fn new(target_path: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
            sql: sql.into(),
            header: HeaderSpec::FromResult,
            write_mode: WriteMode::default(),
            category: TaskCategory::Required,
            interval: None,
            fetch_batch_size: None,
            preconditions: Vec::new(),
        }
    }

    /// Declare the exact header column list the query must produce.
    pub fn with_header<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.header = HeaderSpec::Declared(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Derive the header from the result metadata column names.
    pub fn with_header_transform(
        mut self,
        transform: impl Fn(&[String]) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.header = HeaderSpec::Derived(Arc::new(transform));
        self
    }

    /// Set the artifact write mode.
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Set the task category.
    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    /// Bound the extraction to `interval`; merged into the summary.
    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Override the run-level fetch batch size for this query.
    pub fn with_fetch_batch_size(mut self, records: usize) -> Self {
        self.fetch_batch_size = Some(records.max(1));
        self
    }

    /// Gate this task on a precondition.
    pub fn with_precondition(mut self, precondition: impl Precondition + 'static) -> Self {
        self.preconditions.push(Arc::new(precondition));
        self
    }

    /// The query this task executes.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

#[async_trait]
impl Task for SqlSelectTask {
    fn target_path(&self) -> &str {
        &self.target_path
    }

    fn category(&self) -> TaskCategory {
        self.category
    }

    fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    fn describe_source_data(&self) -> String {
        format!("from: {}", self.sql)
    }

    fn preconditions(&self) -> Vec<Arc<dyn Precondition>> {
        self.preconditions.clone()
    }

    async fn run(
        &self,
        context: &TaskRunContext,
        sink: ArtifactSink,
        handle: &dyn Handle,
    ) -> Result<TaskOutput> {
        let sql_handle = handle
            .as_any()
            .downcast_ref::<SqlHandle>()
            .ok_or(HandleError::WrongType {
                expected: "SqlHandle",
            })?;
        let batch = self
            .fetch_batch_size
            .unwrap_or_else(|| context.fetch_batch_size())
            .max(1) as u64;

        // Connection, statement/stream, and writer are scoped acquisitions:
        // dropped on every exit path in reverse order.
        let mut conn = sql_handle.pool().acquire().await?;

        tracing::debug!(target_path = %self.target_path, "Preparing statement");
        let statement = (&mut *conn).prepare(self.sql.as_str()).await?;
        let metadata: Vec<String> = statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();
        let header = self.header.resolve(&metadata)?;
        let column_count = metadata.len();

        let writes_header = sink.writes_header();
        let mut writer = sink.into_csv_writer();
        if writes_header {
            writer.write_record(&header)?;
        }

        tracing::debug!(target_path = %self.target_path, "Executing query");
        let mut counter = RecordCounter::new(self.target_path.clone(), batch);
        {
            let mut rows = statement.query().fetch(&mut *conn);
            let mut record: Vec<String> = Vec::with_capacity(column_count);
            while let Some(row) = rows.try_next().await? {
                record.clear();
                for index in 0..column_count {
                    record.push(cells::field_text(&row, index)?);
                }
                writer.write_record(&record)?;
                counter.count();
                if counter.total() % batch == 0 {
                    writer.flush()?;
                }
            }
        }
        writer.flush()?;

        let mut summary = Summary::new(counter.finish());
        if let Some(interval) = self.interval {
            summary = summary.with_interval(interval);
        }
        Ok(Arc::new(summary) as TaskOutput)
    }
}
