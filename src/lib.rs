//! # dwh-dumper
//!
//! Streaming metadata and query-log extraction library for data warehouse
//! assessment.
//!
//! ## Design Philosophy
//!
//! dwh-dumper is designed to be:
//! - **Connector-driven** - Per-system connectors supply tasks; the core supplies orchestration
//! - **Failure-isolating** - One failing task never takes down the rest of the run
//! - **Constant-memory** - Result sets stream through a cursor, never into RAM
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use dwh_dumper::{
//!     Connector, ConnectorArguments, Dumper, RunConfig, SqlHandle, SqlSelectTask, TaskRef,
//! };
//!
//! struct SqliteMetadataConnector;
//!
//! #[async_trait::async_trait]
//! impl Connector for SqliteMetadataConnector {
//!     fn name(&self) -> &str {
//!         "sqlite-metadata"
//!     }
//!
//!     fn add_tasks_to(
//!         &self,
//!         out: &mut Vec<TaskRef>,
//!         _arguments: &ConnectorArguments,
//!     ) -> dwh_dumper::Result<()> {
//!         out.push(TaskRef::new(SqlSelectTask::new(
//!             "metadata/schema.csv",
//!             "SELECT name, type FROM sqlite_schema ORDER BY name",
//!         )));
//!         Ok(())
//!     }
//!
//!     async fn open(
//!         &self,
//!         arguments: &ConnectorArguments,
//!     ) -> dwh_dumper::Result<Arc<dyn dwh_dumper::Handle>> {
//!         let handle = SqlHandle::open(std::path::Path::new(&arguments.url)).await?;
//!         Ok(Arc::new(handle))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> dwh_dumper::Result<()> {
//!     let dumper = Dumper::new(RunConfig::default());
//!     let summary = dumper
//!         .run(&SqliteMetadataConnector, &ConnectorArguments::new("source.db"))
//!         .await?;
//!     println!("run succeeded: {}", summary.run_succeeded());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Run and connector configuration types
pub mod config;
/// Connector boundary: per-system task lists and handle acquisition
pub mod connector;
/// The single-run driver and run summary
pub mod dumper;
/// Error types
pub mod error;
/// Streaming SQL extraction tasks
pub mod extract;
/// The shared run handle
pub mod handle;
/// Artifact output directory and sinks
pub mod output;
/// Record-count progress accounting
pub mod progress;
/// Task abstraction and orchestration core
pub mod task;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::{ConnectorArguments, RunConfig};
pub use connector::Connector;
pub use dumper::{Dumper, RunSummary, TaskReport};
pub use error::{Error, HandleError, Result, UsageError};
pub use extract::{HeaderSpec, SqlSelectTask};
pub use handle::{Handle, SqlHandle};
pub use output::{ArtifactSink, OutputDirectory};
pub use progress::RecordCounter;
pub use task::{
    Precondition, StateCondition, Task, TaskGroup, TaskRef, TaskResult, TaskRunContext,
    TaskSetState, VersionTask,
};
pub use types::{Interval, Summary, TaskCategory, TaskOutput, TaskState, WriteMode};
