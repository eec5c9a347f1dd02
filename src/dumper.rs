//! The single-run driver: handle lifecycle, top-level task scheduling, and
//! the run summary.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;

use crate::config::{ConnectorArguments, RunConfig};
use crate::connector::Connector;
use crate::error::Result;
use crate::output::OutputDirectory;
use crate::task::{TaskRef, TaskRunContext, TaskSetState};
use crate::types::{TaskCategory, TaskState, WriteMode};

/// Artifact entry name of the JSON run summary.
const RUN_SUMMARY_TARGET: &str = "run-summary.json";

/// Drives one extraction run end to end.
///
/// The driver opens the connector's handle exactly once, executes every
/// top-level task with failure isolation, and closes the handle on every
/// exit path. Partial success is the normal terminal state: task failures
/// are reported in the [`RunSummary`], never raised from [`Dumper::run`].
pub struct Dumper {
    config: RunConfig,
}

impl Dumper {
    /// Create a driver with the given run configuration.
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run `connector` against `arguments`.
    ///
    /// # Errors
    ///
    /// Only run-level failures are returned: invalid configuration or
    /// arguments, handle acquisition failure, or an unusable output
    /// directory. Individual task failures are recorded, not raised.
    pub async fn run(
        &self,
        connector: &dyn Connector,
        arguments: &ConnectorArguments,
    ) -> Result<RunSummary> {
        self.config.validate()?;
        connector.validate(arguments)?;

        let mut tasks = Vec::new();
        connector.add_tasks_to(&mut tasks, arguments)?;
        tracing::info!(
            connector = connector.name(),
            task_count = tasks.len(),
            "Starting extraction run"
        );

        // The handle is acquired once; its failure is fatal before any task
        // runs. After this point it must be closed on every path.
        let handle = connector.open(arguments).await?;

        let outcome = self.run_tasks(handle.clone(), &tasks).await;

        if let Err(close_error) = handle.close().await {
            tracing::warn!(error = %close_error, "Handle close reported an error");
        }

        let summary = outcome?;
        tracing::info!(
            connector = connector.name(),
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "Extraction run finished"
        );
        Ok(summary)
    }

    async fn run_tasks(
        &self,
        handle: Arc<dyn crate::handle::Handle>,
        tasks: &[TaskRef],
    ) -> Result<RunSummary> {
        let output = Arc::new(OutputDirectory::create(&self.config.output_dir)?);
        let state = Arc::new(TaskSetState::new());
        let context = Arc::new(TaskRunContext::new(
            handle,
            state.clone(),
            output.clone(),
            self.config.clone(),
        ));

        if self.config.parallelism > 1 {
            // Independent top-level tasks; no cross-task ordering guaranteed.
            stream::iter(tasks.iter().cloned())
                .map(|task| {
                    let context = context.clone();
                    async move {
                        context.run_child_task(&task).await;
                    }
                })
                .buffer_unordered(self.config.parallelism)
                .collect::<Vec<_>>()
                .await;
        } else {
            for task in tasks {
                context.run_child_task(task).await;
            }
        }

        let summary = RunSummary::from_state(tasks, &state);
        if self.config.write_run_summary {
            if let Err(error) = summary.write_json(&output) {
                tracing::warn!(error = %error, "Could not write run summary artifact");
            }
        }
        for report in &summary.tasks {
            tracing::info!(
                target_path = %report.target_path,
                state = %report.state,
                "Task outcome"
            );
        }
        Ok(summary)
    }
}

/// Outcome report of one task within a run.
#[derive(Clone, Debug, Serialize)]
pub struct TaskReport {
    /// Target path of the artifact the task owns
    pub target_path: String,
    /// Human-readable task descriptor
    pub description: String,
    /// Importance of the task
    pub category: TaskCategory,
    /// Final recorded state
    pub state: TaskState,
    /// Rendered error chain, for failed tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why the task was skipped, for skipped tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

/// Structured record of which artifacts succeeded, failed, or were skipped.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    /// One report per top-level task, in task-list order
    pub tasks: Vec<TaskReport>,
    /// Number of top-level tasks that succeeded
    pub succeeded: usize,
    /// Number of top-level tasks that failed
    pub failed: usize,
    /// Number of top-level tasks that were skipped
    pub skipped: usize,
    /// Number of top-level tasks never attempted
    pub not_attempted: usize,
}

impl RunSummary {
    /// Build the summary for `tasks` from their recorded outcomes.
    pub fn from_state(tasks: &[TaskRef], state: &TaskSetState) -> Self {
        let reports: Vec<TaskReport> = tasks
            .iter()
            .map(|task| {
                let result = state.get(task);
                TaskReport {
                    target_path: task.target_path().to_string(),
                    description: task.describe(),
                    category: task.category(),
                    state: result.state(),
                    error: result.error().map(|e| e.render_chain()),
                    skip_reason: result.skip_reason().map(str::to_string),
                }
            })
            .collect();

        let count = |s: TaskState| reports.iter().filter(|r| r.state == s).count();
        Self {
            succeeded: count(TaskState::Succeeded),
            failed: count(TaskState::Failed),
            skipped: count(TaskState::Skipped),
            not_attempted: count(TaskState::NotAttempted),
            tasks: reports,
        }
    }

    /// Overall run classification.
    ///
    /// A run succeeds unless a `Required` task failed; `Informational` and
    /// `Optional` failures are reported but do not fail the run.
    pub fn run_succeeded(&self) -> bool {
        !self
            .tasks
            .iter()
            .any(|r| r.state == TaskState::Failed && r.category == TaskCategory::Required)
    }

    fn write_json(&self, output: &OutputDirectory) -> Result<()> {
        let mut sink = output.create_sink(RUN_SUMMARY_TARGET, WriteMode::CreateTruncate)?;
        sink.write_text(&serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
