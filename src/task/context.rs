//! The execution environment handed to every task.

use std::sync::Arc;

use super::{TaskRef, TaskResult, TaskSetState};
use crate::config::RunConfig;
use crate::error::Result;
use crate::handle::Handle;
use crate::output::OutputDirectory;
use crate::types::TaskOutput;

/// Execution context shared by all tasks of one run.
///
/// The context runs child tasks with structural failure isolation: a child's
/// error is caught, recorded in the state store, and written out as a
/// diagnostic artifact; it never propagates to the caller. The shared handle
/// and output directory are read-only from the tasks' perspective.
pub struct TaskRunContext {
    handle: Arc<dyn Handle>,
    state: Arc<TaskSetState>,
    output: Arc<OutputDirectory>,
    config: RunConfig,
}

impl TaskRunContext {
    /// Build a context over an opened handle.
    pub fn new(
        handle: Arc<dyn Handle>,
        state: Arc<TaskSetState>,
        output: Arc<OutputDirectory>,
        config: RunConfig,
    ) -> Self {
        Self {
            handle,
            state,
            output,
            config,
        }
    }

    /// The shared run handle.
    pub fn handle(&self) -> &dyn Handle {
        self.handle.as_ref()
    }

    /// The store of recorded task outcomes.
    pub fn state(&self) -> &TaskSetState {
        &self.state
    }

    /// The run's output directory.
    pub fn output(&self) -> &OutputDirectory {
        &self.output
    }

    /// Records buffered per batch on the extraction path, unless a task
    /// overrides it.
    pub fn fetch_batch_size(&self) -> usize {
        self.config.fetch_batch_size
    }

    /// Execute `task`, record its outcome, and return the recorded result.
    ///
    /// This call never propagates the child's error: a failure is caught,
    /// logged, written to `<target>.exception.txt`, and recorded as
    /// `Failed`. Unmet preconditions record `Skipped` without executing.
    pub async fn run_child_task(&self, task: &TaskRef) -> TaskResult {
        for precondition in task.preconditions() {
            if !precondition.evaluate(&self.state) {
                let reason = format!("precondition not met: {}", precondition.describe());
                tracing::info!(
                    target_path = task.target_path(),
                    reason = %reason,
                    "Skipping task"
                );
                let result = TaskResult::skipped(reason);
                self.state.record(task, result.clone());
                return result;
            }
        }

        tracing::info!(target_path = task.target_path(), "Running task");
        let result = match self.execute(task).await {
            Ok(value) => TaskResult::succeeded(value),
            Err(error) => {
                let error = error.into_task_failure(task.target_path());
                tracing::warn!(
                    target_path = task.target_path(),
                    error = %error,
                    "Task failed; continuing with remaining tasks"
                );
                if let Err(write_error) = self.output.write_exception(task.target_path(), &error) {
                    tracing::warn!(
                        target_path = task.target_path(),
                        error = %write_error,
                        "Could not write exception artifact"
                    );
                }
                TaskResult::failed(error)
            }
        };
        self.state.record(task, result.clone());
        result
    }

    /// The last recorded result for `task`, or `NotAttempted`.
    pub fn task_state(&self, task: &TaskRef) -> TaskResult {
        self.state.get(task)
    }

    async fn execute(&self, task: &TaskRef) -> Result<TaskOutput> {
        let sink = self
            .output
            .create_sink(task.target_path(), task.write_mode())?;
        task.run(self, sink, self.handle.as_ref()).await
    }
}
