//! Composite task running an ordered list of children.

use async_trait::async_trait;
use std::sync::Arc;

use super::{Task, TaskRef, TaskRunContext};
use crate::error::Result;
use crate::handle::Handle;
use crate::output::ArtifactSink;
use crate::types::TaskOutput;

/// Header of the group summary artifact: one row per child,
/// `(task descriptor, state)`.
const SUMMARY_HEADER: [&str; 2] = ["task", "state"];

/// A task that runs a fixed list of child tasks in order and writes one
/// summary row per child into its own artifact.
///
/// A child's failure or skip never stops the group; it is recorded and the
/// group proceeds to the next child. The group's own result is `Succeeded`
/// once every child has been attempted — aggregate failure policy belongs
/// to the run driver, not the group.
pub struct TaskGroup {
    target_path: String,
    tasks: Vec<TaskRef>,
}

impl TaskGroup {
    /// Create a group writing its summary to `target_path`.
    pub fn new(target_path: impl Into<String>, tasks: Vec<TaskRef>) -> Self {
        Self {
            target_path: target_path.into(),
            tasks,
        }
    }

    /// The child tasks, in execution order.
    pub fn tasks(&self) -> &[TaskRef] {
        &self.tasks
    }
}

#[async_trait]
impl Task for TaskGroup {
    fn target_path(&self) -> &str {
        &self.target_path
    }

    fn describe_source_data(&self) -> String {
        format!("from {} child tasks", self.tasks.len())
    }

    async fn run(
        &self,
        context: &TaskRunContext,
        sink: ArtifactSink,
        _handle: &dyn Handle,
    ) -> Result<TaskOutput> {
        let writes_header = sink.writes_header();
        let mut writer = sink.into_csv_writer();
        if writes_header {
            writer.write_record(SUMMARY_HEADER)?;
        }
        for task in &self.tasks {
            context.run_child_task(task).await;
            let state = context.task_state(task).state();
            writer.write_record([task.describe(), state.to_string()])?;
        }
        writer.flush()?;
        Ok(Arc::new(()))
    }
}
