//! The task abstraction: named units of extraction work and their
//! orchestration.
//!
//! A [`Task`] produces exactly one artifact, identified by its target path,
//! by reading the shared run [`Handle`]. Tasks are executed through a
//! [`TaskRunContext`], which isolates failures and records every outcome in
//! the concurrency-safe [`TaskSetState`].

use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::error::Result;
use crate::handle::Handle;
use crate::output::ArtifactSink;
use crate::types::{TaskCategory, TaskOutput, WriteMode};

mod condition;
mod context;
mod group;
mod result;
mod state;
mod version;

pub use condition::{Precondition, StateCondition};
pub use context::TaskRunContext;
pub use group::TaskGroup;
pub use result::TaskResult;
pub use state::TaskSetState;
pub use version::VersionTask;

/// A single named unit of extraction work producing one artifact.
///
/// Side-effect contract: a task writes only the artifact it owns (through
/// the sink it is handed) and reads the shared handle. It never closes or
/// reconfigures the handle, and never touches another task's artifact.
#[async_trait]
pub trait Task: Send + Sync {
    /// Entry name of the artifact this task produces.
    ///
    /// Must be unique within a run's flat task list; collisions are a caller
    /// error this core does not detect.
    fn target_path(&self) -> &str;

    /// Importance of this task within the run.
    fn category(&self) -> TaskCategory {
        TaskCategory::Required
    }

    /// How the artifact file is opened before [`Task::run`] is invoked.
    fn write_mode(&self) -> WriteMode {
        WriteMode::CreateTruncate
    }

    /// Human-readable description of where the data comes from.
    fn describe_source_data(&self) -> String {
        String::new()
    }

    /// Preconditions evaluated against the state store before execution.
    ///
    /// If any is unmet the task is recorded `Skipped` and never runs.
    fn preconditions(&self) -> Vec<Arc<dyn Precondition>> {
        Vec::new()
    }

    /// Execute the task against the shared handle, writing into `sink`.
    ///
    /// Called by [`TaskRunContext::run_child_task`], which catches any error
    /// and records the outcome; implementations are free to fail.
    async fn run(
        &self,
        context: &TaskRunContext,
        sink: ArtifactSink,
        handle: &dyn Handle,
    ) -> Result<TaskOutput>;
}

/// Shared, reference-identity handle to a task.
///
/// `TaskRef` is the key type of the state store: two refs are equal only if
/// they point at the same task object. Distinct tasks with equal target
/// paths remain distinct keys.
#[derive(Clone)]
pub struct TaskRef(Arc<dyn Task>);

impl TaskRef {
    /// Wrap a task for orchestration.
    pub fn new<T: Task + 'static>(task: T) -> Self {
        Self(Arc::new(task))
    }

    /// Wrap an already-shared task.
    pub fn from_arc(task: Arc<dyn Task>) -> Self {
        Self(task)
    }

    /// Descriptor used in group summary rows and logs.
    pub fn describe(&self) -> String {
        let source = self.0.describe_source_data();
        if source.is_empty() {
            format!("Writing {}", self.0.target_path())
        } else {
            format!("Writing {} {}", self.0.target_path(), source)
        }
    }

    fn data_ptr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl Deref for TaskRef {
    type Target = dyn Task;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for TaskRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.data_ptr(), other.data_ptr())
    }
}

impl Eq for TaskRef {}

impl Hash for TaskRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.data_ptr() as usize).hash(state);
    }
}

impl std::fmt::Debug for TaskRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRef")
            .field("target_path", &self.0.target_path())
            .field("category", &self.0.category())
            .finish()
    }
}

impl std::fmt::Display for TaskRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
