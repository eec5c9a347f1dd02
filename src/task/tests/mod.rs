use super::*;
use crate::config::RunConfig;
use crate::error::Error;
use crate::output::OutputDirectory;
use crate::types::TaskState;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

mod state;

/// Handle stand-in for tests that never touch a database.
pub(crate) struct NoopHandle;

#[async_trait]
impl crate::handle::Handle for NoopHandle {
    fn as_any(&self) -> &(dyn std::any::Any + Send + Sync) {
        self
    }

    async fn close(&self) -> crate::error::Result<()> {
        Ok(())
    }
}

pub(crate) enum Behavior {
    Succeed(i64),
    Fail(String),
}

/// Minimal task with scripted behavior; identity is the object itself.
pub(crate) struct TestTask {
    target: String,
    behavior: Behavior,
    preconditions: Vec<Arc<dyn Precondition>>,
}

impl TestTask {
    pub(crate) fn succeeding(target: &str, value: i64) -> Self {
        Self {
            target: target.to_string(),
            behavior: Behavior::Succeed(value),
            preconditions: Vec::new(),
        }
    }

    pub(crate) fn failing(target: &str, message: &str) -> Self {
        Self {
            target: target.to_string(),
            behavior: Behavior::Fail(message.to_string()),
            preconditions: Vec::new(),
        }
    }

    pub(crate) fn with_precondition(mut self, precondition: impl Precondition + 'static) -> Self {
        self.preconditions.push(Arc::new(precondition));
        self
    }
}

#[async_trait]
impl Task for TestTask {
    fn target_path(&self) -> &str {
        &self.target
    }

    fn preconditions(&self) -> Vec<Arc<dyn Precondition>> {
        self.preconditions.clone()
    }

    async fn run(
        &self,
        _context: &TaskRunContext,
        mut sink: crate::output::ArtifactSink,
        _handle: &dyn crate::handle::Handle,
    ) -> crate::error::Result<crate::types::TaskOutput> {
        match &self.behavior {
            Behavior::Succeed(value) => {
                sink.write_text(&value.to_string())?;
                Ok(Arc::new(*value) as crate::types::TaskOutput)
            }
            Behavior::Fail(message) => Err(Error::Other(message.clone())),
        }
    }
}

/// Build a context writing into a fresh temp directory.
pub(crate) fn test_context(dir: &Path) -> TaskRunContext {
    TaskRunContext::new(
        Arc::new(NoopHandle),
        Arc::new(TaskSetState::new()),
        Arc::new(OutputDirectory::create(dir).unwrap()),
        RunConfig {
            output_dir: dir.to_path_buf(),
            ..Default::default()
        },
    )
}

pub(crate) fn test_context_in_tempdir() -> (TaskRunContext, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(dir.path());
    (context, dir)
}

#[test]
fn task_ref_identity_is_by_reference() {
    // Two distinct task objects with the same target path are distinct keys
    let a = TaskRef::new(TestTask::succeeding("same.csv", 1));
    let b = TaskRef::new(TestTask::succeeding("same.csv", 1));
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn task_ref_describes_target_and_source() {
    let task = TaskRef::new(TestTask::succeeding("metadata/tables.csv", 1));
    assert_eq!(task.describe(), "Writing metadata/tables.csv");
    assert_eq!(task.category(), crate::types::TaskCategory::Required);
}

#[test]
fn version_task_is_informational() {
    let task = TaskRef::new(VersionTask::new());
    assert_eq!(task.category(), crate::types::TaskCategory::Informational);
    assert_eq!(task.target_path(), VersionTask::DEFAULT_TARGET_PATH);
}

#[tokio::test]
async fn version_task_writes_product_version() {
    let (context, dir) = test_context_in_tempdir();
    let task = TaskRef::new(VersionTask::new());
    let result = context.run_child_task(&task).await;
    assert_eq!(result.state(), TaskState::Succeeded);
    let content =
        std::fs::read_to_string(dir.path().join(VersionTask::DEFAULT_TARGET_PATH)).unwrap();
    assert!(content.contains(env!("CARGO_PKG_VERSION")));
}
