//! The recorded outcome of one task attempt.

use std::sync::Arc;

use crate::error::Error;
use crate::types::{TaskOutput, TaskState};

/// Outcome of running one task: a state tag plus an optional success value
/// and an optional captured error.
///
/// A result is created once per attempt and never mutated; a re-run replaces
/// the store's mapping entry with a fresh result. Cloning is cheap (the
/// value and error are shared).
#[derive(Clone)]
pub struct TaskResult {
    state: TaskState,
    value: Option<TaskOutput>,
    error: Option<Arc<Error>>,
    skip_reason: Option<String>,
}

impl TaskResult {
    /// The result of a task nothing has attempted yet.
    pub fn not_attempted() -> Self {
        Self {
            state: TaskState::NotAttempted,
            value: None,
            error: None,
            skip_reason: None,
        }
    }

    /// A successful attempt carrying the task's output.
    pub fn succeeded(value: TaskOutput) -> Self {
        Self {
            state: TaskState::Succeeded,
            value: Some(value),
            error: None,
            skip_reason: None,
        }
    }

    /// A failed attempt retaining the captured error.
    pub fn failed(error: Error) -> Self {
        Self {
            state: TaskState::Failed,
            value: None,
            error: Some(Arc::new(error)),
            skip_reason: None,
        }
    }

    /// A task skipped before execution because a precondition was unmet.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            state: TaskState::Skipped,
            value: None,
            error: None,
            skip_reason: Some(reason.into()),
        }
    }

    /// The state tag of this attempt.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// The type-erased success value, if the attempt succeeded.
    pub fn value(&self) -> Option<&TaskOutput> {
        self.value.as_ref()
    }

    /// Downcast the success value to a concrete type.
    pub fn value_as<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.clone().and_then(|v| v.downcast::<T>().ok())
    }

    /// The captured error, if the attempt failed.
    pub fn error(&self) -> Option<&Arc<Error>> {
        self.error.as_ref()
    }

    /// Why the task was skipped, if it was.
    pub fn skip_reason(&self) -> Option<&str> {
        self.skip_reason.as_deref()
    }
}

impl std::fmt::Debug for TaskResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("TaskResult");
        s.field("state", &self.state);
        if let Some(error) = &self.error {
            s.field("error", &error.to_string());
        }
        if let Some(reason) = &self.skip_reason {
            s.field("skip_reason", reason);
        }
        s.finish()
    }
}
