//! Preconditions gating task execution on previously recorded outcomes.

use super::{TaskRef, TaskSetState};
use crate::types::TaskState;

/// A predicate over the state store, evaluated before a task runs.
///
/// An unmet precondition records the task as `Skipped` with the
/// precondition's description as the reason.
pub trait Precondition: Send + Sync {
    /// Whether the guarded task may run.
    fn evaluate(&self, state: &TaskSetState) -> bool;

    /// Human-readable statement of what must hold.
    fn describe(&self) -> String;
}

/// Requires another task's recorded state to match an expected state.
///
/// The common case gates a dependent extraction on a prerequisite having
/// succeeded.
pub struct StateCondition {
    task: TaskRef,
    required: TaskState,
}

impl StateCondition {
    /// Require `task` to be recorded in `required` state.
    pub fn new(task: TaskRef, required: TaskState) -> Self {
        Self { task, required }
    }

    /// Require `task` to have succeeded.
    pub fn succeeded(task: TaskRef) -> Self {
        Self::new(task, TaskState::Succeeded)
    }
}

impl Precondition for StateCondition {
    fn evaluate(&self, state: &TaskSetState) -> bool {
        state.get(&self.task).state() == self.required
    }

    fn describe(&self) -> String {
        format!(
            "task '{}' is {}",
            self.task.target_path(),
            self.required
        )
    }
}
