//! The concurrency-safe store of task outcomes for a run.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{TaskRef, TaskResult};
use crate::types::TaskState;

/// Mapping from task (reference identity) to its recorded [`TaskResult`],
/// shared by however many tasks run in parallel within one invocation.
///
/// Every mutation and every full read goes through one mutex; readers get a
/// point-in-time snapshot, never the live map. The lock is held only for
/// the map operation itself, never across I/O or `.await`.
#[derive(Default)]
pub struct TaskSetState {
    results: Mutex<HashMap<TaskRef, TaskResult>>,
}

impl TaskSetState {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of `task`, replacing any prior entry.
    pub fn record(&self, task: &TaskRef, result: TaskResult) {
        let mut results = self.results.lock().unwrap_or_else(|e| e.into_inner());
        results.insert(task.clone(), result);
    }

    /// The last recorded result for `task`, or a `NotAttempted` result if
    /// none exists yet.
    pub fn get(&self, task: &TaskRef) -> TaskResult {
        let results = self.results.lock().unwrap_or_else(|e| e.into_inner());
        results
            .get(task)
            .cloned()
            .unwrap_or_else(TaskResult::not_attempted)
    }

    /// Number of tasks with a recorded outcome.
    pub fn len(&self) -> usize {
        let results = self.results.lock().unwrap_or_else(|e| e.into_inner());
        results.len()
    }

    /// Whether any outcome has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time snapshot of every recorded outcome.
    ///
    /// Safe to call while writers are recording; the returned vector is
    /// detached from the live map. Iteration order is unspecified.
    pub fn snapshot(&self) -> Vec<(TaskRef, TaskResult)> {
        let results = self.results.lock().unwrap_or_else(|e| e.into_inner());
        results
            .iter()
            .map(|(task, result)| (task.clone(), result.clone()))
            .collect()
    }

    /// Count recorded outcomes in `state`.
    pub fn count_in_state(&self, state: TaskState) -> usize {
        let results = self.results.lock().unwrap_or_else(|e| e.into_inner());
        results.values().filter(|r| r.state() == state).count()
    }
}

impl std::fmt::Debug for TaskSetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSetState")
            .field("len", &self.len())
            .finish()
    }
}
