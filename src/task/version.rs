//! Informational task recording which product produced a dump.

use async_trait::async_trait;
use std::sync::Arc;

use super::{Task, TaskRunContext};
use crate::error::Result;
use crate::handle::Handle;
use crate::output::ArtifactSink;
use crate::types::{TaskCategory, TaskOutput};

/// Writes the product name and version into its artifact.
///
/// Informational: a failure here never degrades the run.
pub struct VersionTask {
    target_path: String,
}

impl VersionTask {
    /// Default artifact entry name for the version record.
    pub const DEFAULT_TARGET_PATH: &'static str = "dumper-version.txt";

    /// Create the task with the default target path.
    pub fn new() -> Self {
        Self::with_target_path(Self::DEFAULT_TARGET_PATH)
    }

    /// Create the task writing to a custom target path.
    pub fn with_target_path(target_path: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
        }
    }
}

impl Default for VersionTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Task for VersionTask {
    fn target_path(&self) -> &str {
        &self.target_path
    }

    fn category(&self) -> TaskCategory {
        TaskCategory::Informational
    }

    fn describe_source_data(&self) -> String {
        "from product version information".to_string()
    }

    async fn run(
        &self,
        _context: &TaskRunContext,
        mut sink: ArtifactSink,
        _handle: &dyn Handle,
    ) -> Result<TaskOutput> {
        sink.write_text(&format!(
            "{} {}\n",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))?;
        Ok(Arc::new(()))
    }
}
