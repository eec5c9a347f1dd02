//! Artifact output: maps task target paths to files in the run's output
//! directory.
//!
//! Each task owns exactly one artifact, named by its target path. A failed
//! task additionally gets a `<target>.exception.txt` diagnostic carrying the
//! rendered error chain, written by the run context.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result, UsageError};
use crate::types::WriteMode;

/// The run's output directory; artifact sinks are created relative to it.
pub struct OutputDirectory {
    root: PathBuf,
}

impl OutputDirectory {
    /// Create (if needed) and wrap the output directory at `root`.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory artifacts are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a target path inside the output directory.
    ///
    /// Target paths are relative entry names; absolute paths and `..`
    /// components are caller errors.
    fn resolve(&self, target_path: &str) -> Result<PathBuf> {
        let relative = Path::new(target_path);
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir));
        if escapes || target_path.is_empty() {
            return Err(UsageError::InvalidTargetPath(target_path.to_string()).into());
        }
        Ok(self.root.join(relative))
    }

    /// Open the artifact sink for `target_path`.
    pub fn create_sink(&self, target_path: &str, mode: WriteMode) -> Result<ArtifactSink> {
        let path = self.resolve(target_path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = match mode {
            WriteMode::CreateTruncate => File::create(&path)?,
            WriteMode::AppendExisting => OpenOptions::new().create(true).append(true).open(&path)?,
        };
        Ok(ArtifactSink { path, mode, file })
    }

    /// Write the secondary diagnostic artifact for a failed task.
    ///
    /// The primary artifact's absence (or partial content) is not suppressed.
    pub fn write_exception(&self, target_path: &str, error: &Error) -> Result<PathBuf> {
        let path = self.resolve(&format!("{}.exception.txt", target_path))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, error.render_chain())?;
        Ok(path)
    }
}

/// An open artifact file, handed to a task by the run context.
#[derive(Debug)]
pub struct ArtifactSink {
    path: PathBuf,
    mode: WriteMode,
    file: File,
}

impl ArtifactSink {
    /// Filesystem location of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The mode the artifact was opened with.
    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Whether the header row should be emitted into this sink.
    ///
    /// Appending to an existing artifact suppresses the header, which
    /// already exists from the prior write.
    pub fn writes_header(&self) -> bool {
        self.mode == WriteMode::CreateTruncate
    }

    /// Consume the sink into a CSV writer over the artifact file.
    pub fn into_csv_writer(self) -> csv::Writer<File> {
        csv::Writer::from_writer(self.file)
    }

    /// Write plain UTF-8 text into the artifact.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.file.write_all(text.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}
