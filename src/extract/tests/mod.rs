use super::*;
use crate::config::RunConfig;
use crate::output::OutputDirectory;
use crate::task::{TaskRef, TaskResult, TaskSetState};
use crate::types::TaskState;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use tempfile::{NamedTempFile, TempDir};


/// Source database plus a run context writing into a fresh output directory.
pub(crate) struct Fixture {
    pub(crate) context: TaskRunContext,
    pub(crate) out_dir: PathBuf,
    _db: NamedTempFile,
    _out: TempDir,
}

impl Fixture {
    pub(crate) async fn run(&self, task: SqlSelectTask) -> TaskResult {
        self.context.run_child_task(&TaskRef::new(task)).await
    }

    pub(crate) fn artifact(&self, target: &str) -> String {
        std::fs::read_to_string(self.out_dir.join(target)).unwrap()
    }
}

/// Seed a temp SQLite database with `setup_sql` and open an extraction
/// context over it.
pub(crate) async fn fixture(setup_sql: &[&str]) -> Fixture {
    let db = NamedTempFile::new().unwrap();
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db.path().display()))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await.unwrap();
    for sql in setup_sql {
        sqlx::query(sql).execute(&pool).await.unwrap();
    }
    pool.close().await;

    let handle = SqlHandle::open(db.path()).await.unwrap();
    let out = tempfile::tempdir().unwrap();
    let context = TaskRunContext::new(
        std::sync::Arc::new(handle),
        std::sync::Arc::new(TaskSetState::new()),
        std::sync::Arc::new(OutputDirectory::create(out.path()).unwrap()),
        RunConfig {
            output_dir: out.path().to_path_buf(),
            ..Default::default()
        },
    );
    Fixture {
        context,
        out_dir: out.path().to_path_buf(),
        _db: db,
        _out: out,
    }
}
