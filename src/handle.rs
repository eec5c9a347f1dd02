//! The shared run handle: the expensively-acquired connection resource.
//!
//! A [`Handle`] is opened once per run by the connector, shared read-only by
//! every task, and closed exactly once when the run ends. Tasks never close
//! or reconfigure it; a task failure leaves the handle untouched.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::any::Any;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{HandleError, Result};

/// The run-scoped connection/session resource shared by all tasks.
///
/// Implementations expose whatever capability object their task family
/// needs; tasks recover it by downcasting through [`Handle::as_any`].
#[async_trait]
pub trait Handle: Send + Sync {
    /// The concrete handle, for capability downcasting by tasks.
    fn as_any(&self) -> &(dyn Any + Send + Sync);

    /// Release the underlying resource.
    ///
    /// Idempotent: closing twice, or closing after a partially failed open,
    /// must succeed quietly.
    async fn close(&self) -> Result<()>;
}

/// SQL database handle over a connection pool.
///
/// Concurrent read use by multiple tasks is safe: the pool hands each task
/// an independent connection.
#[derive(Debug)]
pub struct SqlHandle {
    pool: SqlitePool,
    closed: AtomicBool,
}

impl SqlHandle {
    /// Open a handle on the database file at `path`.
    ///
    /// The source system is never written to; connections are opened
    /// read-only.
    ///
    /// # Errors
    ///
    /// Returns [`HandleError::OpenFailed`], which is fatal to the whole run.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| {
                HandleError::OpenFailed(format!("failed to parse database path: {}", e))
            })?
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| HandleError::OpenFailed(format!("failed to connect: {}", e)))?;

        tracing::info!(path = %path.display(), "Opened SQL handle");
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool, taking over its lifecycle.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            closed: AtomicBool::new(false),
        }
    }

    /// The connection factory tasks draw from.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Handle for SqlHandle {
    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.pool.close().await;
            tracing::info!("Closed SQL handle");
        }
        Ok(())
    }
}
