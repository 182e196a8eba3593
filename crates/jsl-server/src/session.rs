use crate::capture::Capture;
use jsl_common::ScriptMetadata;
use jsl_lint::runners::SystemRunner;
use jsl_lint::{LintConfig, LintContext, LintJob, ResultTable, WorkerPool};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// State shared by the front end: the result table and the pool feeding it.
pub struct Session {
    table: Arc<ResultTable>,
    pool: Mutex<WorkerPool>,
    storage_dir: PathBuf,
}

impl Session {
    pub fn new(config: &LintConfig) -> Self {
        let table = Arc::new(ResultTable::new());
        let ctx = config.context(Arc::new(SystemRunner), table.clone());
        Self::with_context(ctx, table, config.storage_dir.clone(), config.max_concurrency)
    }

    /// `ctx.sink` is expected to feed `table`.
    pub fn with_context(
        ctx: LintContext,
        table: Arc<ResultTable>,
        storage_dir: PathBuf,
        max_concurrency: Option<usize>,
    ) -> Self {
        Self {
            table,
            pool: Mutex::new(WorkerPool::new(Arc::new(ctx), max_concurrency)),
            storage_dir,
        }
    }

    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    /// Schedule a capture for linting; its result shows up in the table once
    /// the task finishes.
    pub async fn submit(&self, capture: Capture) -> ScriptMetadata {
        let metadata = ScriptMetadata::new(capture.host, capture.url);
        let job = LintJob::new(capture.script, metadata.clone(), self.storage_dir.clone());

        let mut pool = self.pool.lock().await;
        pool.reap_finished();
        pool.submit(job);
        tracing::debug!("Queued {} ({} pending)", metadata, pool.pending());
        metadata
    }

    /// Wait for everything submitted so far.
    pub async fn drain(&self) -> usize {
        self.pool.lock().await.join_all().await
    }
}
