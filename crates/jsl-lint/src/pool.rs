use crate::task::{LintContext, LintTask};
use crate::types::LintJob;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs lint tasks in parallel on the tokio runtime.
///
/// Tasks publish their own results; the pool only tracks them so callers can
/// wait for a batch to drain.
pub struct WorkerPool {
    ctx: Arc<LintContext>,
    permits: Option<Arc<Semaphore>>,
    tasks: JoinSet<()>,
}

impl WorkerPool {
    /// `max_concurrency` of `None` (or zero) leaves the pool unbounded.
    pub fn new(ctx: Arc<LintContext>, max_concurrency: Option<usize>) -> Self {
        let permits = max_concurrency
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n)));
        Self {
            ctx,
            permits,
            tasks: JoinSet::new(),
        }
    }

    /// Schedule one job. Returns immediately.
    pub fn submit(&mut self, job: LintJob) {
        let task = LintTask::new(Arc::clone(&self.ctx), job);
        let permits = self.permits.clone();
        self.tasks.spawn(async move {
            // The semaphore is never closed.
            let _permit = match permits {
                Some(sem) => sem.acquire_owned().await.ok(),
                None => None,
            };
            task.run().await;
        });
    }

    /// Number of submitted tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Reap tasks that already finished without waiting for the rest.
    pub fn reap_finished(&mut self) -> usize {
        let mut reaped = 0;
        while let Some(joined) = self.tasks.try_join_next() {
            log_join(joined);
            reaped += 1;
        }
        reaped
    }

    /// Wait for every submitted task. Returns how many finished.
    pub async fn join_all(&mut self) -> usize {
        let mut finished = 0;
        while let Some(joined) = self.tasks.join_next().await {
            log_join(joined);
            finished += 1;
        }
        finished
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    // A panicking task has already published its fallback result.
    if let Err(e) = joined {
        tracing::error!("Lint task did not complete: {e}");
    }
}
