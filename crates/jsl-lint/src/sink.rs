use crate::types::LintResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Destination for finished task results. Called from any number of tasks
/// at once.
pub trait ResultSink: Send + Sync {
    fn append(&self, result: LintResult);
}

impl<S: ResultSink + ?Sized> ResultSink for Arc<S> {
    fn append(&self, result: LintResult) {
        (**self).append(result);
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &S {
    fn append(&self, result: LintResult) {
        (**self).append(result);
    }
}

/// In-memory result set kept in arrival order.
#[derive(Debug, Default)]
pub struct ResultTable {
    rows: Mutex<Vec<LintResult>>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of every result, in arrival order.
    pub fn snapshot(&self) -> Vec<LintResult> {
        self.rows().clone()
    }

    /// Results whose host, url or status contains `query` (case-insensitive).
    /// An empty query returns everything.
    pub fn search(&self, query: &str) -> Vec<LintResult> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.snapshot();
        }
        self.rows()
            .iter()
            .filter(|r| r.matches_lowercase(&query))
            .cloned()
            .collect()
    }

    /// Drop every result. Returns how many were removed.
    pub fn reset(&self) -> usize {
        let mut rows = self.rows();
        let removed = rows.len();
        rows.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    // A panic elsewhere while holding the lock cannot leave a half-written
    // row: rows are pushed whole, so the data is still consistent.
    fn rows(&self) -> MutexGuard<'_, Vec<LintResult>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultSink for ResultTable {
    fn append(&self, result: LintResult) {
        self.rows().push(result);
    }
}

/// Hands results to a consumer on another task or thread (e.g. a display
/// loop) instead of storing them.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<LintResult>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LintResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ResultSink for ChannelSink {
    fn append(&self, result: LintResult) {
        if let Err(e) = self.tx.send(result) {
            tracing::warn!("Result consumer is gone, dropping result for {}", e.0.url);
        }
    }
}
