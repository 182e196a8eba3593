use jsl_common::ScriptMetadata;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Text shown for a task whose pipeline ran cleanly.
pub const HEALTHY_TAG: &str = "Beautified";

/// One captured script waiting to be linted.
#[derive(Debug, Clone)]
pub struct LintJob {
    pub script: String,
    pub metadata: ScriptMetadata,
    pub storage_dir: PathBuf,
}

impl LintJob {
    pub fn new(script: impl Into<String>, metadata: ScriptMetadata, storage_dir: PathBuf) -> Self {
        Self {
            script: script.into(),
            metadata,
            storage_dir,
        }
    }
}

/// Health of the pipeline for one task. Says nothing about how many findings
/// the linter reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintStatus {
    Clean,
    /// Completed, but a tool reported something non-fatal (e.g. the linter
    /// could not parse the file).
    Warning(String),
    /// A step failed. Holds the error chain and any captured stderr.
    Error(String),
}

impl LintStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, LintStatus::Error(_))
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, LintStatus::Clean)
    }
}

impl fmt::Display for LintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintStatus::Clean => f.write_str(HEALTHY_TAG),
            LintStatus::Warning(detail) => write!(f, "{HEALTHY_TAG} with warnings: {detail}"),
            LintStatus::Error(detail) => f.write_str(detail),
        }
    }
}

impl Serialize for LintStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of one task, as published to a result sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintResult {
    pub host: String,
    pub url: String,
    pub status: LintStatus,
    pub finding_count: usize,
}

impl LintResult {
    /// Case-insensitive substring match over host, url and status text.
    /// `query` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, query: &str) -> bool {
        self.host.to_lowercase().contains(query)
            || self.url.to_lowercase().contains(query)
            || self.status.to_string().to_lowercase().contains(query)
    }
}
