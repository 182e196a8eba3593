//! Lint pipeline for scripts captured from web traffic.
//!
//! Each captured script becomes a [`LintTask`]: it is written to disk with a
//! provenance header, formatted by a js-beautify compatible tool, linted by an
//! ESLint compatible tool, and summarized as one [`LintResult`] published to a
//! shared [`ResultSink`].

pub mod config;
pub mod detection;
pub mod error;
pub mod parsers;
pub mod pool;
pub mod runners;
pub mod sink;
pub mod task;
pub mod types;

pub use config::LintConfig;
pub use error::{ConfigError, LintError};
pub use pool::WorkerPool;
pub use sink::{ChannelSink, ResultSink, ResultTable};
pub use task::{LintContext, LintTask, TaskState};
pub use types::{LintJob, LintResult, LintStatus};
