use crate::error::LintError;
use crate::parsers::findings::extract_count;
use crate::runners::beautifier::Beautifier;
use crate::runners::eslint::{ESLint, PARSE_ERROR_EXIT_CODE};
use crate::runners::ProcessRunner;
use crate::sink::ResultSink;
use crate::types::{LintJob, LintResult, LintStatus};
use jsl_common::fs_utils::resolve_within_dir;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything the tasks of one session share.
pub struct LintContext {
    pub runner: Arc<dyn ProcessRunner>,
    pub beautifier: Beautifier,
    pub eslint: ESLint,
    /// Where `<base>-out.js` results artifacts go.
    pub output_dir: PathBuf,
    pub sink: Arc<dyn ResultSink>,
}

/// Where a task is in its pipeline. Every task ends in `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Writing,
    Beautifying,
    Linting,
    Extracting,
    Finalizing,
    Done,
}

/// One script's trip through write → beautify → lint → extract → publish.
///
/// A task never fails from the caller's point of view: every problem ends up
/// in the status of the single [`LintResult`] it publishes. A task dropped
/// before it finishes, including one that never started, publishes an error.
pub struct LintTask {
    ctx: Arc<LintContext>,
    job: LintJob,
    state: TaskState,
    guard: PublishGuard,
}

impl LintTask {
    pub fn new(ctx: Arc<LintContext>, job: LintJob) -> Self {
        tracing::debug!(
            "Created lint task for {} (storage: {})",
            job.metadata,
            job.storage_dir.display()
        );
        let guard = PublishGuard {
            sink: Arc::clone(&ctx.sink),
            host: job.metadata.host().to_string(),
            url: job.metadata.url().to_string(),
            published: false,
        };
        Self {
            ctx,
            job,
            state: TaskState::Created,
            guard,
        }
    }

    /// Run the pipeline to completion and publish the result to the sink.
    /// The published result is also returned.
    pub async fn run(mut self) -> LintResult {
        let mut report = StepReport::default();
        self.execute(&mut report).await;

        self.enter(TaskState::Finalizing);
        let result = report.into_result(&self.job);
        match &result.status {
            LintStatus::Error(detail) => {
                tracing::error!("Lint task for {} failed: {}", result.url, detail)
            }
            LintStatus::Warning(detail) => {
                tracing::warn!("Lint task for {} finished with warnings: {}", result.url, detail)
            }
            LintStatus::Clean => {}
        }
        tracing::info!(
            "Linted {}: {} finding(s)",
            self.job.metadata,
            result.finding_count
        );

        self.guard.publish(result.clone());
        self.enter(TaskState::Done);
        result
    }

    async fn execute(&mut self, report: &mut StepReport) {
        self.enter(TaskState::Writing);
        let script_path = match self.write_script().await {
            Ok(path) => path,
            Err(e) => {
                report.error(&e);
                return;
            }
        };

        self.enter(TaskState::Beautifying);
        let invocation = self
            .ctx
            .beautifier
            .invocation(&script_path, &self.job.storage_dir);
        match self.ctx.runner.run(&invocation).await {
            Ok(output) => {
                tracing::debug!("js-beautify output: {}", output.stdout);
                if output.exit_code != 0 {
                    report.warn(format!(
                        "js-beautify exited with code {}: {}",
                        output.exit_code,
                        output.stderr.trim()
                    ));
                }
                report.beautifier_stderr = output.stderr;
            }
            // Formatting is cosmetic; lint the file as written.
            Err(e) => report.error(&e),
        }

        self.enter(TaskState::Linting);
        let invocation = self.ctx.eslint.invocation(&script_path, &self.job.storage_dir);
        let output = match self.ctx.runner.run(&invocation).await {
            Ok(output) => output,
            Err(e) => {
                report.error(&e);
                return;
            }
        };
        match output.exit_code {
            0 | 1 => {}
            PARSE_ERROR_EXIT_CODE => {
                let stderr = output.stderr.trim();
                if stderr.is_empty() {
                    report.warn("eslint could not parse the file (exit code 2)".to_string());
                } else {
                    report.warn(stderr.to_string());
                }
            }
            other => report.warn(format!(
                "eslint exited with code {other}: {}",
                output.stderr.trim()
            )),
        }
        report.linter_stderr = output.stderr;

        self.enter(TaskState::Extracting);
        report.finding_count = extract_count(&output.stdout);
        match self.write_results(&output.stdout).await {
            Ok(path) => tracing::debug!(
                "Results file: {} (input: {})",
                path.display(),
                script_path.display()
            ),
            Err(e) => report.error(&e),
        }
    }

    async fn write_script(&self) -> Result<PathBuf, LintError> {
        let metadata = &self.job.metadata;
        let mut content = metadata.comment_header();
        content.push_str(&self.job.script);
        write_artifact(&self.job.storage_dir, &metadata.storage_file_name(), content).await
    }

    async fn write_results(&self, linter_stdout: &str) -> Result<PathBuf, LintError> {
        let metadata = &self.job.metadata;
        let mut content = metadata.comment_header();
        content.push_str(linter_stdout);
        write_artifact(&self.ctx.output_dir, &metadata.results_file_name(), content).await
    }

    fn enter(&mut self, next: TaskState) {
        tracing::debug!(
            "{}: {:?} -> {:?}",
            self.job.metadata.file_base_name(),
            self.state,
            next
        );
        self.state = next;
    }
}

async fn write_artifact(dir: &Path, file_name: &str, content: String) -> Result<PathBuf, LintError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| LintError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
    let path = resolve_within_dir(dir, file_name).map_err(LintError::UnsafePath)?;
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| LintError::Write {
            path: path.clone(),
            source: e,
        })?;
    Ok(path)
}

/// What the steps of one task ran into.
#[derive(Debug, Default)]
struct StepReport {
    errors: Vec<String>,
    warnings: Vec<String>,
    beautifier_stderr: String,
    linter_stderr: String,
    finding_count: usize,
}

impl StepReport {
    fn error(&mut self, err: &LintError) {
        self.errors.push(err.to_string());
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn into_result(self, job: &LintJob) -> LintResult {
        let status = if !self.errors.is_empty() {
            let mut detail = self.errors.join("\n");
            for stderr in [&self.beautifier_stderr, &self.linter_stderr] {
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    detail.push('\n');
                    detail.push_str(stderr);
                }
            }
            LintStatus::Error(detail)
        } else if !self.warnings.is_empty() {
            LintStatus::Warning(self.warnings.join("; "))
        } else {
            LintStatus::Clean
        };

        LintResult {
            host: job.metadata.host().to_string(),
            url: job.metadata.url().to_string(),
            status,
            finding_count: self.finding_count,
        }
    }
}

/// Publishes a fallback error result if the task is dropped or panics
/// before it published on its own.
struct PublishGuard {
    sink: Arc<dyn ResultSink>,
    host: String,
    url: String,
    published: bool,
}

impl PublishGuard {
    fn publish(&mut self, result: LintResult) {
        self.published = true;
        self.sink.append(result);
    }
}

impl Drop for PublishGuard {
    fn drop(&mut self) {
        if self.published {
            return;
        }
        tracing::error!("Lint task for {} aborted before completion", self.url);
        self.published = true;
        self.sink.append(LintResult {
            host: std::mem::take(&mut self.host),
            url: std::mem::take(&mut self.url),
            status: LintStatus::Error("Task aborted before completion".into()),
            finding_count: 0,
        });
    }
}
