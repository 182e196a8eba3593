pub mod beautifier;
pub mod eslint;

use crate::error::LintError;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// One launch of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Short tool name used in logs and error messages.
    pub tool: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Space-joined command line, for logging only.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured result of a finished process. A nonzero exit code is a normal
/// result, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Launches external tools and waits for them to exit.
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<RunnerOutput, LintError>;
}

/// Runs tools as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait::async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<RunnerOutput, LintError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if !invocation.working_dir.as_os_str().is_empty() {
            cmd.current_dir(&invocation.working_dir);
        }
        cmd.stdin(Stdio::null());

        tracing::debug!("Executing {}", invocation.command_line());

        let output = cmd.output().await.map_err(|e| LintError::Launch {
            tool: invocation.tool.clone(),
            program: invocation.program.clone(),
            source: e,
        })?;

        Ok(RunnerOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
