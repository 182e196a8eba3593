use super::Invocation;
use jsl_common::fs_utils::tool_working_dir;
use std::path::{Path, PathBuf};

/// Output format requested when none is configured. Its findings are
/// separated by two blank lines, which is what the finding extractor expects.
pub const DEFAULT_FORMAT: &str = "codeframe";

/// Exit code ESLint uses when it could not lint a file at all (parse or
/// configuration problem).
pub const PARSE_ERROR_EXIT_CODE: i32 = 2;

#[derive(Debug, Clone)]
pub struct ESLint {
    bin: PathBuf,
    config: PathBuf,
    format: String,
}

impl ESLint {
    pub fn new(bin: PathBuf, config: PathBuf) -> Self {
        Self {
            bin,
            config,
            format: DEFAULT_FORMAT.to_string(),
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Lint one file with the configured rules only: inline `eslint-disable`
    /// directives in captured scripts are ignored.
    pub fn invocation(&self, file: &Path, fallback_dir: &Path) -> Invocation {
        Invocation {
            tool: "eslint".into(),
            program: self.bin.clone(),
            args: vec![
                "-c".into(),
                self.config.display().to_string(),
                "-f".into(),
                self.format.clone(),
                "--no-color".into(),
                "--no-inline-config".into(),
                file.display().to_string(),
            ],
            working_dir: tool_working_dir(&self.bin, fallback_dir),
        }
    }
}
