use crate::detection::resolve_tool;
use crate::error::ConfigError;
use crate::runners::beautifier::Beautifier;
use crate::runners::eslint::{ESLint, DEFAULT_FORMAT};
use crate::runners::ProcessRunner;
use crate::sink::ResultSink;
use crate::task::LintContext;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file as written on disk. Every field is optional here so missing
/// values can be reported by name.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    beautifier_path: Option<String>,
    eslint_path: Option<String>,
    eslint_config_path: Option<String>,
    output_dir: Option<String>,
    storage_dir: Option<String>,
    eslint_format: Option<String>,
    max_concurrency: Option<usize>,
}

/// Validated settings for a lint session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    pub beautifier_path: PathBuf,
    pub eslint_path: PathBuf,
    pub eslint_config_path: PathBuf,
    pub output_dir: PathBuf,
    /// Where captured scripts are written; defaults to `output_dir`.
    pub storage_dir: PathBuf,
    pub eslint_format: String,
    pub max_concurrency: Option<usize>,
}

impl LintConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Relative paths are resolved against the current directory.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(text)?;

        let beautifier_path = resolve_tool(
            "beautifier_path",
            &required("beautifier_path", raw.beautifier_path)?,
        )?;
        let beautifier_path = absolute("beautifier_path", beautifier_path)?;
        let eslint_path = resolve_tool("eslint_path", &required("eslint_path", raw.eslint_path)?)?;
        let eslint_path = absolute("eslint_path", eslint_path)?;
        let eslint_config_path = absolute(
            "eslint_config_path",
            PathBuf::from(required("eslint_config_path", raw.eslint_config_path)?),
        )?;
        let output_dir = absolute(
            "output_dir",
            PathBuf::from(required("output_dir", raw.output_dir)?),
        )?;
        let storage_dir = match raw.storage_dir.filter(|s| !s.trim().is_empty()) {
            Some(dir) => absolute("storage_dir", PathBuf::from(dir))?,
            None => output_dir.clone(),
        };
        let eslint_format = raw
            .eslint_format
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string());

        Ok(Self {
            beautifier_path,
            eslint_path,
            eslint_config_path,
            output_dir,
            storage_dir,
            eslint_format,
            max_concurrency: raw.max_concurrency,
        })
    }

    /// Shared task context built from this config.
    pub fn context(
        &self,
        runner: Arc<dyn ProcessRunner>,
        sink: Arc<dyn ResultSink>,
    ) -> LintContext {
        LintContext {
            runner,
            beautifier: Beautifier::new(self.beautifier_path.clone()),
            eslint: ESLint::new(self.eslint_path.clone(), self.eslint_config_path.clone())
                .with_format(self.eslint_format.clone()),
            output_dir: self.output_dir.clone(),
            sink,
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(field)),
    }
}

fn absolute(field: &'static str, path: PathBuf) -> Result<PathBuf, ConfigError> {
    std::path::absolute(&path).map_err(|e| ConfigError::Absolute {
        field,
        path,
        source: e,
    })
}
