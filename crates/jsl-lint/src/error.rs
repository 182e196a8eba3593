use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LintError {
    #[error("Failed to launch '{tool}' ({program}): {source}")]
    Launch {
        tool: String,
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsafe artifact path: {0}")]
    UnsafePath(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing required config value '{0}'")]
    Missing(&'static str),

    #[error("Cannot make config value '{field}' absolute ({path}): {source}")]
    Absolute {
        field: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Tool '{tool}' not found on PATH (configured as '{name}')")]
    ToolNotFound { tool: &'static str, name: String },
}
