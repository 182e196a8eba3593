use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Resolve a configured tool to an executable path.
///
/// Values containing a path separator are taken as-is (a missing file then
/// surfaces as a launch error when the task runs). Bare names are looked up
/// on `PATH`.
pub fn resolve_tool(tool: &'static str, configured: &str) -> Result<PathBuf, ConfigError> {
    let configured = configured.trim();
    if configured.is_empty() {
        return Err(ConfigError::Missing(tool));
    }

    let path = Path::new(configured);
    if path.components().count() > 1 || path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    find_bin(configured).ok_or_else(|| ConfigError::ToolNotFound {
        tool,
        name: configured.to_string(),
    })
}

fn find_bin(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
