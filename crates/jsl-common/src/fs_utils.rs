use std::path::{Component, Path, PathBuf};

/// Longest component kept by [`sanitize_component`].
pub const MAX_COMPONENT_LEN: usize = 64;

/// Make an arbitrary string safe to use as part of a file name.
///
/// Anything outside `[A-Za-z0-9._-]` becomes `_`, leading dots are stripped so
/// the result can never be `.`/`..` or a hidden file, and the result is cut to
/// [`MAX_COMPONENT_LEN`] characters. Returns `fallback` when nothing is left.
pub fn sanitize_component(raw: &str, fallback: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed: String = cleaned
        .trim_start_matches('.')
        .chars()
        .take(MAX_COMPONENT_LEN)
        .collect();

    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed
    }
}

/// Join a bare file name onto `dir`, ensuring the result stays directly
/// inside `dir` (no separators, no `..`).
pub fn resolve_within_dir(dir: &Path, file_name: &str) -> Result<PathBuf, String> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => {
            return Err(format!(
                "File name '{}' is not a plain name inside '{}'",
                file_name,
                dir.display()
            ))
        }
    }

    let candidate = dir.join(file_name);
    if !is_within_root(dir, &candidate) {
        return Err(format!(
            "Path '{}' escapes directory '{}'",
            file_name,
            dir.display()
        ));
    }
    Ok(candidate)
}

/// Check if `path` is within `root` after normalization.
pub fn is_within_root(root: &Path, path: &Path) -> bool {
    let normalized = normalize_path(path);
    let normalized_root = normalize_path(root);
    normalized.starts_with(&normalized_root)
}

/// Normalize a path by resolving `.` and `..` components without touching the filesystem.
/// Unlike `canonicalize()`, this does not require the path to exist.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                components.pop();
            }
            Component::CurDir => {}
            other => {
                components.push(other);
            }
        }
    }
    components.iter().collect()
}

/// Directory a tool should run from: the executable's own directory, or
/// `fallback` when the path has no usable parent (e.g. a bare name).
pub fn tool_working_dir(executable: &Path, fallback: &Path) -> PathBuf {
    match executable.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => fallback.to_path_buf(),
    }
}
