use super::Invocation;
use jsl_common::fs_utils::tool_working_dir;
use std::path::{Path, PathBuf};

/// js-beautify compatible formatter, rewriting the file in place.
#[derive(Debug, Clone)]
pub struct Beautifier {
    bin: PathBuf,
}

impl Beautifier {
    pub fn new(bin: PathBuf) -> Self {
        Self { bin }
    }

    /// `<bin> -f <file> -r`, run from the formatter's own directory.
    pub fn invocation(&self, file: &Path, fallback_dir: &Path) -> Invocation {
        Invocation {
            tool: "js-beautify".into(),
            program: self.bin.clone(),
            args: vec!["-f".into(), file.display().to_string(), "-r".into()],
            working_dir: tool_working_dir(&self.bin, fallback_dir),
        }
    }
}
