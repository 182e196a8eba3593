use crate::fs_utils::sanitize_component;
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::fmt;

/// Extension for stored scripts and results artifacts.
pub const SCRIPT_EXTENSION: &str = "js";

/// Hex digits of the URL digest kept in the derived file name.
const DIGEST_LEN: usize = 12;

/// Provenance of one captured script.
///
/// Built once per capture and only read afterwards. The file base name is
/// derived from `host` and `url` so the same script always lands in the same
/// file, while different URLs never share one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptMetadata {
    host: String,
    url: String,
    file_base_name: String,
}

impl ScriptMetadata {
    pub fn new(host: impl Into<String>, url: impl Into<String>) -> Self {
        let host = host.into();
        let url = url.into();
        let file_base_name = derive_base_name(&host, &url);
        Self {
            host,
            url,
            file_base_name,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn file_base_name(&self) -> &str {
        &self.file_base_name
    }

    /// `<base>.js`, the stored (and later beautified) script.
    pub fn storage_file_name(&self) -> String {
        format!("{}.{SCRIPT_EXTENSION}", self.file_base_name)
    }

    /// `<base>-out.js`, the annotated linter output.
    pub fn results_file_name(&self) -> String {
        format!("{}-out.{SCRIPT_EXTENSION}", self.file_base_name)
    }

    /// Block comment prepended to every artifact so it can be traced back to
    /// the request it came from.
    pub fn comment_header(&self) -> String {
        format!(
            "/*\n * Host: {}\n * URL: {}\n */\n",
            escape_comment(&self.host),
            escape_comment(&self.url)
        )
    }
}

impl fmt::Display for ScriptMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.file_base_name)
    }
}

fn derive_base_name(host: &str, url: &str) -> String {
    let digest = format!("{:x}", Sha1::digest(url.as_bytes()));
    format!(
        "{}_{}_{}",
        sanitize_component(host, "host"),
        sanitize_component(&url_stem(url), "script"),
        &digest[..DIGEST_LEN]
    )
}

/// Last path segment of `url` without query, fragment or extension.
fn url_stem(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    // Drop the authority; a bare host has no path.
    let path = path.split_once('/').map_or("", |(_, p)| p);

    let segment = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or_default();
    match segment.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => segment.to_string(),
    }
}

fn escape_comment(value: &str) -> String {
    value.replace("*/", "*\\/")
}
