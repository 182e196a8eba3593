use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// One finding per block: any text, matched lazily across lines, up to the
/// next run of three newlines (two blank lines).
static FINDING_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(.*?)\n\n\n").expect("finding block pattern is valid")
});

/// Count findings in linter output by counting block boundaries.
///
/// Individual findings are not parsed. Output that never reaches a boundary
/// counts as zero; this never fails.
pub fn extract_count(output: &str) -> usize {
    if output.trim().is_empty() {
        return 0;
    }
    FINDING_BLOCK.find_iter(&normalize_newlines(output)).count()
}

fn normalize_newlines(output: &str) -> Cow<'_, str> {
    if output.contains('\r') {
        Cow::Owned(output.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(output)
    }
}
