use serde::Deserialize;

/// A script captured from traffic, as handed over by the proxy side.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Capture {
    pub host: String,
    pub url: String,
    pub script: String,
}

/// Parse JSON-lines captures. Blank lines are skipped; malformed lines are
/// logged and skipped.
pub fn parse_captures(text: &str) -> Vec<Capture> {
    let mut captures = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Capture>(line) {
            Ok(capture) => captures.push(capture),
            Err(e) => tracing::warn!("Skipping capture on line {}: {e}", index + 1),
        }
    }
    captures
}
