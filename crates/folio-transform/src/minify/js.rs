//! Conservative compaction of inline scripts.

/// Strip indentation and blank lines.
///
/// Scripts containing template literals are only trimmed, since their
/// line structure may be part of a string.
pub(super) fn minify(source: &str) -> String {
    if source.contains('`') {
        return source.trim().to_owned();
    }
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compact a JSON script body, or `None` to leave it as authored.
pub(super) fn minify_json(source: &str) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(source) {
        Ok(value) => value,
        Err(error) => {
            tracing::debug!(error = %error, "Inline JSON is not valid, leaving as is");
            return None;
        }
    };
    let compact = serde_json::to_string(&value).ok()?;
    // Unescaped `</` could close the script element early.
    if compact.contains("</") {
        return None;
    }
    Some(compact)
}
