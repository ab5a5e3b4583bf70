//! Deterministic repair of model replies before JSON parsing.
//!
//! Generated text is not guaranteed to be clean JSON; mechanical damage
//! (code fences, Python-spelled nulls) is repaired here rather than
//! rejected. No model calls, no heuristics beyond the fixed transforms.

/// Strip code-fence markers and fix null spelling.
///
/// Transform order: trim, drop a leading fence (with optional language
/// tag), drop a trailing fence, rewrite `: None`/`:None` to JSON `null`,
/// re-trim.
pub fn sanitize(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // A language tag occupies the remainder of the fence line.
        text = match rest.split_once('\n') {
            Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
            _ => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.replace(": None", ": null")
        .replace(":None", ":null")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: &str = r#"{"kind": "expect_column_values_to_be_between", "parameters": {"column": "price", "min_value": 0, "max_value": null}}"#;

    #[test]
    fn plain_reply_is_only_trimmed() {
        assert_eq!(sanitize(&format!("  {RULE}\n")), RULE);
    }

    #[test]
    fn json_fence_is_stripped() {
        assert_eq!(sanitize(&format!("```json\n{RULE}\n```")), RULE);
    }

    #[test]
    fn bare_fence_is_stripped() {
        assert_eq!(sanitize(&format!("```\n{RULE}\n```")), RULE);
    }

    #[test]
    fn fence_without_newline_is_stripped() {
        assert_eq!(sanitize(&format!("```{RULE}```")), RULE);
    }

    #[test]
    fn python_none_becomes_null() {
        let raw = r#"{"max_value": None, "min_value":None}"#;
        assert_eq!(
            sanitize(raw),
            r#"{"max_value": null, "min_value":null}"#
        );
    }
}
