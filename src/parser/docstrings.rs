/// Text of a Python string literal without prefix and quotes, trimmed.
///
/// Handles `r`/`b`/`u`/`f` prefixes and single or triple quoting. Escape
/// sequences are left as written.
pub fn strip_string_literal(literal: &str) -> String {
    let unprefixed = literal.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    let inner = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|quote| {
            unprefixed
                .strip_prefix(quote)
                .map(|rest| rest.strip_suffix(quote).unwrap_or(rest))
        })
        .unwrap_or(unprefixed);
    inner.trim().to_string()
}

/// Contiguous `#` comment block ending on the line right above `row`.
///
/// `row` is 0-based. A blank line or a code line ends the block.
pub(crate) fn preceding_comment_block<S: AsRef<str>>(lines: &[S], row: usize) -> Option<String> {
    let block: Vec<&str> = lines[..row.min(lines.len())]
        .iter()
        .rev()
        .map(|line| line.as_ref().trim())
        .take_while(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim())
        .collect();

    if block.is_empty() {
        return None;
    }
    let text = block.into_iter().rev().collect::<Vec<_>>().join("\n");
    Some(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_string_literal() {
        assert_eq!(strip_string_literal(r#""""  Add two numbers.  """"#), "Add two numbers.");
        assert_eq!(strip_string_literal("'short'"), "short");
        assert_eq!(strip_string_literal(r#"r"raw \d""#), r"raw \d");
        assert_eq!(strip_string_literal("''''''"), "");
    }

    #[test]
    fn test_preceding_comment_block_stops_at_blank_line() {
        let lines = vec![
            "# unrelated",
            "",
            "# Compute the total",
            "# of all items.",
            "def total(items):",
        ];
        assert_eq!(
            preceding_comment_block(&lines, 4).as_deref(),
            Some("Compute the total\nof all items.")
        );
        assert_eq!(preceding_comment_block(&lines, 1), Some("unrelated".to_string()));
        assert_eq!(preceding_comment_block(&lines, 0), None);
    }
}
