use crate::config::YamlfixConfig;

/// Document start marker
const DOCUMENT_START: &str = "---";

/// Result of normalizing one YAML source
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeResult {
    pub original: String,
    pub content: String,
}

impl NormalizeResult {
    pub fn has_changes(&self) -> bool {
        self.original != self.content
    }
}

/// Apply whitespace-level fixes to YAML text.
///
/// Line endings become LF, leading blank lines and trailing whitespace are
/// removed, the text ends with exactly one newline, and a `---` marker is
/// added when `explicit_start` is set.
pub fn normalize_content(content: &str, config: &YamlfixConfig) -> NormalizeResult {
    let mut result = normalize_line_endings(content);
    result = remove_trailing_whitespace(&result);
    result = remove_leading_blank_lines(&result);

    if config.explicit_start {
        result = ensure_document_start(&result);
    }

    result = normalize_eof_newline(&result);

    NormalizeResult {
        original: content.to_string(),
        content: result,
    }
}

fn normalize_line_endings(content: &str) -> String {
    // First convert CRLF to LF, then CR to LF
    content.replace("\r\n", "\n").replace('\r', "\n")
}

fn remove_trailing_whitespace(content: &str) -> String {
    content
        .lines()
        .map(|line| line.trim_end_matches([' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}

fn remove_leading_blank_lines(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let first_non_blank = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());

    lines
        .get(first_non_blank..)
        .map_or(String::new(), |rest| rest.join("\n"))
}

fn is_document_start(line: &str) -> bool {
    line == DOCUMENT_START
        || line
            .strip_prefix(DOCUMENT_START)
            .is_some_and(|rest| rest.starts_with([' ', '\t']))
}

/// Add `---` before the first content line unless it is already there.
///
/// Comments and directives (`%YAML`) may precede the marker.
fn ensure_document_start(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let first_content = lines
        .iter()
        .position(|line| !line.starts_with('#') && !line.starts_with('%'));

    match first_content {
        Some(idx) if is_document_start(lines[idx]) => content.to_string(),
        Some(idx) if lines[..idx].iter().any(|line| line.starts_with('%')) => {
            // Directives require an explicit marker; leave them alone.
            content.to_string()
        }
        Some(idx) => {
            let mut fixed: Vec<&str> = Vec::with_capacity(lines.len() + 1);
            fixed.extend_from_slice(&lines[..idx]);
            fixed.push(DOCUMENT_START);
            fixed.extend_from_slice(&lines[idx..]);
            fixed.join("\n")
        }
        None => content.to_string(),
    }
}

fn normalize_eof_newline(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    let trimmed = content.trim_end_matches('\n');
    format!("{trimmed}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_marker() -> YamlfixConfig {
        YamlfixConfig {
            explicit_start: false,
            ..YamlfixConfig::default()
        }
    }

    #[test]
    fn test_add_eof_newline_when_missing() {
        let result = normalize_content("a: 1", &no_marker());
        assert_eq!(result.content, "a: 1\n");
        assert!(result.has_changes());
    }

    #[test]
    fn test_normalize_multiple_trailing_newlines() {
        let result = normalize_content("a: 1\nb: 2\n\n\n", &no_marker());
        assert_eq!(result.content, "a: 1\nb: 2\n");
    }

    #[test]
    fn test_crlf_to_lf() {
        let result = normalize_content("a: 1\r\nb: 2\r\n", &no_marker());
        assert_eq!(result.content, "a: 1\nb: 2\n");
    }

    #[test]
    fn test_trailing_whitespace_removed() {
        let result = normalize_content("a: 1   \nb:\t\n  - x \n", &no_marker());
        assert_eq!(result.content, "a: 1\nb:\n  - x\n");
    }

    #[test]
    fn test_leading_blank_lines_removed() {
        let result = normalize_content("\n  \n\na: 1\n", &no_marker());
        assert_eq!(result.content, "a: 1\n");
    }

    #[test]
    fn test_inner_blank_lines_kept() {
        let result = normalize_content("a: 1\n\nb: 2\n", &no_marker());
        assert_eq!(result.content, "a: 1\n\nb: 2\n");
        assert!(!result.has_changes());
    }

    #[test]
    fn test_explicit_start_added() {
        let result = normalize_content("a: 1\n", &YamlfixConfig::default());
        assert_eq!(result.content, "---\na: 1\n");
    }

    #[test]
    fn test_explicit_start_after_leading_comment() {
        let result = normalize_content("# header\na: 1\n", &YamlfixConfig::default());
        assert_eq!(result.content, "# header\n---\na: 1\n");
    }

    #[test]
    fn test_explicit_start_kept_when_present() {
        for input in ["---\na: 1\n", "--- # doc\na: 1\n", "# c\n---\na: 1\n"] {
            let result = normalize_content(input, &YamlfixConfig::default());
            assert_eq!(result.content, input);
        }
    }

    #[test]
    fn test_directive_left_alone() {
        let input = "%YAML 1.2\n---\na: 1\n";
        let result = normalize_content(input, &YamlfixConfig::default());
        assert_eq!(result.content, input);
    }

    #[test]
    fn test_empty_content_stays_empty() {
        let result = normalize_content("", &YamlfixConfig::default());
        assert_eq!(result.content, "");
        assert!(!result.has_changes());
    }

    #[test]
    fn test_comment_only_content_gets_no_marker() {
        let result = normalize_content("# only a comment\n", &YamlfixConfig::default());
        assert_eq!(result.content, "# only a comment\n");
    }
}
