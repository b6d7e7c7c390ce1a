//
// flatten.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Strips trailing line comments and joins the remaining lines into a single
// string so the backward scanner can treat a multi-line window as one run
// of text.
//

use crate::error::ConfigurationError;

/// Remove everything from the first `comment_marker` on each line, then join
/// the lines with a single space.
///
/// The marker is matched literally, so a marker inside a string literal still
/// truncates the line. The joining space keeps tokens on adjacent lines from
/// running together (`a\nb` flattens to `a b`, not `ab`).
pub fn flatten(text: &str, comment_marker: &str) -> Result<String, ConfigurationError> {
    if comment_marker.is_empty() {
        return Err(ConfigurationError::EmptyCommentMarker);
    }

    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| match line.find(comment_marker) {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect();

    Ok(lines.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_marker_rejected() {
        assert_eq!(
            flatten("a(1)", ""),
            Err(ConfigurationError::EmptyCommentMarker)
        );
    }

    #[test]
    fn test_strips_trailing_comment() {
        let out = flatten("x = element(\"Fe\") // iron\ny = 2", "//").unwrap();
        assert_eq!(out, "x = element(\"Fe\")  y = 2");
    }

    #[test]
    fn test_whole_line_comment_becomes_blank() {
        let out = flatten("// header\nf(a,\n  b", "//").unwrap();
        assert_eq!(out, " f(a,   b");
    }

    #[test]
    fn test_first_marker_wins() {
        let out = flatten("a -- b -- c", "--").unwrap();
        assert_eq!(out, "a ");
    }

    #[test]
    fn test_multi_char_marker_partial_match_kept() {
        let out = flatten("a / b", "//").unwrap();
        assert_eq!(out, "a / b");
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(flatten("", "//").unwrap(), "");
    }

    #[test]
    fn test_crlf_carriage_return_kept_in_line() {
        // Only '\n' splits lines; '\r' is ordinary whitespace to the scanner.
        let out = flatten("a\r\nb", "//").unwrap();
        assert_eq!(out, "a\r b");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Text without the marker only has its newlines replaced.
        #[test]
        fn prop_marker_free_text_only_loses_newlines(s in "[a-z0-9(),\" \n]{0,60}") {
            let out = flatten(&s, "//").unwrap();
            prop_assert_eq!(out, s.replace('\n', " "));
        }

        /// Flattened output never contains a newline or the marker.
        #[test]
        fn prop_output_is_single_line_without_marker(s in "[a-z/#(), \n]{0,60}") {
            let out = flatten(&s, "#").unwrap();
            prop_assert!(!out.contains('\n'));
            prop_assert!(!out.contains('#'));
        }
    }
}
