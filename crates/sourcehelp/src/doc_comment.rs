//
// doc_comment.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Extracts the documentation comment block written directly above a
// declaration in a user module. The block's free text becomes the summary;
// `@param name text` lines document parameters and may continue on the
// following comment lines.
//

use std::collections::HashMap;

/// Documentation parsed from the comment lines above a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    /// Free text before the first tag; paragraphs separated by blank lines
    pub summary: Option<String>,
    /// `@param` entries: param name -> description
    pub params: HashMap<String, String>,
}

impl DocBlock {
    pub fn param_doc(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn summary_or_empty(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }
}

/// Collect the contiguous comment lines directly above `decl_line`
/// (0-indexed) and parse them. `None` if the line above is not a comment.
pub fn extract_doc_block(
    lines: &[&str],
    decl_line: usize,
    comment_marker: &str,
) -> Option<DocBlock> {
    if comment_marker.is_empty() || decl_line == 0 || decl_line > lines.len() {
        return None;
    }

    let mut start = decl_line;
    while start > 0 && lines[start - 1].trim_start().starts_with(comment_marker) {
        start -= 1;
    }
    if start == decl_line {
        return None;
    }

    let contents: Vec<&str> = lines[start..decl_line]
        .iter()
        .map(|l| strip_marker(l, comment_marker))
        .collect();
    Some(parse_block(&contents))
}

/// Strip the marker and at most one following space.
fn strip_marker<'a>(line: &'a str, comment_marker: &str) -> &'a str {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(comment_marker).unwrap_or(trimmed);
    rest.strip_prefix(' ').unwrap_or(rest).trim_end()
}

fn parse_block(lines: &[&str]) -> DocBlock {
    enum State {
        Summary,
        Param(String),
        OtherTag,
    }

    let mut paragraphs: Vec<Vec<&str>> = vec![Vec::new()];
    let mut params: HashMap<String, String> = HashMap::new();
    let mut state = State::Summary;

    for &content in lines {
        if let Some(tag) = content.strip_prefix('@') {
            state = match tag.strip_prefix("param") {
                Some(rest) if rest.starts_with(|c: char| c == ' ' || c == '\t') => {
                    let (name, desc) = split_first_word(rest);
                    if name.is_empty() {
                        State::OtherTag
                    } else {
                        params.insert(name.to_string(), desc.to_string());
                        State::Param(name.to_string())
                    }
                }
                _ => State::OtherTag,
            };
            continue;
        }

        match &state {
            State::Summary => {
                if content.is_empty() {
                    paragraphs.push(Vec::new());
                } else if let Some(current) = paragraphs.last_mut() {
                    current.push(content.trim());
                }
            }
            State::Param(name) => {
                if content.is_empty() {
                    state = State::OtherTag;
                } else if let Some(desc) = params.get_mut(name) {
                    if !desc.is_empty() {
                        desc.push(' ');
                    }
                    desc.push_str(content.trim());
                }
            }
            State::OtherTag => {}
        }
    }

    let summary = paragraphs
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.join(" "))
        .collect::<Vec<_>>()
        .join("\n\n");

    DocBlock {
        summary: if summary.is_empty() { None } else { Some(summary) },
        params,
    }
}

/// Split a string into the first whitespace-delimited word and the remainder.
fn split_first_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(pos) => (&s[..pos], s[pos..].trim_start()),
        None => (s, ""),
    }
}
