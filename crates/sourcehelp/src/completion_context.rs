//
// completion_context.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Recovers the cursor's structural context from the flattened trailing text
// window: the word being typed, a module qualifier followed by `.`, and the
// innermost enclosing call together with the arguments typed so far.
//
// Everything here is a single right-to-left scan over the text. There is no
// tokenizer and no parse tree, so incomplete input (the normal state while
// typing) never fails; it just yields less context.
//

/// Longest run of characters accepted as a module name before a trailing dot.
pub const MAX_MODULE_NAME_LEN: usize = 20;

/// Enclosing call recovered by [`find_enclosing_call`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameAndParamResult {
    /// Called function, possibly module-qualified (`mod.f`). Empty if the
    /// scan never reached a name.
    pub func_name: String,
    /// Completed arguments in left-to-right order.
    pub params: Vec<String>,
    /// Argument being typed at the cursor (not yet terminated by `,`).
    pub partial_param: String,
}

impl NameAndParamResult {
    /// True when no enclosing call context was found at all.
    pub fn is_empty(&self) -> bool {
        self.func_name.is_empty() && self.params.is_empty() && self.partial_param.is_empty()
    }

    /// Split `func_name` into `(module, name)`. Globals have an empty module.
    pub fn module_and_name(&self) -> (&str, &str) {
        split_qualified_name(&self.func_name)
    }
}

/// Split a possibly module-qualified name at its last `.`.
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((module, func)) => (module, func),
        None => ("", name),
    }
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Characters allowed inside a (possibly module-qualified) function name.
fn is_call_name_char(ch: char) -> bool {
    is_identifier_char(ch) || ch == '.'
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Trim an argument's surrounding whitespace.
///
/// Quotes are left alone: an unterminated `"Fe` must survive as typed so the
/// caller can tell the user is inside a string literal.
fn clean_param(chars: &[char]) -> String {
    collect(chars).trim().to_string()
}

// ---------------------------------------------------------------------------
// Word at end
// ---------------------------------------------------------------------------

/// Return the identifier-like word that ends `text`, or an empty string.
///
/// Scans backward until a word break (`(`, `)`, space, tab). A quote seen
/// before any letter means the text ends inside a string literal, so there is
/// no word. Digits and other characters are kept in the word but only
/// letters and `_` count towards "found a word".
pub fn word_at_end(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut found_letters = false;

    for i in (0..chars.len()).rev() {
        let ch = chars[i];
        if (ch == '"' || ch == '\'') && !found_letters {
            return String::new();
        }
        if matches!(ch, '(' | ')' | ' ' | '\t') {
            if found_letters {
                return collect(&chars[i + 1..]);
            }
            return String::new();
        }
        if is_letter(ch) {
            found_letters = true;
        }
    }

    if found_letters {
        text.to_string()
    } else {
        String::new()
    }
}

// ---------------------------------------------------------------------------
// Module qualifier
// ---------------------------------------------------------------------------

/// If `text` ends with `.`, return the identifier immediately before it.
///
/// Names longer than [`MAX_MODULE_NAME_LEN`] are not treated as module names.
pub fn find_module_name_before_dot(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let Some((&last, before)) = chars.split_last() else {
        return String::new();
    };
    if last != '.' {
        return String::new();
    }

    let mut start = before.len();
    while start > 0 && is_identifier_char(before[start - 1]) {
        start -= 1;
        if before.len() - start > MAX_MODULE_NAME_LEN {
            return String::new();
        }
    }

    collect(&before[start..])
}

// ---------------------------------------------------------------------------
// Enclosing call
// ---------------------------------------------------------------------------

/// Scan `text` right to left for the innermost call whose argument list is
/// still open at the end of the text.
///
/// Bracket depth runs backwards: `)` increases it and `(` decreases it, so the
/// call's own opening parenthesis is the first `(` that drives the depth
/// negative. Commas at depth zero separate this call's arguments; commas
/// inside nested (already closed) calls are part of an argument.
///
/// A `"` toggles string state, except when nothing has been recovered yet:
/// then it is taken to be the opening quote of the literal the cursor is
/// typing (`element("Fe`) and is not treated as entering a string.
/// "Nothing recovered" means no partial, no params and no argument boundary
/// opened yet. Checking only for an empty result would let the first quote
/// after a comma skip its toggle, splitting `f("a,b", ` at the quoted comma.
/// Escaped quotes and quotes inside completed arguments are not handled
/// specially.
///
/// Once past the opening parenthesis, whitespace directly before it is
/// skipped and the name is the run of identifier characters and dots before
/// that; any other character (an operator, `=`, an outer `(`, a comma, or the
/// start of the text) ends it.
pub fn find_enclosing_call(text: &str) -> NameAndParamResult {
    let chars: Vec<char> = text.chars().collect();
    let mut result = NameAndParamResult::default();
    // Discovered right to left, reversed at the end.
    let mut params_rev: Vec<String> = Vec::new();

    let mut in_quotes = false;
    let mut depth: i32 = 0;
    // Right edge (exclusive) of the argument currently being accumulated.
    let mut boundary: Option<usize> = None;
    // Right edge (exclusive) of the function name once the opening paren has
    // been passed.
    let mut name_end: Option<usize> = None;

    let mut i = chars.len();
    while i > 0 {
        i -= 1;
        let ch = chars[i];

        if let Some(end) = name_end {
            if is_call_name_char(ch) {
                continue;
            }
            if (ch == ' ' || ch == '\t') && i + 1 == end {
                // whitespace between name and paren
                name_end = Some(i);
                continue;
            }
            result.func_name = clean_param(&chars[i + 1..end]);
            name_end = None;
            break;
        }

        if ch == '"' {
            let nothing_found = result.partial_param.is_empty()
                && params_rev.is_empty()
                && boundary.is_none();
            if !nothing_found {
                in_quotes = !in_quotes;
            }
            continue;
        }
        if in_quotes {
            continue;
        }

        match ch {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth < 0 {
                    match boundary {
                        Some(right) => params_rev.push(clean_param(&chars[i + 1..right])),
                        None => result.partial_param = clean_param(&chars[i + 1..]),
                    }
                    name_end = Some(i);
                }
            }
            ',' if depth <= 0 => {
                match boundary {
                    Some(right) => params_rev.push(clean_param(&chars[i + 1..right])),
                    None => result.partial_param = clean_param(&chars[i + 1..]),
                }
                boundary = Some(i);
            }
            _ => {}
        }
    }

    // Ran off the start of the text while still collecting the name.
    if let Some(end) = name_end {
        result.func_name = clean_param(&chars[..end]);
    }

    params_rev.reverse();
    result.params = params_rev;
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
