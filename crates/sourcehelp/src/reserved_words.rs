//! Reserved words of the expression language.
//!
//! These seed the default keyword completions, and user modules never
//! register a function, constant or module under one of them.

/// Default keyword list, in the order completions present them.
pub const RESERVED_WORDS: &[&str] = &[
    "if", "then", "else", "elseif", "end", "for", "in", "do", "while", "repeat", "until",
    "function", "local", "return", "break", "and", "or", "not", "true", "false", "nil",
];

/// The default keywords as owned strings, for seeding a registry.
pub fn default_keywords() -> Vec<String> {
    RESERVED_WORDS.iter().map(|w| w.to_string()).collect()
}

/// Check if a name is a reserved word. Case-sensitive.
///
/// # Examples
///
/// ```
/// use sourcehelp::reserved_words::is_reserved_word;
///
/// assert!(is_reserved_word("if"));
/// assert!(is_reserved_word("nil"));
/// assert!(!is_reserved_word("element"));
/// assert!(!is_reserved_word("IF"));
/// ```
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reserved_word_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(RESERVED_WORDS)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_reserved_words_return_true(word in reserved_word_strategy()) {
            prop_assert!(is_reserved_word(word));
        }

        /// Uppercased keywords are ordinary identifiers.
        #[test]
        fn prop_uppercase_is_not_reserved(word in reserved_word_strategy()) {
            prop_assert!(!is_reserved_word(&word.to_uppercase()));
        }
    }

    #[test]
    fn test_default_keywords_match_list() {
        let keywords = default_keywords();
        assert_eq!(keywords.len(), RESERVED_WORDS.len());
        assert_eq!(keywords[0], "if");
    }

    #[test]
    fn test_builtin_names_not_reserved() {
        assert!(!is_reserved_word("element"));
        assert!(!is_reserved_word("max"));
        assert!(!is_reserved_word(""));
    }
}
