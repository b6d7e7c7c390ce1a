//
// handlers.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Turns a trailing text window into completion items, signature help or
// hover text. The window is flattened, scanned backward, and the scan result
// is resolved against the registry.
//

use std::collections::HashSet;

use crate::completion_context::{
    find_enclosing_call, find_module_name_before_dot, split_qualified_name, word_at_end,
};
use crate::error::ConfigurationError;
use crate::flatten::flatten;
use crate::parameter_resolver::ValueLists;
use crate::source_help::{CompletionItem, CompletionKind, SignatureHelp, SourceHelp};

// ============================================================================
// Completion
// ============================================================================

/// Completion items for the cursor at the end of `window`.
///
/// Precedence, first match wins:
/// 1. inside a known call whose active parameter has candidate values: those
///    values as quoted literals,
/// 2. right after `module.` for a registered module: that module's functions
///    and constants,
/// 3. everything global: functions, constants, module names and keywords.
pub fn completion(
    help: &SourceHelp,
    window: &str,
    comment_marker: &str,
    value_lists: &ValueLists,
) -> Result<Vec<CompletionItem>, ConfigurationError> {
    let text = flatten(window, comment_marker)?;

    let call = find_enclosing_call(&text);
    if !call.is_empty() {
        let (module, name) = call.module_and_name();
        if let Some(sig) = help.build_signature_help(module, name, &call.params, value_lists) {
            if !sig.active_param_possible_values.is_empty() {
                log::trace!(
                    "Value completions for {} parameter {}",
                    sig.func_name,
                    sig.active_param_index
                );
                return Ok(value_completions(
                    &sig.active_param_possible_values,
                    &call.partial_param,
                ));
            }
        }
    }

    let module = find_module_name_before_dot(&text);
    if !module.is_empty() && help.has_module(&module) {
        return Ok(module_completions(help, &module));
    }

    Ok(global_completions(help))
}

/// Render candidate values as string literals. When the user has only typed
/// the opening quote, the inserted text supplies just the value and the
/// closing quote.
fn value_completions(values: &[String], partial_param: &str) -> Vec<CompletionItem> {
    let open_quote = match partial_param {
        "\"" => Some('"'),
        "'" => Some('\''),
        _ => None,
    };

    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .map(|value| {
            let insert_text = match open_quote {
                Some(q) => format!("{}{}", value, q),
                None => format!("\"{}\"", value),
            };
            CompletionItem {
                label: value.clone(),
                doc: None,
                insert_text,
                kind: CompletionKind::EnumMember,
            }
        })
        .collect()
}

fn constant_items(help: &SourceHelp, module_name: &str) -> Vec<CompletionItem> {
    let group = help.list_constants(module_name);
    let mut items: Vec<CompletionItem> = group
        .iter()
        .map(|(name, doc)| {
            let doc = if doc.is_empty() { None } else { Some(doc.to_string()) };
            CompletionItem::new(name, doc, CompletionKind::Constant)
        })
        .collect();
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items
}

fn module_completions(help: &SourceHelp, module_name: &str) -> Vec<CompletionItem> {
    let mut items = help.list_functions(module_name);
    items.extend(constant_items(help, module_name));
    dedup_by_label(items)
}

fn global_completions(help: &SourceHelp) -> Vec<CompletionItem> {
    let mut items = help.list_functions("");
    items.extend(constant_items(help, ""));
    items.extend(help.list_modules(""));

    // Keywords are added separately; a registered name that collides with one
    // is not offered as an identifier.
    let keywords: HashSet<&str> = help.keywords().iter().map(String::as_str).collect();
    items.retain(|item| !keywords.contains(item.label.as_str()));
    items.extend(
        help.keywords()
            .iter()
            .map(|kw| CompletionItem::new(kw.clone(), None, CompletionKind::Keyword)),
    );

    dedup_by_label(items)
}

/// Keep the first item for each label.
fn dedup_by_label(items: Vec<CompletionItem>) -> Vec<CompletionItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.label.clone()))
        .collect()
}

// ============================================================================
// Signature help
// ============================================================================

/// Signature help for the innermost open call at the end of `window`.
pub fn signature_help(
    help: &SourceHelp,
    window: &str,
    comment_marker: &str,
    value_lists: &ValueLists,
) -> Result<Option<SignatureHelp>, ConfigurationError> {
    let text = flatten(window, comment_marker)?;
    let call = find_enclosing_call(&text);
    if call.is_empty() {
        return Ok(None);
    }
    let (module, name) = call.module_and_name();
    Ok(help.build_signature_help(module, name, &call.params, value_lists))
}

// ============================================================================
// Hover
// ============================================================================

/// Documentation for the word ending `window`: a function, a constant or a
/// module name, tried in that order.
pub fn hover(
    help: &SourceHelp,
    window: &str,
    comment_marker: &str,
) -> Result<Option<String>, ConfigurationError> {
    let text = flatten(window, comment_marker)?;
    let word = word_at_end(&text);
    if word.is_empty() {
        return Ok(None);
    }

    let (module, name) = split_qualified_name(&word);

    if let Some(func) = help.get_function(module, name) {
        let mut out = func.signature();
        if !func.doc.is_empty() {
            out.push_str("\n\n");
            out.push_str(&func.doc);
        }
        return Ok(Some(out));
    }

    if let Some(doc) = help.list_constants(module).get(name) {
        return Ok(Some(if doc.is_empty() {
            word.clone()
        } else {
            doc.to_string()
        }));
    }

    if help.has_module(&word) {
        return Ok(Some(format!("module {}", word)));
    }

    Ok(None)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter_resolver::{unquote, ParameterDescriptor};
    use crate::source_help::{ConstantGroup, FunctionDescriptor};

    fn registry() -> SourceHelp {
        let mut help = SourceHelp::new(vec!["if".to_string(), "end".to_string()]);
        help.add(
            FunctionDescriptor::new("", "element", "Element map", "builtin").with_params(vec![
                ParameterDescriptor::with_resolver("elementFormula", "Element", |_, lists| {
                    lists.get("elements").cloned().unwrap_or_default()
                }),
                ParameterDescriptor::with_resolver("column", "Column", |args, _| {
                    match args.first().map(|a| unquote(a)) {
                        Some("Fe") => vec!["%".to_string(), "%-as-mmol".to_string()],
                        _ => Vec::new(),
                    }
                }),
                ParameterDescriptor::new("detector", "Detector"),
            ]),
        );
        help.add(FunctionDescriptor::new("", "max", "Larger of two", "builtin").with_params(
            vec![
                ParameterDescriptor::new("a", ""),
                ParameterDescriptor::new("b", ""),
            ],
        ));
        help.add(FunctionDescriptor::new("Geo", "dist", "Distance", "user:Geo"));
        help.set_constants("", [("pi", "3.14159")].into_iter().collect());
        help.set_constants("Geo", [("ORIGIN", "Zero point")].into_iter().collect());
        help
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_parameter_value_completions() {
        let help = registry();
        let items = completion(&help, "element(\"Fe\", \"", "//", &ValueLists::new()).unwrap();
        assert_eq!(labels(&items), vec!["%", "%-as-mmol"]);
        assert!(items.iter().all(|i| i.kind == CompletionKind::EnumMember));
        // Opening quote already typed: only the value and closing quote.
        assert_eq!(items[0].insert_text, "%\"");
    }

    #[test]
    fn test_parameter_values_without_open_quote() {
        let help = registry();
        let items = completion(&help, "element(\"Fe\", ", "//", &ValueLists::new()).unwrap();
        assert_eq!(items[1].insert_text, "\"%-as-mmol\"");
    }

    #[test]
    fn test_parameter_values_from_host_lists() {
        let help = registry();
        let mut lists = ValueLists::new();
        lists.insert(
            "elements".to_string(),
            vec!["Fe".to_string(), "Ca".to_string(), "Fe".to_string()],
        );
        let items = completion(&help, "x = element('", "//", &lists).unwrap();
        assert_eq!(labels(&items), vec!["Fe", "Ca"]);
        assert_eq!(items[0].insert_text, "Fe'");
    }

    #[test]
    fn test_call_without_values_falls_through_to_globals() {
        let help = registry();
        let items = completion(&help, "max(1, ", "//", &ValueLists::new()).unwrap();
        assert!(labels(&items).contains(&"element"));
    }

    #[test]
    fn test_module_completions() {
        let help = registry();
        let items = completion(&help, "x = Geo.", "//", &ValueLists::new()).unwrap();
        assert_eq!(labels(&items), vec!["dist", "ORIGIN"]);
        assert_eq!(items[0].kind, CompletionKind::Function);
        assert_eq!(items[1].kind, CompletionKind::Constant);
        assert_eq!(items[1].doc.as_deref(), Some("Zero point"));
    }

    #[test]
    fn test_unknown_module_gives_globals() {
        let help = registry();
        let items = completion(&help, "x = Nope.", "//", &ValueLists::new()).unwrap();
        assert_eq!(
            labels(&items),
            vec!["element", "max", "pi", "Geo", "if", "end"]
        );
    }

    #[test]
    fn test_global_completion_kinds() {
        let help = registry();
        let items = completion(&help, "", "//", &ValueLists::new()).unwrap();
        let kinds: Vec<CompletionKind> = items.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CompletionKind::Function,
                CompletionKind::Function,
                CompletionKind::Constant,
                CompletionKind::Module,
                CompletionKind::Keyword,
                CompletionKind::Keyword,
            ]
        );
        assert!(items.iter().all(|i| i.insert_text == i.label));
    }

    #[test]
    fn test_reserved_names_not_offered_as_identifiers() {
        let mut help = registry();
        help.add(FunctionDescriptor::new("", "if", "not really", "builtin"));
        let items = completion(&help, "", "//", &ValueLists::new()).unwrap();
        let ifs: Vec<&CompletionItem> = items.iter().filter(|i| i.label == "if").collect();
        assert_eq!(ifs.len(), 1);
        assert_eq!(ifs[0].kind, CompletionKind::Keyword);
    }

    #[test]
    fn test_configured_keywords_decide_collisions() {
        let mut help = SourceHelp::new(vec!["let".to_string()]);
        help.add(FunctionDescriptor::new("", "end", "", "builtin"));
        help.add(FunctionDescriptor::new("", "let", "", "builtin"));

        let items = completion(&help, "", "//", &ValueLists::new()).unwrap();
        let got: Vec<(&str, CompletionKind)> =
            items.iter().map(|i| (i.label.as_str(), i.kind)).collect();
        // `end` is not a configured keyword, so it stays a function.
        assert_eq!(
            got,
            vec![
                ("end", CompletionKind::Function),
                ("let", CompletionKind::Keyword),
            ]
        );
    }

    #[test]
    fn test_comment_is_ignored() {
        let help = registry();
        // The comment mentions a call; the code context is a module dot.
        let items = completion(&help, "// element(\"Fe\", \"\nGeo.", "//", &ValueLists::new())
            .unwrap();
        assert_eq!(labels(&items), vec!["dist", "ORIGIN"]);
    }

    #[test]
    fn test_empty_marker_is_error() {
        let help = registry();
        assert_eq!(
            completion(&help, "x", "", &ValueLists::new()),
            Err(ConfigurationError::EmptyCommentMarker)
        );
    }

    #[test]
    fn test_signature_help_in_call() {
        let help = registry();
        let sig = signature_help(&help, "y = element(\"Fe\", ", "//", &ValueLists::new())
            .unwrap()
            .unwrap();
        assert_eq!(sig.func_name, "element");
        assert_eq!(sig.active_param_index, 1);
        assert_eq!(sig.active_param_possible_values, vec!["%", "%-as-mmol"]);
    }

    #[test]
    fn test_signature_help_module_function_zero_params() {
        let help = registry();
        let sig = signature_help(&help, "Geo.dist(", "//", &ValueLists::new())
            .unwrap()
            .unwrap();
        assert_eq!(sig.signature, "Geo.dist()");
        assert!(sig.params.is_empty());
    }

    #[test]
    fn test_signature_help_outside_call() {
        let help = registry();
        assert_eq!(
            signature_help(&help, "x = 1", "//", &ValueLists::new()).unwrap(),
            None
        );
        assert_eq!(
            signature_help(&help, "unknown(1, ", "//", &ValueLists::new()).unwrap(),
            None
        );
    }

    #[test]
    fn test_hover_function() {
        let help = registry();
        let text = hover(&help, "x = max", "//").unwrap().unwrap();
        assert_eq!(text, "max(a, b)\n\nLarger of two");
    }

    #[test]
    fn test_hover_module_function_and_constant() {
        let help = registry();
        assert_eq!(
            hover(&help, "Geo.dist", "//").unwrap().as_deref(),
            Some("Geo.dist()\n\nDistance")
        );
        assert_eq!(
            hover(&help, "Geo.ORIGIN", "//").unwrap().as_deref(),
            Some("Zero point")
        );
        assert_eq!(hover(&help, "1 + pi", "//").unwrap().as_deref(), Some("3.14159"));
    }

    #[test]
    fn test_hover_module_and_unknown() {
        let help = registry();
        assert_eq!(hover(&help, "(Geo", "//").unwrap().as_deref(), Some("module Geo"));
        assert_eq!(hover(&help, "zzz", "//").unwrap(), None);
        assert_eq!(hover(&help, "f(\"pi", "//").unwrap(), None);
    }

    #[test]
    fn test_constant_group_docs_optional() {
        let mut help = SourceHelp::default();
        let mut group = ConstantGroup::new();
        group.insert("K", "");
        help.set_constants("", group);
        let items = completion(&help, "", "//", &ValueLists::new()).unwrap();
        assert_eq!(items[0].doc, None);
        assert_eq!(hover(&help, "K", "//").unwrap().as_deref(), Some("K"));
    }
}
