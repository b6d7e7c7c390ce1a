//
// module_parser.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Extracts function and constant declarations from the source of a
// user-authored module, and swaps them into the registry whenever that
// source changes.
//

use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use regex::Regex;

use crate::doc_comment::{extract_doc_block, DocBlock};
use crate::parameter_resolver::ParameterDescriptor;
use crate::reserved_words::is_reserved_word;
use crate::source_help::{ConstantGroup, FunctionDescriptor, SourceHelp};

/// Compiled declaration patterns
struct DeclarationPatterns {
    /// `[local] function [Module.]name(params)`; groups: 1=local, 2=module, 3=name, 4=params
    function: Regex,
    /// `Module.NAME = value` at the start of a line; groups: 1=module, 2=name
    constant: Regex,
    identifier: Regex,
}

fn patterns() -> &'static DeclarationPatterns {
    static PATTERNS: OnceLock<DeclarationPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| DeclarationPatterns {
        function: Regex::new(concat!(
            r"^\s*(local\s+)?function\s+",
            r"(?:([A-Za-z_][A-Za-z0-9_]*)\.)?",
            r"([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)",
        ))
        .unwrap(),
        constant: Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)\s*=(?:[^=]|$)")
            .unwrap(),
        identifier: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap(),
    })
}

/// Declarations found in one module's source.
#[derive(Debug, Clone, Default)]
pub struct ParsedModule {
    pub functions: Vec<FunctionDescriptor>,
    pub constants: ConstantGroup,
}

/// Origin tag for everything registered from a user module.
pub fn user_origin(module_name: &str) -> String {
    format!("user:{}", module_name)
}

/// Parse the declarations of `module_name` out of `source`.
///
/// Recognized, one per line:
/// - `function Module.name(a, b)`: exported function of this module,
/// - `function name(a, b)`: also registered under this module,
/// - `Module.NAME = ...` at column 0: module constant.
///
/// `local function` declarations, declarations qualified with another
/// module name and names that are reserved words are skipped. The comment
/// block directly above a declaration is its documentation.
pub fn parse_module_source(module_name: &str, source: &str, comment_marker: &str) -> ParsedModule {
    let pats = patterns();
    let lines: Vec<&str> = source.lines().collect();
    let origin = user_origin(module_name);
    let mut parsed = ParsedModule::default();

    for (idx, line) in lines.iter().enumerate() {
        if let Some(caps) = pats.function.captures(line) {
            if caps.get(1).is_some() {
                continue;
            }
            if let Some(qualifier) = caps.get(2) {
                if qualifier.as_str() != module_name {
                    log::trace!(
                        "Skipping {}.{} declared in module {}",
                        qualifier.as_str(),
                        &caps[3],
                        module_name
                    );
                    continue;
                }
            }
            if is_reserved_word(&caps[3]) {
                continue;
            }

            let doc = extract_doc_block(&lines, idx, comment_marker).unwrap_or_default();
            let params = parse_param_list(&caps[4], &doc);
            parsed.functions.push(
                FunctionDescriptor::new(
                    module_name,
                    &caps[3],
                    doc.summary_or_empty(),
                    origin.as_str(),
                )
                .with_params(params),
            );
            continue;
        }

        if let Some(caps) = pats.constant.captures(line) {
            if &caps[1] != module_name || is_reserved_word(&caps[2]) {
                continue;
            }
            let doc = extract_doc_block(&lines, idx, comment_marker).unwrap_or_default();
            parsed.constants.insert(&caps[2], doc.summary_or_empty());
        }
    }

    parsed
}

fn parse_param_list(list: &str, doc: &DocBlock) -> Vec<ParameterDescriptor> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| ParameterDescriptor::new(p, doc.param_doc(p)))
        .collect()
}

/// Replace everything registered for `module_name` with the declarations in
/// `source`. Returns the number of functions registered.
pub fn register_user_module(
    help: &mut SourceHelp,
    module_name: &str,
    source: &str,
    comment_marker: &str,
) -> Result<usize> {
    if !patterns().identifier.is_match(module_name) || is_reserved_word(module_name) {
        return Err(anyhow!("Invalid module name: '{}'", module_name));
    }
    if comment_marker.is_empty() {
        return Err(anyhow!("Comment marker must not be empty"));
    }

    let parsed = parse_module_source(module_name, source, comment_marker);
    let count = parsed.functions.len();

    let origin = user_origin(module_name);
    help.clear_by_origin(&origin);
    help.clear_constants_by_origin(&origin);
    for func in parsed.functions {
        help.add(func);
    }
    help.merge_constants(module_name, &origin, parsed.constants);

    log::info!("Registered user module {}: {} functions", module_name, count);
    Ok(count)
}
