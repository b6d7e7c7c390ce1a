//
// source_help.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Registry of known functions, constants and keywords, and the queries the
// completion and signature-help paths make against it.
//
// Descriptors are keyed by `module.name` (or bare `name` for globals). Each
// descriptor carries an origin tag so every definition that came from one
// source unit can be dropped in one call when that source is edited.
//

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::parameter_resolver::{ParameterDescriptor, ValueLists};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A registered function.
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    pub name: String,
    /// Empty for globals
    pub module_name: String,
    pub doc: String,
    /// Opaque tag naming the source this definition came from
    pub origin_id: String,
    /// Declared parameters in order
    pub params: Vec<ParameterDescriptor>,
}

impl FunctionDescriptor {
    pub fn new(
        module_name: impl Into<String>,
        name: impl Into<String>,
        doc: impl Into<String>,
        origin_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            module_name: module_name.into(),
            doc: doc.into(),
            origin_id: origin_id.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<ParameterDescriptor>) -> Self {
        self.params = params;
        self
    }

    /// Registry key: `module.name`, or `name` for globals.
    pub fn key(&self) -> String {
        function_key(&self.module_name, &self.name)
    }

    /// Human-readable call shape, e.g. `mod.f(a, b)`.
    pub fn signature(&self) -> String {
        let names: Vec<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
        format!("{}({})", self.key(), names.join(", "))
    }
}

/// Build the registry key for a function.
pub fn function_key(module_name: &str, name: &str) -> String {
    if module_name.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", module_name, name)
    }
}

/// Constants declared by one module: name -> doc.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantGroup {
    constants: IndexMap<String, String>,
}

impl ConstantGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, doc: impl Into<String>) {
        self.constants.insert(name.into(), doc.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.constants.get(name).map(String::as_str)
    }

    /// Remove `name`, keeping the order of the remaining constants.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.constants.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.constants.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConstantGroup {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            constants: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// What kind of thing a completion item inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Function,
    Constant,
    Module,
    Keyword,
    EnumMember,
}

/// A single completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub doc: Option<String>,
    pub insert_text: String,
    pub kind: CompletionKind,
}

impl CompletionItem {
    /// Item whose inserted text is its label.
    pub fn new(label: impl Into<String>, doc: Option<String>, kind: CompletionKind) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
            doc,
            kind,
        }
    }
}

fn non_empty(doc: &str) -> Option<String> {
    if doc.is_empty() {
        None
    } else {
        Some(doc.to_string())
    }
}

/// Signature help for the call at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHelp {
    /// Rendered call shape, e.g. `element(elementFormula, column, detector)`
    pub signature: String,
    pub func_name: String,
    pub func_doc: String,
    /// `(name, doc)` for each declared parameter
    pub params: Vec<(String, String)>,
    /// Index of the argument being typed. Can be past the end of `params`
    /// when more arguments were typed than declared.
    pub active_param_index: usize,
    /// Suggestions for the active parameter; empty when it has none.
    pub active_param_possible_values: Vec<String>,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Function, constant and keyword registry for one editing session.
#[derive(Debug, Clone, Default)]
pub struct SourceHelp {
    functions: IndexMap<String, FunctionDescriptor>,
    constants: IndexMap<String, ConstantGroup>,
    /// (module, constant) -> origin that last merged it
    constant_owners: HashMap<(String, String), String>,
    keywords: Vec<String>,
}

impl SourceHelp {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            ..Self::default()
        }
    }

    /// Insert a descriptor, replacing any with the same key.
    pub fn add(&mut self, descriptor: FunctionDescriptor) {
        let key = descriptor.key();
        if self.functions.insert(key.clone(), descriptor).is_some() {
            log::trace!("Replaced function help for {}", key);
        }
    }

    /// Remove every function that came from `origin_id`. Constants are left
    /// alone; callers replace them per module with [`Self::set_constants`].
    pub fn clear_by_origin(&mut self, origin_id: &str) {
        let before = self.functions.len();
        self.functions.retain(|_, f| f.origin_id != origin_id);
        let removed = before - self.functions.len();
        if removed > 0 {
            log::trace!("Cleared {} functions from origin {}", removed, origin_id);
        }
    }

    /// Replace the constants registered for `module_name`.
    pub fn set_constants(&mut self, module_name: &str, group: ConstantGroup) {
        self.constant_owners.retain(|(module, _), _| module != module_name);
        self.constants.insert(module_name.to_string(), group);
    }

    /// Add `group` to the constants of `module_name` on behalf of
    /// `origin_id`. Existing constants from other origins stay; a name that
    /// is already present gets the new doc and changes owner.
    pub fn merge_constants(&mut self, module_name: &str, origin_id: &str, group: ConstantGroup) {
        let current = self.constants.entry(module_name.to_string()).or_default();
        for (name, doc) in group.iter() {
            current.insert(name, doc);
            self.constant_owners.insert(
                (module_name.to_string(), name.to_string()),
                origin_id.to_string(),
            );
        }
    }

    /// Remove every constant whose current owner is `origin_id`.
    pub fn clear_constants_by_origin(&mut self, origin_id: &str) {
        let owned: Vec<(String, String)> = self
            .constant_owners
            .iter()
            .filter(|(_, owner)| owner.as_str() == origin_id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &owned {
            self.constant_owners.remove(key);
            if let Some(group) = self.constants.get_mut(&key.0) {
                group.remove(&key.1);
            }
        }
        if !owned.is_empty() {
            log::trace!("Cleared {} constants from origin {}", owned.len(), origin_id);
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn set_keywords(&mut self, keywords: Vec<String>) {
        self.keywords = keywords;
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn get_function(&self, module_name: &str, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(&function_key(module_name, name))
    }

    /// Completion items for every function declared in `module_name`
    /// (empty string selects globals), sorted by name.
    pub fn list_functions(&self, module_name: &str) -> Vec<CompletionItem> {
        let mut items: Vec<CompletionItem> = self
            .functions
            .values()
            .filter(|f| f.module_name == module_name)
            .map(|f| {
                CompletionItem::new(f.name.clone(), non_empty(&f.doc), CompletionKind::Function)
            })
            .collect();
        items.sort_by(|a, b| a.label.cmp(&b.label));
        items
    }

    /// Constants registered for `module_name`; empty if none.
    pub fn list_constants(&self, module_name: &str) -> ConstantGroup {
        self.constants.get(module_name).cloned().unwrap_or_default()
    }

    /// With an empty `prefix_module_name`, every module that declares a
    /// function or constant. Otherwise just that module, if it exists.
    pub fn list_modules(&self, prefix_module_name: &str) -> Vec<CompletionItem> {
        let mut names: Vec<&str> = self
            .functions
            .values()
            .map(|f| f.module_name.as_str())
            .chain(
                self.constants
                    .iter()
                    .filter(|(_, group)| !group.is_empty())
                    .map(|(module, _)| module.as_str()),
            )
            .filter(|m| !m.is_empty())
            .filter(|m| prefix_module_name.is_empty() || *m == prefix_module_name)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
            .into_iter()
            .map(|m| CompletionItem::new(m, None, CompletionKind::Module))
            .collect()
    }

    /// True if some function or constant is declared in `module_name`.
    pub fn has_module(&self, module_name: &str) -> bool {
        !module_name.is_empty() && !self.list_modules(module_name).is_empty()
    }

    /// Signature help for `module_name.func_name` with `args_so_far` already
    /// typed. `None` if the function is unknown.
    pub fn build_signature_help(
        &self,
        module_name: &str,
        func_name: &str,
        args_so_far: &[String],
        value_lists: &ValueLists,
    ) -> Option<SignatureHelp> {
        let func = self.get_function(module_name, func_name)?;

        if func.params.is_empty() {
            return Some(SignatureHelp {
                signature: func.signature(),
                func_name: func.key(),
                func_doc: func.doc.clone(),
                params: Vec::new(),
                active_param_index: 0,
                active_param_possible_values: Vec::new(),
            });
        }

        let active_param_index = args_so_far.len();
        let active_param_possible_values = func
            .params
            .get(active_param_index)
            .map(|p| p.resolve_possible_values(args_so_far, value_lists))
            .unwrap_or_default();

        Some(SignatureHelp {
            signature: func.signature(),
            func_name: func.key(),
            func_doc: func.doc.clone(),
            params: func
                .params
                .iter()
                .map(|p| (p.name.clone(), p.doc.clone()))
                .collect(),
            active_param_index,
            active_param_possible_values,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
