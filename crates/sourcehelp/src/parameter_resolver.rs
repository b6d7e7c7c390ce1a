//
// parameter_resolver.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Parameter descriptors and the "possible values" resolvers attached to them.
// A resolver looks at the arguments typed so far plus the host-supplied
// category lists and returns candidate values for its parameter.
//

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

/// Host-supplied candidate lists keyed by category name (e.g. `"elements"`).
pub type ValueLists = HashMap<String, Vec<String>>;

/// Computes candidate values for one parameter.
///
/// Called with the completed arguments of the enclosing call (as typed, quotes
/// included) and the current value lists. Must be pure.
pub type PossibleValuesFn = dyn Fn(&[String], &ValueLists) -> Vec<String> + Send + Sync;

/// Static description of one function parameter.
#[derive(Clone)]
pub struct ParameterDescriptor {
    pub name: String,
    pub doc: String,
    resolver: Arc<PossibleValuesFn>,
}

// Closures don't implement Debug
impl fmt::Debug for ParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescriptor")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

impl ParameterDescriptor {
    /// A parameter with no value suggestions.
    pub fn new(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::with_resolver(name, doc, |_, _| Vec::new())
    }

    pub fn with_resolver<F>(name: impl Into<String>, doc: impl Into<String>, resolver: F) -> Self
    where
        F: Fn(&[String], &ValueLists) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            doc: doc.into(),
            resolver: Arc::new(resolver),
        }
    }

    pub fn from_source(
        name: impl Into<String>,
        doc: impl Into<String>,
        source: ValueSource,
    ) -> Self {
        Self::with_resolver(name, doc, move |args, lists| source.resolve(args, lists))
    }

    pub fn resolve_possible_values(
        &self,
        args_so_far: &[String],
        value_lists: &ValueLists,
    ) -> Vec<String> {
        (self.resolver)(args_so_far, value_lists)
    }
}

/// Strip whitespace and one pair of surrounding quotes from typed argument text.
///
/// `"Fe"` and `'Fe'` both become `Fe`. A lone opening quote (`"Fe`) is also
/// stripped so resolvers can match on what the user has typed so far.
pub fn unquote(arg: &str) -> &str {
    let trimmed = arg.trim();
    let without_open = trimmed
        .strip_prefix('"')
        .or_else(|| trimmed.strip_prefix('\''))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix('"')
        .or_else(|| without_open.strip_suffix('\''))
        .unwrap_or(without_open)
}

// ---------------------------------------------------------------------------
// Declarative value sources
// ---------------------------------------------------------------------------

/// Where a catalog-defined parameter gets its candidate values from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueSource {
    /// No suggestions
    #[default]
    None,
    /// A fixed list
    Fixed { values: Vec<String> },
    /// The host list for one category
    Category { category: String },
    /// A table keyed by the unquoted text of an earlier argument
    Lookup {
        argument: usize,
        table: IndexMap<String, Vec<String>>,
        #[serde(default)]
        default: Vec<String>,
    },
    /// The host list for category `prefix` + unquoted earlier argument
    CategoryByArgument { argument: usize, prefix: String },
}

impl ValueSource {
    pub fn resolve(&self, args_so_far: &[String], value_lists: &ValueLists) -> Vec<String> {
        match self {
            ValueSource::None => Vec::new(),
            ValueSource::Fixed { values } => values.clone(),
            ValueSource::Category { category } => {
                value_lists.get(category).cloned().unwrap_or_default()
            }
            ValueSource::Lookup {
                argument,
                table,
                default,
            } => args_so_far
                .get(*argument)
                .and_then(|arg| table.get(unquote(arg)))
                .unwrap_or(default)
                .clone(),
            ValueSource::CategoryByArgument { argument, prefix } => {
                let Some(arg) = args_so_far.get(*argument) else {
                    return Vec::new();
                };
                let category = format!("{}{}", prefix, unquote(arg));
                value_lists.get(&category).cloned().unwrap_or_default()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
