//
// catalog.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Loads built-in module definitions from JSON catalogs into the registry.
// Each catalog describes one module: its functions (with parameters and
// where their candidate values come from) and its constants.
//

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::parameter_resolver::{ParameterDescriptor, ValueSource};
use crate::source_help::{FunctionDescriptor, SourceHelp};

/// Origin tag for catalogs that don't name one.
pub const DEFAULT_CATALOG_ORIGIN: &str = "builtin";

fn default_origin() -> String {
    DEFAULT_CATALOG_ORIGIN.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Catalog {
    /// Empty for globals
    #[serde(default)]
    module: String,
    #[serde(default = "default_origin")]
    origin: String,
    #[serde(default)]
    functions: Vec<CatalogFunction>,
    #[serde(default)]
    constants: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFunction {
    name: String,
    #[serde(default)]
    doc: String,
    #[serde(default)]
    params: Vec<CatalogParam>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogParam {
    name: String,
    #[serde(default)]
    doc: String,
    #[serde(default)]
    values: ValueSource,
}

/// What one catalog contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    pub module: String,
    pub origin: String,
    pub functions: usize,
    pub constants: usize,
}

/// Register the functions and constants of one catalog document.
///
/// Functions overwrite same-named entries. Constants are merged into the
/// module's existing group so a module may be split across catalogs.
pub fn load_catalog_str(text: &str, help: &mut SourceHelp) -> Result<CatalogSummary> {
    let catalog: Catalog = serde_json::from_str(text).context("Failed to parse catalog")?;

    let functions = catalog.functions.len();
    for func in catalog.functions {
        let params = func
            .params
            .into_iter()
            .map(|p| ParameterDescriptor::from_source(p.name, p.doc, p.values))
            .collect();
        help.add(
            FunctionDescriptor::new(
                catalog.module.as_str(),
                func.name,
                func.doc,
                catalog.origin.as_str(),
            )
            .with_params(params),
        );
    }

    let constants = catalog.constants.len();
    if constants > 0 {
        help.merge_constants(
            &catalog.module,
            &catalog.origin,
            catalog.constants.into_iter().collect(),
        );
    }

    Ok(CatalogSummary {
        module: catalog.module,
        origin: catalog.origin,
        functions,
        constants,
    })
}

/// Read and register one catalog file.
pub fn load_catalog(path: &Path, help: &mut SourceHelp) -> Result<CatalogSummary> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    load_catalog_str(&text, help).with_context(|| format!("In catalog {}", path.display()))
}

/// Expand configured paths into catalog files: files as given, directories
/// walked for `*.json` in file-name order.
fn catalog_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if entry.file_type().is_file() && p.extension().is_some_and(|ext| ext == "json") {
                    files.push(p.to_path_buf());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    files
}

/// Load every catalog under `paths`. Files that fail to load are logged and
/// skipped.
pub fn load_catalog_paths(paths: &[PathBuf], help: &mut SourceHelp) -> Vec<CatalogSummary> {
    let mut loaded = Vec::new();
    for file in catalog_files(paths) {
        match load_catalog(&file, help) {
            Ok(summary) => {
                log::trace!(
                    "Loaded catalog {} (module {:?}): {} functions, {} constants",
                    file.display(),
                    summary.module,
                    summary.functions,
                    summary.constants
                );
                loaded.push(summary);
            }
            Err(e) => log::warn!("Skipping catalog: {:#}", e),
        }
    }
    log::info!("Loaded {} catalogs", loaded.len());
    loaded
}
